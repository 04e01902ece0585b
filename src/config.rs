//! Thread-local configuration.
//!
//! The engine has no internal locking and runs single-threaded per
//! polyhedron; configuration that affects *how* an operation is carried
//! out (which widening implementation, which default topology, ...) is
//! therefore read from thread-local storage rather than threaded through
//! every call. Rust's `thread_local!` macro is the natural way to do this.
//!
//! Tests that change configuration mid-flight on a polyhedron being
//! operated on from another thread are unsupported.

use crate::row::Topology;
use std::cell::Cell;

// ======================================================================
// Enums - PUBLIC

/// Which variant [`crate::dispatch::PolyKind`] the factory builds by
/// default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultPolyKind {
    /// Plain DD engine.
    Poly,
    /// Bounding-box-cached DD engine.
    BPoly,
    /// Cartesian-factored engine.
    FPoly,
    /// Unconstrained-projection engine.
    UPoly,
    /// Unconstrained projection over a factored kernel.
    UfPoly,
}

/// Which widening operator `Poly::widening_assign` uses by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidenImpl {
    /// Cousot–Halbwachs H79.
    H79,
    /// BHRZ03 (multi-candidate, certificate-compared).
    Bhrz03,
}

/// Whether widening requires (and may assume) `x ⊇ y`, or computes the
/// join first to drop that precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidenSpec {
    /// Precondition `x ⊇ y` required; caller's responsibility.
    Risky,
    /// No precondition; implemented as `join; risky-widen`.
    Safe,
}

// ======================================================================
// Context - PUBLIC

/// A snapshot of all thread-local configuration values.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    /// Default topology for newly-created polyhedra.
    pub default_topology: Topology,
    /// Default concrete kind built by the factory.
    pub default_poly_kind: DefaultPolyKind,
    /// Default widening implementation.
    pub widen_impl: WidenImpl,
    /// Default widening specification.
    pub widen_spec: WidenSpec,
    /// Percentage (0..=100) of dimensions that may be removed via
    /// `unconstrain`-then-delete before `remove_space_dims` instead
    /// rebuilds the constraint system from generators.
    pub remove_space_dims_percentage: u8,
    /// Tuning threshold controlling how eagerly `minimize()` filters
    /// redundant rows; implementation-defined.
    pub minimize_filter_threshold: usize,
    /// Whether the [`crate::dispatch::Stats`] decorator prints timing
    /// counters as it goes, rather than only exposing them on demand.
    pub noisy_stats: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            default_topology: Topology::Nnc,
            default_poly_kind: DefaultPolyKind::Poly,
            widen_impl: WidenImpl::H79,
            widen_spec: WidenSpec::Risky,
            remove_space_dims_percentage: 30,
            minimize_filter_threshold: 0,
            noisy_stats: false,
        }
    }
}

thread_local! {
    static CONTEXT: Cell<Context> = Cell::new(Context::default());
}

/// Returns the calling thread's current configuration.
pub fn current() -> Context {
    CONTEXT.with(|c| c.get())
}

/// Replaces the calling thread's configuration wholesale.
pub fn set_context(ctx: Context) {
    CONTEXT.with(|c| c.set(ctx));
}

/// Runs `f` with the calling thread's configuration, for read-only use
/// sites that don't want to copy it out first.
pub fn with_context<R>(f: impl FnOnce(&Context) -> R) -> R {
    CONTEXT.with(|c| {
        let ctx = c.get();
        f(&ctx)
    })
}

/// Resets the calling thread's configuration to defaults. Primarily for
/// test isolation, since `thread_local!` state otherwise leaks between
/// `#[test]` functions run on the same worker thread.
pub fn reset() {
    set_context(Context::default());
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_then_override_then_reset() {
        reset();
        assert_eq!(current().widen_impl, WidenImpl::H79);

        let mut ctx = current();
        ctx.widen_impl = WidenImpl::Bhrz03;
        set_context(ctx);
        assert_eq!(current().widen_impl, WidenImpl::Bhrz03);

        reset();
        assert_eq!(current().widen_impl, WidenImpl::H79);
    }
}
