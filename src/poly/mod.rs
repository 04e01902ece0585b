//! The double-description (DD) engine: [`Poly`], the core of the crate.
//!
//! A [`Poly`] keeps a constraint system and a generator system of a convex
//! polyhedron in lock-step. Both systems are split into
//! *singular* rows (equalities / lines, always saturating everything) and
//! *skeletal* rows (proper inequalities / rays+points+closure-points); see
//! [`RowSystem`]. A saturation matrix over the skeletal rows records which
//! generator/constraint pairs touch ("saturate") each other.
//!
//! This implementation folds NNC strict inequalities and closure points
//! into ordinary skeletal rows via an augmented ε scalar product (see
//! `con_gen_sp` in `convert.rs`) rather than maintaining a separate
//! "non-skeletal" (ns) row compression layer; [`RowSystem::ns`] stays
//! present (and always empty) so the public row-system shape still
//! matches what ascii dump/load and the downstream wrappers
//! ([`crate::fpoly`], [`crate::upoly`]) expect.

mod convert;
pub(crate) mod ops;
pub mod widen;

pub use ops::ConRelation;
pub use widen::Certificate;

use crate::config::{self, WidenSpec};
use crate::linexpr::LinExpr;
use crate::num::{Q, Z};
use crate::row::{Con, ConType, Gen, GenType, Topology};
use crate::satmatrix::SatMatrix;
use tracing::trace;

// ======================================================================
// RowSystem - PUBLIC

/// A constraint or generator system, partitioned into singular/skeletal/
/// non-skeletal rows.
#[derive(Clone, Debug, Default)]
pub struct RowSystem<R> {
    /// Equalities (for [`Con`]) or lines (for [`Gen`]); always saturate
    /// every row of the dual system.
    pub sing: Vec<R>,
    /// Proper inequalities / rays+points+closure-points.
    pub sk: Vec<R>,
    /// Non-skeletal compression rows. Always empty in this implementation
    /// — see the module doc comment.
    pub ns: Vec<crate::bits::BitSet>,
}

impl<R> RowSystem<R> {
    /// An empty row system.
    pub fn new() -> Self {
        Self {
            sing: Vec::new(),
            sk: Vec::new(),
            ns: Vec::new(),
        }
    }

    /// True iff this system has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.sing.is_empty() && self.sk.is_empty() && self.ns.is_empty()
    }

    /// Total row count (singular + skeletal); `ns` rows don't count
    /// towards `num_min_cons`/`num_min_gens` since they never carry
    /// independent information in this implementation.
    pub fn len(&self) -> usize {
        self.sing.len() + self.sk.len()
    }
}

// ======================================================================
// Status - PUBLIC

/// Lifecycle state of a [`Poly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Definitely empty; all row systems are empty.
    Empty,
    /// `cs`/`gs` are minimized and mutually consistent.
    Min,
    /// `cs`/`gs` are a valid (possibly non-minimal) DD pair, but
    /// `cs_pending`/`gs_pending` carry rows not yet incorporated.
    Pending,
}

// ======================================================================
// Poly - PUBLIC

/// A convex polyhedron represented by a constraint system and a generator
/// system kept in double-description correspondence.
#[derive(Clone, Debug)]
pub struct Poly {
    pub(crate) d: usize,
    pub(crate) topology: Topology,
    pub(crate) status: Status,
    pub(crate) cs: RowSystem<Con>,
    pub(crate) gs: RowSystem<Gen>,
    pub(crate) cs_pending: Vec<Con>,
    pub(crate) gs_pending: Vec<Gen>,
    /// Rows are generator-skeleton indices, columns are
    /// constraint-skeleton indices; `sat[g][c] == 1` iff `g` does not
    /// saturate `c`. Meaningless (and left empty) while `status != Min`.
    pub(crate) sat: SatMatrix,
}

impl Poly {
    /// The universe polyhedron (no constraints) of dimension `d`, using
    /// the thread's default topology.
    pub fn new_universe(d: usize) -> Self {
        Self::new_universe_with(d, config::current().default_topology)
    }

    /// The universe polyhedron of dimension `d` with an explicit topology.
    pub fn new_universe_with(d: usize, topology: Topology) -> Self {
        let (cs, gs, sat) = convert::bootstrap_universe(d, topology);
        trace!(d, ?topology, "new_universe");
        Self {
            d,
            topology,
            status: Status::Min,
            cs,
            gs,
            cs_pending: Vec::new(),
            gs_pending: Vec::new(),
            sat,
        }
    }

    /// The empty polyhedron of dimension `d`.
    pub fn new_empty(d: usize) -> Self {
        Self::new_empty_with(d, config::current().default_topology)
    }

    /// The empty polyhedron of dimension `d` with an explicit topology.
    pub fn new_empty_with(d: usize, topology: Topology) -> Self {
        Self {
            d,
            topology,
            status: Status::Empty,
            cs: RowSystem::new(),
            gs: RowSystem::new(),
            cs_pending: Vec::new(),
            gs_pending: Vec::new(),
            sat: SatMatrix::new(),
        }
    }

    /// Re-initializes `self` to the universe of its current dimension and
    /// topology (the only way out of [`Status::Empty`]).
    pub fn set_universe(&mut self) {
        *self = Self::new_universe_with(self.d, self.topology);
    }

    /// Ambient space dimension.
    pub fn space_dim(&self) -> usize {
        self.d
    }

    /// Current topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// True iff there are rows waiting to be incorporated.
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    // ============================================================
    // ADD ROWS

    /// Queues a constraint for incorporation on the next [`Poly::minimize`].
    ///
    /// # Panics
    /// In debug builds, if `c`'s dimension exceeds `self.space_dim()`, or
    /// if `c` is strict while `self.topology()` is [`Topology::Closed`].
    pub fn add_con(&mut self, c: Con) {
        debug_assert!(c.space_dim() <= self.d, "constraint dimension mismatch");
        debug_assert!(
            !(c.is_strict() && !self.topology.is_nnc()),
            "strict inequality in Closed topology"
        );
        if self.status == Status::Empty {
            // Adding a constraint to an empty polyhedron changes nothing.
            return;
        }
        self.cs_pending.push(c);
        self.status = Status::Pending;
    }

    /// Queues several constraints at once.
    pub fn add_cons<I: IntoIterator<Item = Con>>(&mut self, cs: I) {
        for c in cs {
            self.add_con(c);
        }
    }

    /// Queues a generator for incorporation on the next [`Poly::minimize`].
    ///
    /// # Panics
    /// In debug builds, if `g`'s dimension exceeds `self.space_dim()`.
    pub fn add_gen(&mut self, g: Gen) {
        debug_assert!(g.space_dim() <= self.d, "generator dimension mismatch");
        debug_assert!(
            !(self.status == Status::Empty && !g.is_point()),
            "an empty polyhedron needs a point to become non-empty"
        );
        if self.status == Status::Empty {
            // Bootstrap directly from this point.
            *self = Self::new_empty_with(self.d, self.topology);
            self.status = Status::Pending;
        }
        self.gs_pending.push(g);
        self.status = Status::Pending;
    }

    /// Queues several generators at once.
    pub fn add_gens<I: IntoIterator<Item = Gen>>(&mut self, gs: I) {
        for g in gs {
            self.add_gen(g);
        }
    }

    // ============================================================
    // MINIMIZE

    /// Incorporates all pending rows, settling `status` into [`Status::Min`]
    /// or [`Status::Empty`].
    pub fn minimize(&mut self) -> bool {
        match self.status {
            Status::Empty => true,
            Status::Min => true,
            Status::Pending => {
                trace!(
                    d = self.d,
                    pending_cons = self.cs_pending.len(),
                    pending_gens = self.gs_pending.len(),
                    "minimize"
                );
                let became_empty = convert::run_minimize(self);
                self.status = if became_empty {
                    Status::Empty
                } else {
                    Status::Min
                };
                !became_empty
            }
        }
    }

    // ============================================================
    // QUERIES

    /// True iff this represents the empty polyhedron.
    pub fn is_empty(&mut self) -> bool {
        self.minimize();
        self.status == Status::Empty
    }

    /// True iff this represents the whole ambient space.
    pub fn is_universe(&mut self) -> bool {
        self.minimize();
        self.status == Status::Min && self.cs.sing.is_empty() && self.cs.sk.is_empty()
    }

    /// True iff no strict inequality of this polyhedron is needed, i.e.
    /// the polyhedron equals its own topological closure.
    pub fn is_topologically_closed(&mut self) -> bool {
        if !self.topology.is_nnc() {
            return true;
        }
        self.minimize();
        if self.status == Status::Empty {
            return true;
        }
        self.gs.sk.iter().all(|g| !g.is_closure_point())
            && self.cs.sk.iter().all(|c| !c.is_strict())
    }

    /// Number of non-redundant constraints. Minimization here is
    /// incremental: each newly added row is checked against the current
    /// minimal system rather than the whole system being re-verified from
    /// scratch on every call.
    pub fn num_min_cons(&mut self) -> usize {
        self.minimize();
        if self.status == Status::Empty {
            1
        } else {
            self.cs.len()
        }
    }

    /// Number of non-redundant generators.
    pub fn num_min_gens(&mut self) -> usize {
        self.minimize();
        if self.status == Status::Empty {
            0
        } else {
            self.gs.len()
        }
    }

    /// Affine dimension: the number of linearly independent directions
    /// the polyhedron actually spans: the size of a basis
    /// of lines plus the rank of the skeletal rays, plus one more if
    /// there is at least one point.
    pub fn affine_dim(&mut self) -> usize {
        self.minimize();
        if self.status == Status::Empty {
            return 0;
        }
        let rank = ops::gens_affine_rank(&self.gs);
        rank
    }

    /// Dimensions on which this polyhedron is translation-invariant, i.e.
    /// those `i` for which the line `l(x_i)` is among the generators.
    pub fn unconstrained_dims(&mut self) -> crate::bits::BitSet {
        self.minimize();
        let mut out = crate::bits::BitSet::with_capacity(self.d);
        if self.status == Status::Empty {
            return out;
        }
        for i in 0..self.d {
            if self
                .gs
                .sing
                .iter()
                .any(|l| l.is_line() && l.linear_expr().single_nonzero_dim() == Some(i))
            {
                out.set(i, true);
            }
        }
        out
    }

    /// Read-only access to the (possibly non-minimized) constraint system,
    /// forcing minimization first.
    pub fn cons(&mut self) -> Vec<Con> {
        self.minimize();
        let mut v = self.cs.sing.clone();
        v.extend(self.cs.sk.iter().cloned());
        v
    }

    /// Read-only access to the generator system, forcing minimization
    /// first.
    pub fn gens(&mut self) -> Vec<Gen> {
        self.minimize();
        let mut v = self.gs.sing.clone();
        v.extend(self.gs.sk.iter().cloned());
        v
    }

    /// Rational interval bounds of dimension `var`.
    pub fn get_bounds(&mut self, var: usize) -> crate::bbox::Itv {
        ops::get_bounds_var(self, var)
    }

    /// Rational interval bounds of the affine expression `(e.x + b) / den`.
    pub fn get_bounds_affine(&mut self, e: &LinExpr, b: &Z, den: &Z) -> crate::bbox::Itv {
        ops::get_bounds_affine(self, e, b, den)
    }

    /// Minimum of `(e.x + b) / den` over `self`, and whether it is attained
    /// by an actual point. `None` if `self` is empty or unbounded below.
    pub fn min(&mut self, e: &LinExpr, b: &Z, den: &Z) -> Option<(Q, bool)> {
        ops::get_min_max(self, e, b, den, true)
    }

    /// Maximum of `(e.x + b) / den` over `self`; dual of [`Poly::min`].
    pub fn max(&mut self, e: &LinExpr, b: &Z, den: &Z) -> Option<(Q, bool)> {
        ops::get_min_max(self, e, b, den, false)
    }

    // ============================================================
    // CONTAINMENT / RELATIONS

    /// True iff `self` contains every point of `other`.
    pub fn contains(&mut self, other: &mut Poly) -> bool {
        ops::contains(self, other)
    }

    /// True iff `self` and `other` represent the same polyhedron.
    pub fn equals(&mut self, other: &mut Poly) -> bool {
        ops::equals(self, other)
    }

    /// True iff `self` and `other` share no point.
    pub fn is_disjoint_from(&mut self, other: &mut Poly) -> bool {
        ops::is_disjoint_from(self, other)
    }

    /// How `c` relates to `self`'s generators.
    pub fn relation_with(&mut self, c: &Con) -> ConRelation {
        ops::relation_with_con(self, c)
    }

    // ============================================================
    // HULLS / INTERSECTION

    /// Intersects `self` with `other` in place.
    pub fn intersection_assign(&mut self, other: &mut Poly) {
        ops::intersection_assign(self, other)
    }

    /// Replaces `self` with the convex hull of `self` and `other`.
    pub fn poly_hull_assign(&mut self, other: &mut Poly) {
        ops::join_assign(self, other)
    }

    /// The most precise constraint hull of `inputs`; `boxed` additionally
    /// bounds every axis.
    pub fn con_hull(inputs: &mut [Poly], boxed: bool) -> Poly {
        ops::con_hull(inputs, boxed)
    }

    /// Over-approximates `self \ other` in place.
    pub fn poly_difference_assign(&mut self, other: &mut Poly) {
        *self = ops::poly_difference(self, other);
    }

    // ============================================================
    // AFFINE TRANSFORMS

    /// Replaces `self` with its image under `x_var := (e.x + b) / den`.
    pub fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        *self = ops::affine_image(self, var, e, b, den);
    }

    /// Replaces `self` with its preimage under `x_var := (e.x + b) / den`.
    pub fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        *self = ops::affine_preimage(self, var, e, b, den);
    }

    /// Applies `vars.len()` simultaneous affine images at once, reading
    /// every old coordinate before writing any new one.
    pub fn parallel_affine_image_assign(&mut self, vars: &[usize], exprs: &[LinExpr], inhomos: &[Z], dens: &[Z]) {
        *self = ops::parallel_affine_image(self, vars, exprs, inhomos, dens);
    }

    // ============================================================
    // DIMENSION MANIPULATION

    /// Adds a line in each of `vars`, forgetting any bound on them.
    pub fn unconstrain_assign(&mut self, vars: &[usize]) {
        ops::unconstrain_vars(self, vars)
    }

    /// Appends `m` new dimensions; `project` chooses between leaving them
    /// free (a line each) or fixed at zero.
    pub fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        *self = ops::add_space_dims(self, m, project);
    }

    /// Projects `dims` away.
    pub fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        *self = ops::remove_space_dims(self, dims);
    }

    /// Projects away every dimension from `new_dim` onward.
    pub fn remove_higher_space_dims_assign(&mut self, new_dim: usize) {
        *self = ops::remove_higher_space_dims(self, new_dim);
    }

    /// Permutes/projects dimensions per `pfunc` (`pfunc[i] = Some(j)` moves
    /// old dimension `i` to new dimension `j`; `None` drops it).
    pub fn map_space_dims_assign(&mut self, pfunc: &[Option<usize>]) {
        *self = ops::map_space_dims(self, pfunc);
    }

    /// Folds `vars` into `dest` as the hull of renamed copies, then
    /// projects `vars` away.
    pub fn fold_space_dims_assign(&mut self, vars: &[usize], dest: usize) {
        *self = ops::fold_space_dims(self, vars, dest);
    }

    /// Expands `var` into `m` extra copies of itself.
    pub fn expand_space_dim_assign(&mut self, var: usize, m: usize) {
        *self = ops::expand_space_dim(self, var, m);
    }

    // ============================================================
    // SPLIT / TIME ELAPSE / CLOSURE / TOPOLOGY

    /// Splits `self` in place into (kept: `self ∩ c`, returned: `self ∩
    /// ¬c`); exact only in NNC topology, see [`Poly::integral_split`].
    pub fn split(&mut self, c: Con) -> Poly {
        ops::split(self, c)
    }

    /// Dual of [`Poly::split`] for a non-strict/equality cutting
    /// constraint, valid under any topology, at the cost of leaving a
    /// one-unit gap at the cut.
    pub fn integral_split(&mut self, c: &Con) -> Poly {
        ops::integral_split(self, c)
    }

    /// Replaces `self` with its time-elapse w.r.t. `other`.
    pub fn time_elapse_assign(&mut self, other: &mut Poly) {
        *self = ops::time_elapse(self, other);
    }

    /// Replaces `self` with its topological closure.
    pub fn topological_closure_assign(&mut self) {
        *self = ops::topological_closure(self);
    }

    /// Reinterprets `self` under `new_topology`.
    pub fn set_topology_assign(&mut self, new_topology: Topology) {
        *self = ops::set_topology(self, new_topology);
    }

    // ============================================================
    // WIDENING

    /// Widens `self` against `y` using the thread's configured widening
    /// implementation and specification. `upto`, if given, is re-added
    /// afterwards restricted to constraints already valid in `self`.
    pub fn widening_assign(&mut self, y: &mut Poly, upto: Option<&[Con]>) {
        let ctx = config::current();
        *self = match ctx.widen_spec {
            WidenSpec::Risky => widen::widen_risky(self, y, ctx.widen_impl, upto),
            WidenSpec::Safe => widen::widen_safe(self, y, ctx.widen_impl, upto),
        };
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linexpr::LinExpr;
    use crate::num::Z;

    // ============================================================
    // universe / empty

    #[test]
    fn universe_has_no_constraints() {
        let mut p = Poly::new_universe_with(2, Topology::Closed);
        assert!(p.is_universe());
        assert!(!p.is_empty());
        assert_eq!(p.num_min_cons(), 0);
    }

    #[test]
    fn empty_is_empty() {
        let mut p = Poly::new_empty_with(2, Topology::Closed);
        assert!(p.is_empty());
        assert!(!p.is_universe());
    }

    // ============================================================
    // intersection of half-spaces

    #[test]
    fn triangle_scenario() {
        let mut p = Poly::new_universe_with(2, Topology::Closed);
        // x >= 0
        p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0)));
        // y >= 0
        p.add_con(Con::nonstrict(LinExpr::unit(1), Z::from(0)));
        // x + y <= 2  <=>  -x - y + 2 >= 0
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(-1));
        e.set(1, Z::from(-1));
        p.add_con(Con::nonstrict(e, Z::from(2)));

        assert!(!p.is_empty());
        assert!(p.is_topologically_closed());
        assert_eq!(p.num_min_cons(), 3);
        assert_eq!(p.affine_dim(), 2);

        let bx = p.get_bounds(0);
        assert_eq!(bx.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(bx.ub_rational(), Some(Q::from_integer(Z::from(2))));

        let points: Vec<_> = p
            .gens()
            .into_iter()
            .filter(|g| g.is_point())
            .collect();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn closed_topology_rejects_strict_con_in_debug() {
        let mut p = Poly::new_universe_with(1, Topology::Closed);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            p.add_con(Con::strict(LinExpr::unit(0), Z::from(0)));
        }));
        assert!(result.is_err());
    }
}
