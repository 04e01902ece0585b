//! Abstract polymorphic interface over concrete polyhedron kinds:
//! [`AbsPoly`], the [`PolyKind`] factory, and the [`Stats`] timing
//! decorator.
//!
//! This crate builds four real engines — [`Poly`], [`BPoly`], [`FPoly`],
//! [`UPoly`] — so [`PolyKind`] and [`name_to_kind`] cover those (each
//! plain or `_Stats`, eight names total). An unconstrained projection
//! over a factored kernel and disjunctive powerset domains were judged
//! out of scope for this exercise; any such name is rejected by
//! `name_to_kind` like any other unrecognized string.
//!
//! `AbsPoly`'s binary operations (`contains`, `intersection_assign`, ...)
//! take `&mut dyn AbsPoly`, so they can't call a concrete engine's own
//! factor-preserving fast path once type information is erased behind the
//! trait object: the default implementations flatten both sides to a
//! plain [`Poly`] via `to_poly` and delegate. Code that already knows its
//! concrete kind (e.g. two `FPoly`s) should call the inherent method
//! directly to keep the factoring speedup; the trait object is for
//! heterogeneous/pluggable callers that don't.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::bbox::{BPoly, Itv};
use crate::fpoly::FPoly;
use crate::linexpr::LinExpr;
use crate::num::Z;
use crate::poly::Poly;
use crate::row::{Con, Gen, Topology};
use crate::upoly::UPoly;

// ======================================================================
// AbsPoly - PUBLIC

/// The operation surface every concrete polyhedron kind exposes, minus
/// the generic convenience wrappers (`add_cons<I>`, ...) that aren't
/// trait-object safe.
pub trait AbsPoly: std::fmt::Debug {
    fn space_dim(&self) -> usize;
    fn topology(&self) -> Topology;
    fn is_empty(&mut self) -> bool;
    fn is_universe(&mut self) -> bool;

    fn add_con(&mut self, c: Con);
    fn add_cons(&mut self, cs: Vec<Con>) {
        for c in cs {
            self.add_con(c);
        }
    }
    fn add_gen(&mut self, g: Gen);
    fn add_gens(&mut self, gs: Vec<Gen>) {
        for g in gs {
            self.add_gen(g);
        }
    }
    fn copy_cons(&mut self) -> Vec<Con>;
    fn copy_gens(&mut self) -> Vec<Gen>;

    fn get_bounds(&mut self, var: usize) -> Itv;
    fn unconstrain_assign(&mut self, vars: &[usize]);
    fn add_space_dims_assign(&mut self, m: usize, project: bool);
    fn remove_space_dims_assign(&mut self, dims: &[usize]);
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z);
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z);

    /// Flattens to a plain polyhedron; the common ground every kind's
    /// default cross-kind binary operation reduces to.
    fn to_poly(&mut self) -> Poly;

    fn contains(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.to_poly().contains(&mut other.to_poly())
    }
    fn equals(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.to_poly().equals(&mut other.to_poly())
    }
    fn is_disjoint_from(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.to_poly().is_disjoint_from(&mut other.to_poly())
    }
    fn intersection_assign(&mut self, other: &mut dyn AbsPoly);
    fn poly_hull_assign(&mut self, other: &mut dyn AbsPoly);
    fn widening_assign(&mut self, other: &mut dyn AbsPoly, upto: Option<&[Con]>);

    fn ascii_dump(&mut self) -> String {
        crate::ascii::dump_poly(&mut self.to_poly())
    }
    fn get_memory_in_bytes(&self) -> usize {
        std::mem::size_of_val(self)
    }
    fn clone_box(&self) -> Box<dyn AbsPoly>;
}

impl Clone for Box<dyn AbsPoly> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

macro_rules! impl_abs_poly_via_to_poly_binops {
    ($ty:ty) => {
        fn intersection_assign(&mut self, other: &mut dyn AbsPoly) {
            let mut rhs = other.to_poly();
            let mut lhs = self.to_poly();
            lhs.intersection_assign(&mut rhs);
            *self = <$ty>::from_poly_like(lhs);
        }
        fn poly_hull_assign(&mut self, other: &mut dyn AbsPoly) {
            let mut rhs = other.to_poly();
            let mut lhs = self.to_poly();
            lhs.poly_hull_assign(&mut rhs);
            *self = <$ty>::from_poly_like(lhs);
        }
        fn widening_assign(&mut self, other: &mut dyn AbsPoly, upto: Option<&[Con]>) {
            let mut rhs = other.to_poly();
            let mut lhs = self.to_poly();
            lhs.widening_assign(&mut rhs, upto);
            *self = <$ty>::from_poly_like(lhs);
        }
    };
}

trait FromPolyLike {
    fn from_poly_like(p: Poly) -> Self;
}

impl FromPolyLike for Poly {
    fn from_poly_like(p: Poly) -> Self {
        p
    }
}
impl FromPolyLike for BPoly {
    fn from_poly_like(p: Poly) -> Self {
        BPoly::new(p)
    }
}
impl FromPolyLike for FPoly {
    fn from_poly_like(p: Poly) -> Self {
        FPoly::from_poly(p)
    }
}
impl FromPolyLike for UPoly {
    fn from_poly_like(p: Poly) -> Self {
        UPoly::from_poly(p)
    }
}

impl AbsPoly for Poly {
    fn space_dim(&self) -> usize {
        Poly::space_dim(self)
    }
    fn topology(&self) -> Topology {
        Poly::topology(self)
    }
    fn is_empty(&mut self) -> bool {
        Poly::is_empty(self)
    }
    fn is_universe(&mut self) -> bool {
        Poly::is_universe(self)
    }
    fn add_con(&mut self, c: Con) {
        Poly::add_con(self, c)
    }
    fn add_gen(&mut self, g: Gen) {
        Poly::add_gen(self, g)
    }
    fn copy_cons(&mut self) -> Vec<Con> {
        self.cons()
    }
    fn copy_gens(&mut self) -> Vec<Gen> {
        self.gens()
    }
    fn get_bounds(&mut self, var: usize) -> Itv {
        Poly::get_bounds(self, var)
    }
    fn unconstrain_assign(&mut self, vars: &[usize]) {
        Poly::unconstrain_assign(self, vars)
    }
    fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        Poly::add_space_dims_assign(self, m, project)
    }
    fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        Poly::remove_space_dims_assign(self, dims)
    }
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        Poly::affine_image_assign(self, var, e, b, den)
    }
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        Poly::affine_preimage_assign(self, var, e, b, den)
    }
    fn to_poly(&mut self) -> Poly {
        self.clone()
    }
    fn clone_box(&self) -> Box<dyn AbsPoly> {
        Box::new(self.clone())
    }
    impl_abs_poly_via_to_poly_binops!(Poly);
}

impl AbsPoly for BPoly {
    fn space_dim(&self) -> usize {
        self.core().space_dim()
    }
    fn topology(&self) -> Topology {
        self.core().topology()
    }
    fn is_empty(&mut self) -> bool {
        self.core_mut().is_empty()
    }
    fn is_universe(&mut self) -> bool {
        self.core_mut().is_universe()
    }
    fn add_con(&mut self, c: Con) {
        self.core_mut().add_con(c)
    }
    fn add_gen(&mut self, g: Gen) {
        self.core_mut().add_gen(g)
    }
    fn copy_cons(&mut self) -> Vec<Con> {
        self.core_mut().cons()
    }
    fn copy_gens(&mut self) -> Vec<Gen> {
        self.core_mut().gens()
    }
    fn get_bounds(&mut self, var: usize) -> Itv {
        self.bbox().itv(var).clone()
    }
    fn unconstrain_assign(&mut self, vars: &[usize]) {
        self.core_mut().unconstrain_assign(vars)
    }
    fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        self.core_mut().add_space_dims_assign(m, project)
    }
    fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        self.core_mut().remove_space_dims_assign(dims)
    }
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        self.core_mut().affine_image_assign(var, e, b, den)
    }
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        self.core_mut().affine_preimage_assign(var, e, b, den)
    }
    fn to_poly(&mut self) -> Poly {
        self.core().clone()
    }
    fn clone_box(&self) -> Box<dyn AbsPoly> {
        Box::new(self.clone())
    }
    impl_abs_poly_via_to_poly_binops!(BPoly);
}

impl AbsPoly for FPoly {
    fn space_dim(&self) -> usize {
        FPoly::space_dim(self)
    }
    fn topology(&self) -> Topology {
        FPoly::topology(self)
    }
    fn is_empty(&mut self) -> bool {
        FPoly::is_empty(self)
    }
    fn is_universe(&mut self) -> bool {
        FPoly::is_universe(self)
    }
    fn add_con(&mut self, c: Con) {
        FPoly::add_con(self, c)
    }
    fn add_gen(&mut self, _g: Gen) {
        // The factor-preserving discipline covers add_con and
        // affine_image_assign only; generator-level construction goes
        // through `to_poly`/`from_poly` instead.
        let mut p = self.to_poly();
        p.add_gen(_g);
        *self = FPoly::from_poly(p);
    }
    fn copy_cons(&mut self) -> Vec<Con> {
        self.to_poly().cons()
    }
    fn copy_gens(&mut self) -> Vec<Gen> {
        self.to_poly().gens()
    }
    fn get_bounds(&mut self, var: usize) -> Itv {
        FPoly::get_bounds(self, var)
    }
    fn unconstrain_assign(&mut self, vars: &[usize]) {
        FPoly::unconstrain_assign(self, vars)
    }
    fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        FPoly::add_space_dims_assign(self, m, project)
    }
    fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        FPoly::remove_space_dims_assign(self, dims)
    }
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        FPoly::affine_image_assign(self, var, e, b, den)
    }
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        FPoly::affine_preimage_assign(self, var, e, b, den)
    }
    fn to_poly(&mut self) -> Poly {
        FPoly::to_poly(self)
    }
    fn clone_box(&self) -> Box<dyn AbsPoly> {
        Box::new(self.clone())
    }
    impl_abs_poly_via_to_poly_binops!(FPoly);
}

impl AbsPoly for UPoly {
    fn space_dim(&self) -> usize {
        UPoly::space_dim(self)
    }
    fn topology(&self) -> Topology {
        UPoly::topology(self)
    }
    fn is_empty(&mut self) -> bool {
        UPoly::is_empty(self)
    }
    fn is_universe(&mut self) -> bool {
        UPoly::is_universe(self)
    }
    fn add_con(&mut self, c: Con) {
        UPoly::add_con(self, c)
    }
    fn add_gen(&mut self, g: Gen) {
        UPoly::add_gen(self, g)
    }
    fn copy_cons(&mut self) -> Vec<Con> {
        self.to_poly().cons()
    }
    fn copy_gens(&mut self) -> Vec<Gen> {
        self.to_poly().gens()
    }
    fn get_bounds(&mut self, var: usize) -> Itv {
        UPoly::get_bounds(self, var)
    }
    fn unconstrain_assign(&mut self, vars: &[usize]) {
        UPoly::unconstrain_assign(self, vars)
    }
    fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        let mut p = self.to_poly();
        p.add_space_dims_assign(m, project);
        *self = UPoly::from_poly(p);
    }
    fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        let mut p = self.to_poly();
        p.remove_space_dims_assign(dims);
        *self = UPoly::from_poly(p);
    }
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        UPoly::affine_image_assign(self, var, e, b, den)
    }
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        let mut p = self.to_poly();
        p.affine_preimage_assign(var, e, b, den);
        *self = UPoly::from_poly(p);
    }
    fn to_poly(&mut self) -> Poly {
        UPoly::to_poly(self)
    }
    fn clone_box(&self) -> Box<dyn AbsPoly> {
        Box::new(self.clone())
    }
    impl_abs_poly_via_to_poly_binops!(UPoly);
}

// ======================================================================
// PolyKind - PUBLIC

/// The factory's concrete variant tag, and the variant itself.
#[derive(Debug)]
pub enum PolyKind {
    Poly(Poly),
    BPoly(BPoly),
    FPoly(FPoly),
    UPoly(UPoly),
}

impl PolyKind {
    pub fn new_universe(tag: PolyKindTag, d: usize, topology: Topology) -> PolyKind {
        match tag {
            PolyKindTag::Poly => PolyKind::Poly(Poly::new_universe_with(d, topology)),
            PolyKindTag::BPoly => PolyKind::BPoly(BPoly::new(Poly::new_universe_with(d, topology))),
            PolyKindTag::FPoly => PolyKind::FPoly(FPoly::new_universe_with(d, topology)),
            PolyKindTag::UPoly => PolyKind::UPoly(UPoly::new_universe_with(d, topology)),
        }
    }

    pub fn as_abs_poly(&mut self) -> &mut dyn AbsPoly {
        match self {
            PolyKind::Poly(p) => p,
            PolyKind::BPoly(p) => p,
            PolyKind::FPoly(p) => p,
            PolyKind::UPoly(p) => p,
        }
    }

    pub fn into_box(self) -> Box<dyn AbsPoly> {
        match self {
            PolyKind::Poly(p) => Box::new(p),
            PolyKind::BPoly(p) => Box::new(p),
            PolyKind::FPoly(p) => Box::new(p),
            PolyKind::UPoly(p) => Box::new(p),
        }
    }
}

/// The four concrete variants this crate actually builds, independent of
/// the `_Stats` decoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolyKindTag {
    Poly,
    BPoly,
    FPoly,
    UPoly,
}

/// Case-sensitive lookup of a polyhedron-kind name into `(tag,
/// wants_stats)`. Only the eight names this crate actually builds
/// resolve; any other name (including kinds judged out of scope for this
/// exercise, like an unconstrained-over-factored kernel or a disjunctive
/// powerset domain) is rejected like any unknown string.
pub fn name_to_kind(name: &str) -> Option<(PolyKindTag, bool)> {
    match name {
        "Poly" => Some((PolyKindTag::Poly, false)),
        "Poly_Stats" => Some((PolyKindTag::Poly, true)),
        "B_Poly" => Some((PolyKindTag::BPoly, false)),
        "B_Poly_Stats" => Some((PolyKindTag::BPoly, true)),
        "F_Poly" => Some((PolyKindTag::FPoly, false)),
        "F_Poly_Stats" => Some((PolyKindTag::FPoly, true)),
        "U_Poly" => Some((PolyKindTag::UPoly, false)),
        "U_Poly_Stats" => Some((PolyKindTag::UPoly, true)),
        _ => None,
    }
}

/// Builds the universe polyhedron of the named kind, using the thread's
/// current default topology, `Stats`-wrapped if the name requested it.
pub fn build_universe(name: &str, d: usize) -> Option<Box<dyn AbsPoly>> {
    let (tag, stats) = name_to_kind(name)?;
    let topology = crate::config::current().default_topology;
    let kind = PolyKind::new_universe(tag, d, topology).into_box();
    Some(if stats { Box::new(Stats::new(kind)) } else { kind })
}

// ======================================================================
// Stats - PUBLIC

/// Per-operation call count and cumulative wall-clock time, keyed by
/// method name; wraps any [`AbsPoly`] and forwards every call, recording
/// timing around it.
pub struct Stats {
    inner: Box<dyn AbsPoly>,
    counters: RefCell<BTreeMap<&'static str, (u64, Duration)>>,
    noisy: bool,
}

impl std::fmt::Debug for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stats").field("inner", &self.inner).finish()
    }
}

impl Stats {
    pub fn new(inner: Box<dyn AbsPoly>) -> Self {
        Stats { inner, counters: RefCell::new(BTreeMap::new()), noisy: crate::config::current().noisy_stats }
    }

    fn record<R>(&mut self, name: &'static str, f: impl FnOnce(&mut dyn AbsPoly) -> R) -> R {
        let start = Instant::now();
        let r = f(self.inner.as_mut());
        let elapsed = start.elapsed();
        let mut counters = self.counters.borrow_mut();
        let entry = counters.entry(name).or_insert((0, Duration::ZERO));
        entry.0 += 1;
        entry.1 += elapsed;
        if self.noisy {
            tracing::info!(op = name, calls = entry.0, total = ?entry.1, "stats");
        }
        r
    }

    /// Snapshot of `(calls, cumulative time)` per recorded operation name.
    pub fn counters(&self) -> BTreeMap<&'static str, (u64, Duration)> {
        self.counters.borrow().clone()
    }
}

impl AbsPoly for Stats {
    fn space_dim(&self) -> usize {
        self.inner.space_dim()
    }
    fn topology(&self) -> Topology {
        self.inner.topology()
    }
    fn is_empty(&mut self) -> bool {
        self.record("is_empty", |p| p.is_empty())
    }
    fn is_universe(&mut self) -> bool {
        self.record("is_universe", |p| p.is_universe())
    }
    fn add_con(&mut self, c: Con) {
        self.record("add_con", |p| p.add_con(c))
    }
    fn add_gen(&mut self, g: Gen) {
        self.record("add_gen", |p| p.add_gen(g))
    }
    fn copy_cons(&mut self) -> Vec<Con> {
        self.record("copy_cons", |p| p.copy_cons())
    }
    fn copy_gens(&mut self) -> Vec<Gen> {
        self.record("copy_gens", |p| p.copy_gens())
    }
    fn get_bounds(&mut self, var: usize) -> Itv {
        self.record("get_bounds", |p| p.get_bounds(var))
    }
    fn unconstrain_assign(&mut self, vars: &[usize]) {
        self.record("unconstrain_assign", |p| p.unconstrain_assign(vars))
    }
    fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        self.record("add_space_dims_assign", |p| p.add_space_dims_assign(m, project))
    }
    fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        self.record("remove_space_dims_assign", |p| p.remove_space_dims_assign(dims))
    }
    fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        self.record("affine_image_assign", |p| p.affine_image_assign(var, e, b, den))
    }
    fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        self.record("affine_preimage_assign", |p| p.affine_preimage_assign(var, e, b, den))
    }
    fn to_poly(&mut self) -> Poly {
        self.record("to_poly", |p| p.to_poly())
    }
    fn contains(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.record("contains", |p| p.contains(other))
    }
    fn equals(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.record("equals", |p| p.equals(other))
    }
    fn is_disjoint_from(&mut self, other: &mut dyn AbsPoly) -> bool {
        self.record("is_disjoint_from", |p| p.is_disjoint_from(other))
    }
    fn intersection_assign(&mut self, other: &mut dyn AbsPoly) {
        self.record("intersection_assign", |p| p.intersection_assign(other))
    }
    fn poly_hull_assign(&mut self, other: &mut dyn AbsPoly) {
        self.record("poly_hull_assign", |p| p.poly_hull_assign(other))
    }
    fn widening_assign(&mut self, other: &mut dyn AbsPoly, upto: Option<&[Con]>) {
        self.record("widening_assign", |p| p.widening_assign(other, upto))
    }
    fn get_memory_in_bytes(&self) -> usize {
        self.inner.get_memory_in_bytes()
    }
    fn clone_box(&self) -> Box<dyn AbsPoly> {
        Box::new(Stats {
            inner: self.inner.clone_box(),
            counters: RefCell::new(self.counters.borrow().clone()),
            noisy: self.noisy,
        })
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_to_kind_rejects_unbuilt_and_unknown_names() {
        assert_eq!(name_to_kind("Poly"), Some((PolyKindTag::Poly, false)));
        assert_eq!(name_to_kind("F_Poly_Stats"), Some((PolyKindTag::FPoly, true)));
        assert_eq!(name_to_kind("UF_Poly"), None);
        assert_eq!(name_to_kind("P_Set"), None);
        assert_eq!(name_to_kind("poly"), None);
    }

    #[test]
    fn factory_builds_a_universe_of_the_requested_kind() {
        let mut p = build_universe("B_Poly", 3).unwrap();
        assert_eq!(p.space_dim(), 3);
        assert!(p.is_universe());
    }

    #[test]
    fn stats_counts_every_forwarded_call() {
        let inner = PolyKind::new_universe(PolyKindTag::Poly, 2, Topology::Closed).into_box();
        let mut stats = Stats::new(inner);
        stats.is_empty();
        stats.is_empty();
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        stats.add_con(Con::nonstrict(e, Z::from(0)));
        let counters = stats.counters();
        assert_eq!(counters.get("is_empty").unwrap().0, 2);
        assert_eq!(counters.get("add_con").unwrap().0, 1);
    }

    #[test]
    fn cross_kind_binary_op_flattens_through_to_poly() {
        let mut a = PolyKind::new_universe(PolyKindTag::FPoly, 2, Topology::Closed).into_box();
        let mut e0 = LinExpr::zero_dim(2);
        e0.set(0, Z::from(1));
        a.add_con(Con::nonstrict(e0, Z::from(0)));
        let mut b = PolyKind::new_universe(PolyKindTag::UPoly, 2, Topology::Closed).into_box();
        assert!(b.contains(&mut *a));
    }
}
