//! `FPoly`: Cartesian factorization over independent blocks of dimensions.
//!
//! A polyhedron is often a Cartesian product of much lower-dimensional
//! pieces: dimensions that no constraint ever couples together. `FPoly`
//! keeps such pieces (`factors`) apart instead of paying DD-conversion cost
//! over the whole space every time. `blocks[i]` lists, in an arbitrary but
//! fixed order, the global dimensions owned by `factors[i]`; a block of
//! length one is always represented as the cheap [`Itv`] special case
//! rather than a one-dimensional [`Poly`].
//!
//! `add_con` and `affine_image_assign` are the two operations that actually
//! preserve the factorization: they touch only the block(s) a constraint or
//! assignment's support overlaps, merging blocks together (via
//! [`cartesian_product`]) only when a single row spans more than one of
//! them. Every other operation — binary combinators, dimension
//! manipulation, splitting — is implemented by flattening to a plain
//! [`Poly`] (`to_poly`), delegating to the already-correct `Poly`
//! implementation, and refactorizing the result (`from_poly`). This mirrors
//! the rebuild-based approach `poly::ops` uses throughout: it gives up some
//! of the factoring speedup on these paths in exchange for a single,
//! already-verified code path instead of a second per-factor
//! implementation of every operation.

use std::collections::BTreeMap;

use num_traits::Signed;

use crate::bbox::Itv;
use crate::linexpr::LinExpr;
use crate::num::{self, Q, Z};
use crate::poly::{ops, Poly};
use crate::row::{Con, Gen, GenType, Topology};

// ======================================================================
// Factor - PUBLIC

/// One piece of a Cartesian factorization: either a single unconstrained-
/// except-by-bounds dimension, kept as a raw interval, or a genuine
/// multi-dimensional block kept as a full [`Poly`].
#[derive(Clone, Debug)]
pub enum Factor {
    Interval(Itv),
    Block(Poly),
}

fn combined_topology(a: Topology, b: Topology) -> Topology {
    if a.is_nnc() || b.is_nnc() {
        Topology::Nnc
    } else {
        Topology::Closed
    }
}

fn factor_as_poly(factor: &Factor, topology: Topology) -> Poly {
    match factor {
        Factor::Block(p) => p.clone(),
        Factor::Interval(itv) => itv_to_poly(itv, topology),
    }
}

fn itv_to_poly(itv: &Itv, topology: Topology) -> Poly {
    if itv.is_empty() {
        return Poly::new_empty_with(1, topology);
    }
    let mut p = Poly::new_universe_with(1, topology);
    if let Some(lb) = itv.lb_rational() {
        let mut e = LinExpr::zero_dim(1);
        e.set(0, lb.denom().clone());
        p.add_con(if itv.is_lb_closed() {
            Con::nonstrict(e, -lb.numer().clone())
        } else {
            Con::strict(e, -lb.numer().clone())
        });
    }
    if let Some(ub) = itv.ub_rational() {
        let mut e = LinExpr::zero_dim(1);
        e.set(0, -ub.denom().clone());
        p.add_con(if itv.is_ub_closed() {
            Con::nonstrict(e, ub.numer().clone())
        } else {
            Con::strict(e, ub.numer().clone())
        });
    }
    p
}

/// The interval a single-dimension constraint `coeff * x + b ⊙ 0` carves
/// out of the real line.
fn con_to_itv(c: &Con, coeff: &Z) -> Itv {
    let bound = Q::new(-c.inhomo_term().clone(), coeff.clone());
    if c.is_equality() {
        return Itv::singleton(bound);
    }
    let closed = !c.is_strict();
    if coeff.is_positive() {
        Itv::from_parts(Some(bound), closed, None, false)
    } else {
        Itv::from_parts(None, false, Some(bound), closed)
    }
}

fn localize_con(c: &Con, block_dims: &[usize]) -> Con {
    let mut expr = LinExpr::zero_dim(block_dims.len());
    for (local, &g) in block_dims.iter().enumerate() {
        expr.set(local, c.linear_expr().get(g));
    }
    Con::new(expr, c.inhomo_term().clone(), c.con_type())
}

fn embed_gen(g: &Gen, offset: usize, d: usize) -> Gen {
    let mut expr = LinExpr::zero_dim(d);
    for i in 0..g.space_dim() {
        expr.set(offset + i, g.linear_expr().get(i));
    }
    Gen::new(g.gen_type(), expr, g.divisor().clone())
}

/// The Cartesian product of `a` and `b` as a plain polyhedron: `a`'s
/// dimensions occupy `0..a.space_dim()`, `b`'s occupy the rest. Genuinely
/// different from a convex hull of the two embedded separately (that would
/// compute the hull of the *union*, losing the requirement that every
/// point pairs an `a`-point with a `b`-point), so this builds the product
/// generator system directly: every point/closure-point pair, plus each
/// operand's lines and rays embedded with zero coordinates in the other's
/// dimensions.
pub(crate) fn cartesian_product(a: &mut Poly, b: &mut Poly) -> Poly {
    let la = a.space_dim();
    let lb = b.space_dim();
    let d = la + lb;
    let topology = combined_topology(a.topology(), b.topology());
    if a.is_empty() || b.is_empty() {
        return Poly::new_empty_with(d, topology);
    }
    let a_gens = a.gens();
    let b_gens = b.gens();
    let mut gens = Vec::new();
    for pa in a_gens.iter().filter(|g| g.is_point_or_closure_point()) {
        for pb in b_gens.iter().filter(|g| g.is_point_or_closure_point()) {
            let den = num::lcm(pa.divisor(), pb.divisor());
            let ka = &den / pa.divisor();
            let kb = &den / pb.divisor();
            let mut expr = LinExpr::zero_dim(d);
            for i in 0..la {
                expr.set(i, pa.linear_expr().get(i) * &ka);
            }
            for i in 0..lb {
                expr.set(la + i, pb.linear_expr().get(i) * &kb);
            }
            let typ = if pa.is_closure_point() || pb.is_closure_point() {
                GenType::ClosurePoint
            } else {
                GenType::Point
            };
            gens.push(Gen::new(typ, expr, den));
        }
    }
    for g in a_gens.iter().filter(|g| g.is_line_or_ray()) {
        gens.push(embed_gen(g, 0, d));
    }
    for g in b_gens.iter().filter(|g| g.is_line_or_ray()) {
        gens.push(embed_gen(g, la, d));
    }
    ops::rebuild_from_gens(d, topology, gens)
}

fn uf_find(parent: &mut [usize], x: usize) -> usize {
    if parent[x] != x {
        parent[x] = uf_find(parent, parent[x]);
    }
    parent[x]
}

fn uf_union(parent: &mut [usize], x: usize, y: usize) {
    let rx = uf_find(parent, x);
    let ry = uf_find(parent, y);
    if rx != ry {
        parent[rx] = ry;
    }
}

// ======================================================================
// FPoly - PUBLIC

/// A polyhedron represented as a Cartesian product of independent factors.
#[derive(Clone, Debug)]
pub struct FPoly {
    d: usize,
    topology: Topology,
    empty: bool,
    blocks: Vec<Vec<usize>>,
    factors: Vec<Factor>,
}

impl FPoly {
    /// The universe, one single-dimension `Interval` factor per dimension.
    pub fn new_universe_with(d: usize, topology: Topology) -> Self {
        let blocks = (0..d).map(|i| vec![i]).collect();
        let factors = (0..d).map(|_| Factor::Interval(Itv::universe())).collect();
        FPoly { d, topology, empty: false, blocks, factors }
    }

    /// The empty polyhedron.
    pub fn new_empty_with(d: usize, topology: Topology) -> Self {
        FPoly { d, topology, empty: true, blocks: Vec::new(), factors: Vec::new() }
    }

    pub fn space_dim(&self) -> usize {
        self.d
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The current block partition: `blocks()[i]` lists the global
    /// dimensions owned by the `i`-th factor, in no particular order.
    pub fn blocks(&self) -> &[Vec<usize>] {
        &self.blocks
    }

    pub fn is_universe(&mut self) -> bool {
        if self.empty {
            return false;
        }
        self.factors.iter_mut().all(|f| match f {
            Factor::Interval(itv) => {
                !itv.is_empty() && itv.lb_rational().is_none() && itv.ub_rational().is_none()
            }
            Factor::Block(p) => p.is_universe(),
        })
    }

    fn block_index_of(&self, v: usize) -> usize {
        self.blocks
            .iter()
            .position(|b| b.contains(&v))
            .expect("dimension must belong to exactly one block")
    }

    /// Unions every block touching any of `dims` into one, materializing
    /// and Cartesian-multiplying as needed, and returns its index.
    pub(crate) fn merge_blocks(&mut self, dims: &[usize]) -> usize {
        let mut touched: Vec<usize> = dims.iter().map(|&v| self.block_index_of(v)).collect();
        touched.sort_unstable();
        touched.dedup();
        if touched.len() == 1 {
            return touched[0];
        }
        let mut acc_dims = self.blocks[touched[0]].clone();
        let mut acc_poly = factor_as_poly(&self.factors[touched[0]], self.topology);
        for &idx in &touched[1..] {
            let mut next = factor_as_poly(&self.factors[idx], self.topology);
            acc_poly = cartesian_product(&mut acc_poly, &mut next);
            acc_dims.extend(self.blocks[idx].iter().copied());
        }
        for &idx in touched.iter().rev() {
            self.blocks.remove(idx);
            self.factors.remove(idx);
        }
        self.blocks.push(acc_dims);
        self.factors.push(Factor::Block(acc_poly));
        self.blocks.len() - 1
    }

    /// Rebuilds a block partition from scratch by unioning the supports of
    /// `p`'s minimized constraints: two dimensions end up in the same
    /// block iff some constraint mentions both.
    pub fn from_poly(mut p: Poly) -> FPoly {
        let d = p.space_dim();
        let topology = p.topology();
        if p.is_empty() {
            return FPoly::new_empty_with(d, topology);
        }
        let cons = p.cons();
        let mut parent: Vec<usize> = (0..d).collect();
        for c in &cons {
            let members: Vec<usize> = c.linear_expr().support().iter().collect();
            for w in members.windows(2) {
                uf_union(&mut parent, w[0], w[1]);
            }
        }
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..d {
            let r = uf_find(&mut parent, i);
            groups.entry(r).or_default().push(i);
        }
        let blocks: Vec<Vec<usize>> = groups.into_values().collect();
        let mut factors = Vec::with_capacity(blocks.len());
        for dims in &blocks {
            let mut sub = p.clone();
            let mut pfunc: Vec<Option<usize>> = vec![None; d];
            for (local, &g) in dims.iter().enumerate() {
                pfunc[g] = Some(local);
            }
            sub.map_space_dims_assign(&pfunc);
            factors.push(if dims.len() == 1 {
                Factor::Interval(sub.get_bounds(0))
            } else {
                Factor::Block(sub)
            });
        }
        FPoly { d, topology, empty: false, blocks, factors }
    }

    /// Flattens into a plain polyhedron, undoing the factorization.
    pub fn to_poly(&mut self) -> Poly {
        if self.empty {
            return Poly::new_empty_with(self.d, self.topology);
        }
        let mut acc: Option<(Poly, Vec<usize>)> = None;
        for (dims, factor) in self.blocks.iter().zip(self.factors.iter()) {
            let fp = factor_as_poly(factor, self.topology);
            acc = Some(match acc {
                None => (fp, dims.clone()),
                Some((mut acc_poly, mut acc_dims)) => {
                    let mut fp = fp;
                    let merged = cartesian_product(&mut acc_poly, &mut fp);
                    acc_dims.extend(dims.iter().copied());
                    (merged, acc_dims)
                }
            });
        }
        let (mut poly, dims) = match acc {
            Some(v) => v,
            None => return Poly::new_universe_with(self.d, self.topology),
        };
        let mut pfunc: Vec<Option<usize>> = vec![None; dims.len()];
        for (local, &g) in dims.iter().enumerate() {
            pfunc[local] = Some(g);
        }
        poly.map_space_dims_assign(&pfunc);
        poly
    }

    // ============================================================
    // BLOCK-PRESERVING OPERATIONS

    pub fn add_con(&mut self, c: Con) {
        if self.empty {
            return;
        }
        let dims: Vec<usize> = c.linear_expr().support().iter().collect();
        if dims.is_empty() {
            if c.is_inconsistent() {
                self.empty = true;
            }
            return;
        }
        let idx = self.merge_blocks(&dims);
        let block_dims = self.blocks[idx].clone();
        if block_dims.len() == 1 {
            let coeff = c.linear_expr().get(block_dims[0]);
            if let Factor::Interval(itv) = &self.factors[idx] {
                let merged = itv.intersect(&con_to_itv(&c, &coeff));
                if merged.is_empty() {
                    self.empty = true;
                } else {
                    self.factors[idx] = Factor::Interval(merged);
                }
                return;
            }
        }
        let mut sub = factor_as_poly(&self.factors[idx], self.topology);
        sub.add_con(localize_con(&c, &block_dims));
        if sub.is_empty() {
            self.empty = true;
        } else {
            self.factors[idx] = Factor::Block(sub);
        }
    }

    pub fn add_cons<I: IntoIterator<Item = Con>>(&mut self, cs: I) {
        for c in cs {
            self.add_con(c);
            if self.empty {
                return;
            }
        }
    }

    pub fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        if self.empty {
            return;
        }
        let mut dims: Vec<usize> = e.support().iter().collect();
        if !dims.contains(&var) {
            dims.push(var);
        }
        let idx = self.merge_blocks(&dims);
        let block_dims = self.blocks[idx].clone();
        let local_var = block_dims.iter().position(|&g| g == var).unwrap();
        let mut local_e = LinExpr::zero_dim(block_dims.len());
        for (local, &g) in block_dims.iter().enumerate() {
            local_e.set(local, e.get(g));
        }
        let mut sub = factor_as_poly(&self.factors[idx], self.topology);
        sub.affine_image_assign(local_var, &local_e, b, den);
        if sub.is_empty() {
            self.empty = true;
            return;
        }
        self.factors[idx] = if block_dims.len() == 1 {
            Factor::Interval(sub.get_bounds(0))
        } else {
            Factor::Block(sub)
        };
    }

    pub fn get_bounds(&mut self, var: usize) -> Itv {
        if self.empty {
            return Itv::empty();
        }
        let idx = self.block_index_of(var);
        let block_dims = self.blocks[idx].clone();
        match &mut self.factors[idx] {
            Factor::Interval(itv) => itv.clone(),
            Factor::Block(p) => {
                let local = block_dims.iter().position(|&g| g == var).unwrap();
                p.get_bounds(local)
            }
        }
    }

    pub fn unconstrain_assign(&mut self, vars: &[usize]) {
        if self.empty {
            return;
        }
        for &v in vars {
            let idx = self.block_index_of(v);
            let block_dims = self.blocks[idx].clone();
            if block_dims.len() == 1 {
                self.factors[idx] = Factor::Interval(Itv::universe());
                continue;
            }
            let local = block_dims.iter().position(|&g| g == v).unwrap();
            let mut sub = factor_as_poly(&self.factors[idx], self.topology);
            sub.unconstrain_assign(&[local]);
            self.factors[idx] = Factor::Block(sub);
        }
    }

    pub fn topological_closure_assign(&mut self) {
        if self.empty {
            return;
        }
        for factor in self.factors.iter_mut() {
            match factor {
                Factor::Interval(itv) => {
                    if !itv.is_empty() {
                        *itv = Itv::from_parts(itv.lb_rational(), true, itv.ub_rational(), true);
                    }
                }
                Factor::Block(p) => p.topological_closure_assign(),
            }
        }
    }

    pub fn set_topology_assign(&mut self, new_topology: Topology) {
        self.topology = new_topology;
        if self.empty {
            return;
        }
        for factor in self.factors.iter_mut() {
            if let Factor::Block(p) = factor {
                p.set_topology_assign(new_topology);
            }
        }
    }

    // ============================================================
    // FLATTEN-AND-REFACTORIZE OPERATIONS
    //
    // Everything below gives up per-factor locality for a single
    // already-verified code path: flatten both operands, delegate to
    // `Poly`, refactorize the result.

    pub fn contains(&mut self, other: &mut FPoly) -> bool {
        if other.empty {
            return true;
        }
        if self.empty {
            return false;
        }
        self.to_poly().contains(&mut other.to_poly())
    }

    pub fn equals(&mut self, other: &mut FPoly) -> bool {
        if self.empty || other.empty {
            return self.empty == other.empty;
        }
        self.to_poly().equals(&mut other.to_poly())
    }

    pub fn is_disjoint_from(&mut self, other: &mut FPoly) -> bool {
        if self.empty || other.empty {
            return true;
        }
        self.to_poly().is_disjoint_from(&mut other.to_poly())
    }

    pub fn intersection_assign(&mut self, other: &mut FPoly) {
        let mut a = self.to_poly();
        a.intersection_assign(&mut other.to_poly());
        *self = FPoly::from_poly(a);
    }

    pub fn poly_hull_assign(&mut self, other: &mut FPoly) {
        let mut a = self.to_poly();
        a.poly_hull_assign(&mut other.to_poly());
        *self = FPoly::from_poly(a);
    }

    pub fn time_elapse_assign(&mut self, other: &mut FPoly) {
        let mut a = self.to_poly();
        a.time_elapse_assign(&mut other.to_poly());
        *self = FPoly::from_poly(a);
    }

    pub fn widening_assign(&mut self, y: &mut FPoly, upto: Option<&[Con]>) {
        let mut a = self.to_poly();
        a.widening_assign(&mut y.to_poly(), upto);
        *self = FPoly::from_poly(a);
    }

    pub fn affine_preimage_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        let mut p = self.to_poly();
        p.affine_preimage_assign(var, e, b, den);
        *self = FPoly::from_poly(p);
    }

    pub fn add_space_dims_assign(&mut self, m: usize, project: bool) {
        let mut p = self.to_poly();
        p.add_space_dims_assign(m, project);
        *self = FPoly::from_poly(p);
    }

    pub fn remove_space_dims_assign(&mut self, dims: &[usize]) {
        let mut p = self.to_poly();
        p.remove_space_dims_assign(dims);
        *self = FPoly::from_poly(p);
    }

    pub fn remove_higher_space_dims_assign(&mut self, new_dim: usize) {
        let mut p = self.to_poly();
        p.remove_higher_space_dims_assign(new_dim);
        *self = FPoly::from_poly(p);
    }

    pub fn map_space_dims_assign(&mut self, pfunc: &[Option<usize>]) {
        let mut p = self.to_poly();
        p.map_space_dims_assign(pfunc);
        *self = FPoly::from_poly(p);
    }

    pub fn fold_space_dims_assign(&mut self, vars: &[usize], dest: usize) {
        let mut p = self.to_poly();
        p.fold_space_dims_assign(vars, dest);
        *self = FPoly::from_poly(p);
    }

    pub fn expand_space_dim_assign(&mut self, var: usize, m: usize) {
        let mut p = self.to_poly();
        p.expand_space_dim_assign(var, m);
        *self = FPoly::from_poly(p);
    }

    pub fn split(&mut self, c: Con) -> FPoly {
        let mut p = self.to_poly();
        let other = p.split(c);
        *self = FPoly::from_poly(p);
        FPoly::from_poly(other)
    }

    pub fn integral_split(&mut self, c: &Con) -> FPoly {
        let mut p = self.to_poly();
        let other = p.integral_split(c);
        *self = FPoly::from_poly(p);
        FPoly::from_poly(other)
    }

    // ============================================================
    // NORMALIZATION

    /// Canonicalizes block order (by each block's sorted global-dim list)
    /// and minimizes every block factor, so that two `FPoly`s representing
    /// the same polyhedron compare/hash equal regardless of how their
    /// blocks were discovered or merged.
    pub fn normalize(&mut self) {
        if self.empty {
            return;
        }
        for factor in self.factors.iter_mut() {
            if let Factor::Block(p) = factor {
                p.minimize();
            }
        }
        let mut order: Vec<usize> = (0..self.blocks.len()).collect();
        order.sort_by_key(|&i| {
            let mut k = self.blocks[i].clone();
            k.sort_unstable();
            k
        });
        self.blocks = order.iter().map(|&i| self.blocks[i].clone()).collect();
        self.factors = order.iter().map(|&i| self.factors[i].clone()).collect();
    }

    /// A hash consistent with `normalize`d equality. `Con`/`Gen`/`LinExpr`
    /// don't derive `Hash` (their strong-normalization invariants make
    /// structural equality meaningful but not cheap to hash incrementally),
    /// so this hashes each minimized factor's `Debug` rendering instead.
    pub fn hash(&mut self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        self.normalize();
        let mut hasher = DefaultHasher::new();
        self.d.hash(&mut hasher);
        self.topology.hash(&mut hasher);
        self.empty.hash(&mut hasher);
        for (dims, factor) in self.blocks.iter().zip(self.factors.iter()) {
            dims.hash(&mut hasher);
            format!("{factor:?}").hash(&mut hasher);
        }
        hasher.finish()
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded_dim(lo: i64, hi: i64) -> (Con, Con) {
        let mut lb = LinExpr::zero_dim(1);
        lb.set(0, Z::from(1));
        let mut ub = LinExpr::zero_dim(1);
        ub.set(0, Z::from(-1));
        (Con::nonstrict(lb, Z::from(-lo)), Con::nonstrict(ub, Z::from(hi)))
    }

    #[test]
    fn independent_dims_stay_separate_blocks() {
        let mut fp = FPoly::new_universe_with(3, Topology::Closed);
        let mut e0 = LinExpr::zero_dim(3);
        e0.set(0, Z::from(1));
        fp.add_con(Con::nonstrict(e0, Z::from(0)));
        let mut e1 = LinExpr::zero_dim(3);
        e1.set(1, Z::from(1));
        fp.add_con(Con::nonstrict(e1, Z::from(0)));
        assert_eq!(fp.blocks.len(), 3);
        assert!(!fp.is_empty());
    }

    #[test]
    fn coupling_constraint_merges_blocks() {
        let mut fp = FPoly::new_universe_with(2, Topology::Closed);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        e.set(1, Z::from(-1));
        fp.add_con(Con::equality(e, Z::from(0)));
        assert_eq!(fp.blocks.len(), 1);
        assert_eq!(fp.blocks[0].len(), 2);
    }

    #[test]
    fn interval_add_con_stays_an_interval() {
        let mut fp = FPoly::new_universe_with(1, Topology::Closed);
        let (lb, ub) = bounded_dim(0, 5);
        fp.add_con(lb);
        fp.add_con(ub);
        assert!(matches!(fp.factors[0], Factor::Interval(_)));
        let itv = fp.get_bounds(0);
        assert_eq!(itv.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(itv.ub_rational(), Some(Q::from_integer(Z::from(5))));
    }

    #[test]
    fn conflicting_interval_bounds_become_empty() {
        let mut fp = FPoly::new_universe_with(1, Topology::Closed);
        let (lb, _) = bounded_dim(5, 5);
        fp.add_con(lb);
        let mut ub_e = LinExpr::zero_dim(1);
        ub_e.set(0, Z::from(-1));
        fp.add_con(Con::nonstrict(ub_e, Z::from(0)));
        assert!(fp.is_empty());
    }

    #[test]
    fn roundtrip_through_poly_preserves_shape() {
        let mut fp = FPoly::new_universe_with(2, Topology::Closed);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        e.set(1, Z::from(1));
        fp.add_con(Con::nonstrict(e.clone(), Z::from(0)));
        let mut neg = e.clone();
        neg.mul_assign(&Z::from(-1));
        fp.add_con(Con::nonstrict(neg, Z::from(4)));
        let mut back = FPoly::from_poly(fp.to_poly());
        assert!(fp.equals(&mut back));
    }

    #[test]
    fn cartesian_product_of_two_segments_is_a_rectangle() {
        let mut a = Poly::new_universe_with(1, Topology::Closed);
        let (lb, ub) = bounded_dim(0, 1);
        a.add_con(lb);
        a.add_con(ub);
        let mut b = a.clone();
        let mut rect = cartesian_product(&mut a, &mut b);
        assert_eq!(rect.space_dim(), 2);
        assert_eq!(rect.num_min_gens(), 4);
        assert_eq!(rect.affine_dim(), 2);
    }

    #[test]
    fn normalize_makes_equal_shapes_hash_equal() {
        let mut fp1 = FPoly::new_universe_with(2, Topology::Closed);
        let (lb, ub) = bounded_dim(0, 1);
        fp1.add_con(lb.clone());
        fp1.add_con(ub.clone());
        let mut fp2 = FPoly::new_universe_with(2, Topology::Closed);
        fp2.add_con(ub);
        fp2.add_con(lb);
        assert_eq!(fp1.hash(), fp2.hash());
    }
}
