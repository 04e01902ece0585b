//! Widening operators H79 and BHRZ03, plus the BHRZ03 convergence
//! certificate.
//!
//! Throughout this module `x` names the *bigger* operand (the freshly
//! joined iterate) and `y` the *smaller* one that `x` must contain —
//! matching the call convention `risky_widen(x_{k-1}.join(step), x_{k-1})`
//! from an ascending Kleene iteration. A naive reading of "keep the
//! constraints of x satisfied by y" never drops anything (every constraint
//! of a growing interval's upper bound is trivially satisfied by the
//! smaller, earlier interval), so it can't be what actually guarantees
//! termination. The classical Cousot–Halbwachs operator — and the one
//! implemented here — keeps `y`'s constraints that `x` still satisfies.

use std::collections::BTreeMap;

use crate::config::WidenImpl;
use crate::linexpr::LinExpr;
use crate::num::{self, Q, Z};
use crate::row::{Con, Gen, GenType};
use num_traits::Zero;

use super::{ops, Poly, Status};

// ======================================================================
// Certificate - PUBLIC

/// A BHRZ03 convergence certificate: tuples are compared lexicographically,
/// component by component, in the order listed here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    affine_dim: usize,
    lin_space_dim: usize,
    num_sk_cons: usize,
    /// Multiset of strict constraints' support cardinalities, keyed by
    /// cardinality so it compares as an ordered map rather than a raw
    /// sequence (order within a cardinality class carries no information).
    strict_supports: BTreeMap<usize, usize>,
    num_sk_points: usize,
    /// Per-ray count of zero coordinates, sorted ascending for a
    /// deterministic comparison: no canonical ray order exists absent a
    /// sort key, so this is an ordered histogram rather than a raw sequence.
    ray_null_coords: Vec<usize>,
}

impl Certificate {
    /// Computes the certificate of `poly`, minimizing it first.
    pub fn of(poly: &mut Poly) -> Self {
        poly.minimize();
        if poly.status == Status::Empty {
            return Certificate {
                affine_dim: 0,
                lin_space_dim: 0,
                num_sk_cons: 0,
                strict_supports: BTreeMap::new(),
                num_sk_points: 0,
                ray_null_coords: Vec::new(),
            };
        }
        let affine_dim = poly.affine_dim();
        let lin_space_dim = poly.gs.sing.len();
        let num_sk_cons = poly.cs.sk.len();
        let mut strict_supports: BTreeMap<usize, usize> = BTreeMap::new();
        for c in &poly.cs.sk {
            if c.is_strict() {
                let card = c.linear_expr().support().len();
                *strict_supports.entry(card).or_insert(0) += 1;
            }
        }
        let num_sk_points = poly
            .gs
            .sk
            .iter()
            .filter(|g| g.is_point_or_closure_point())
            .count();
        let d = poly.space_dim();
        let mut ray_null_coords: Vec<usize> = poly
            .gs
            .sk
            .iter()
            .filter(|g| g.gen_type() == GenType::Ray)
            .map(|r| (0..d).filter(|&i| r.linear_expr().get(i).is_zero()).count())
            .collect();
        ray_null_coords.sort_unstable();
        Certificate {
            affine_dim,
            lin_space_dim,
            num_sk_cons,
            strict_supports,
            num_sk_points,
            ray_null_coords,
        }
    }

    fn components_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.affine_dim
            .cmp(&other.affine_dim)
            .then_with(|| self.lin_space_dim.cmp(&other.lin_space_dim))
            .then_with(|| self.num_sk_cons.cmp(&other.num_sk_cons))
            .then_with(|| self.strict_supports.cmp(&other.strict_supports))
            .then_with(|| self.num_sk_points.cmp(&other.num_sk_points))
            .then_with(|| self.ray_null_coords.cmp(&other.ray_null_coords))
    }

    /// True iff `self` is strictly smaller than `other` in the
    /// lexicographic order `components_cmp` defines.
    pub fn is_strictly_smaller_than(&self, other: &Self) -> bool {
        self.components_cmp(other) == std::cmp::Ordering::Less
    }
}

// ======================================================================
// H79 - PUBLIC(crate)

/// The Cousot–Halbwachs H79 widening: `x`'s constraints that are not
/// satisfied by `y` are dropped, the rest kept as-is. Requires (and in
/// debug builds checks) `x ⊇ y`.
pub(crate) fn h79_widen(x: &mut Poly, y: &mut Poly) -> Poly {
    debug_assert!(ops::contains(x, y), "H79 widening precondition x ⊇ y violated");
    let d = x.space_dim();
    let topology = x.topology();
    x.minimize();
    if x.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let y_cons = y.cons();
    let kept: Vec<Con> = y_cons
        .into_iter()
        .filter(|c| ops::relation_with_con(x, c).is_included)
        .collect();
    ops::rebuild_from_cons(d, topology, kept)
}

// ======================================================================
// BHRZ03 candidate heuristics

fn gen_key(g: &Gen) -> (GenType, LinExpr, Z) {
    let mut gc = g.clone();
    gc.strong_normalize();
    (gc.gen_type(), gc.linear_expr().clone(), gc.divisor().clone())
}

/// Points of `x` with no syntactic match among `y`'s points, after
/// normalization — the "newly emerged" points BHRZ03's evolving
/// heuristics key off.
fn new_points_of(x: &mut Poly, y: &mut Poly) -> Vec<Gen> {
    let y_keys: Vec<_> = y
        .gens()
        .into_iter()
        .filter(|g| g.is_point_or_closure_point())
        .map(|g| gen_key(&g))
        .collect();
    x.gens()
        .into_iter()
        .filter(|g| g.is_point_or_closure_point())
        .filter(|g| !y_keys.contains(&gen_key(g)))
        .collect()
}

/// Candidate built from `y`'s generators plus, for every newly-emerged
/// point of `x`, a ray pointing from one of `y`'s points towards it —
/// the intuition being that the sequence of new points is "evolving"
/// along that direction and a ray captures the whole future of it at
/// once. Hulled with `x` to guarantee the validity every widening
/// candidate needs (`result ⊇ x`).
fn evolving_rays_candidate(x: &mut Poly, y: &mut Poly) -> Option<Poly> {
    let d = x.space_dim();
    let topology = x.topology();
    let y_points: Vec<Gen> = y.gens().into_iter().filter(|g| g.is_point_or_closure_point()).collect();
    let anchor = y_points.first()?;
    let new_points = new_points_of(x, y);
    if new_points.is_empty() {
        return None;
    }
    let mut gens = y.gens();
    let mut any_ray = false;
    for np in &new_points {
        let mut scaled_new = np.linear_expr().clone();
        scaled_new.mul_assign(anchor.divisor());
        let mut scaled_anchor = anchor.linear_expr().clone();
        scaled_anchor.mul_assign(np.divisor());
        let mut dir = scaled_new;
        let neg_one: Z = -num::one();
        dir.add_mul_assign(&neg_one, &scaled_anchor);
        if !dir.is_zero() {
            gens.push(Gen::new(GenType::Ray, dir, Z::zero()));
            any_ray = true;
        }
    }
    if !any_ray {
        return None;
    }
    let mut cand = ops::rebuild_from_gens(d, topology, gens);
    let mut xc = x.clone();
    Some(ops::hull_gens(&mut cand, &mut xc))
}

fn centroid_gen(points: &[Gen], d: usize) -> Gen {
    let mut coords = vec![Q::zero(); d];
    for p in points {
        for (i, c) in coords.iter_mut().enumerate() {
            *c += p.rational_coord(i);
        }
    }
    let n = Q::from_integer(Z::from(points.len() as i64));
    for c in coords.iter_mut() {
        *c /= n.clone();
    }
    let den = coords.iter().fold(num::one(), |acc, q| num::lcm(&acc, q.denom()));
    let mut expr = LinExpr::zero_dim(d);
    for (i, c) in coords.iter().enumerate() {
        expr.set(i, c.numer() * (&den / c.denom()));
    }
    Gen::point(expr, den)
}

/// Candidate built from `y`'s generators plus the centroid of `x`'s
/// newly-emerged points, standing in for all of them at once. Hulled
/// with `x` for the same validity reason as
/// [`evolving_rays_candidate`].
fn evolving_points_candidate(x: &mut Poly, y: &mut Poly) -> Option<Poly> {
    let d = x.space_dim();
    let topology = x.topology();
    let new_points = new_points_of(x, y);
    if new_points.is_empty() {
        return None;
    }
    let centroid = centroid_gen(&new_points, d);
    let mut gens = y.gens();
    gens.push(centroid);
    let mut cand = ops::rebuild_from_gens(d, topology, gens);
    let mut xc = x.clone();
    Some(ops::hull_gens(&mut cand, &mut xc))
}

/// BHRZ03 widening: computes H79 plus the two evolving-* candidates,
/// keeps whichever has the strictly smallest certificate relative to
/// `x`'s own (falling back to H79, which is always valid even when no
/// candidate improves on it).
pub(crate) fn bhrz03_widen(x: &mut Poly, y: &mut Poly) -> Poly {
    debug_assert!(ops::contains(x, y), "BHRZ03 widening precondition x ⊇ y violated");
    let cert_x = Certificate::of(x);
    let mut best = h79_widen(x, y);
    let mut best_cert = Certificate::of(&mut best);

    if let Some(mut cand) = evolving_rays_candidate(x, y) {
        let cert = Certificate::of(&mut cand);
        if cert.is_strictly_smaller_than(&cert_x) && cert.is_strictly_smaller_than(&best_cert) {
            best = cand;
            best_cert = cert;
        }
    }
    if let Some(mut cand) = evolving_points_candidate(x, y) {
        let cert = Certificate::of(&mut cand);
        if cert.is_strictly_smaller_than(&cert_x) && cert.is_strictly_smaller_than(&best_cert) {
            best = cand;
        }
    }
    best
}

// ======================================================================
// Risky / safe dispatch - PUBLIC(crate)

fn upto_assign(result: &mut Poly, x: &mut Poly, upto: Option<&[Con]>) {
    let Some(upto_cons) = upto else { return };
    let kept: Vec<Con> = upto_cons
        .iter()
        .filter(|c| ops::relation_with_con(x, c).is_included)
        .cloned()
        .collect();
    result.add_cons(kept);
    result.minimize();
}

/// Risky widening: requires (and in debug builds checks) `x ⊇ y`.
pub(crate) fn widen_risky(x: &mut Poly, y: &mut Poly, impl_kind: WidenImpl, upto: Option<&[Con]>) -> Poly {
    let mut result = match impl_kind {
        WidenImpl::H79 => h79_widen(x, y),
        WidenImpl::Bhrz03 => bhrz03_widen(x, y),
    };
    upto_assign(&mut result, x, upto);
    result
}

/// True iff joining `y` into `x` would raise `x`'s affine dimension:
/// every equality of `y` must already be satisfied by every line and
/// skeletal generator of `x` for the join to stay within `x`'s affine
/// hull.
pub(crate) fn increases_affine_dim(x: &mut Poly, y: &mut Poly) -> bool {
    x.minimize();
    y.minimize();
    let equalities = y.cs.sing.clone();
    !equalities.iter().all(|c| ops::con_holds_for_gens(&x.gs, c))
}

/// Safe widening: joins first so any `x`/`y` pair is accepted, then
/// risky-widens the join against the original `x`. If joining already
/// strictly increases the affine dimension, returns the join unchanged
/// instead of risky-widening it — otherwise a single safe-widening step
/// could spuriously raise `x`'s affine dimension.
pub(crate) fn widen_safe(x: &mut Poly, y: &mut Poly, impl_kind: WidenImpl, upto: Option<&[Con]>) -> Poly {
    let raises_dim = increases_affine_dim(x, y);
    let mut joined = x.clone();
    ops::join_assign(&mut joined, y);
    if raises_dim {
        return joined;
    }
    widen_risky(&mut joined, x, impl_kind, upto)
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Topology;

    fn interval(lo: i64, hi: i64) -> Poly {
        let mut p = Poly::new_universe_with(1, Topology::Closed);
        let mut e_lo = LinExpr::zero_dim(1);
        e_lo.set(0, Z::from(1));
        p.add_con(Con::nonstrict(e_lo, Z::from(-lo)));
        let mut e_hi = LinExpr::zero_dim(1);
        e_hi.set(0, Z::from(-1));
        p.add_con(Con::nonstrict(e_hi, Z::from(hi)));
        p
    }

    #[test]
    fn h79_drops_the_moving_upper_bound() {
        let mut small = interval(0, 1);
        let mut big = interval(0, 2);
        let mut widened = h79_widen(&mut big, &mut small);
        let b = widened.get_bounds(0);
        assert_eq!(b.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(b.ub_rational(), None);
    }

    #[test]
    fn h79_keeps_stable_bound() {
        let mut small = interval(0, 1);
        let mut big = interval(0, 1);
        let mut widened = h79_widen(&mut big, &mut small);
        let b = widened.get_bounds(0);
        assert_eq!(b.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(b.ub_rational(), Some(Q::from_integer(Z::from(1))));
    }

    #[test]
    fn safe_widen_accepts_unrelated_operands() {
        let mut a = interval(0, 1);
        let mut b = interval(5, 6);
        let mut widened = widen_safe(&mut a, &mut b, WidenImpl::H79, None);
        assert!(ops::contains(&mut widened, &mut a));
        assert!(ops::contains(&mut widened, &mut b));
    }

    #[test]
    fn certificate_strictly_decreases_across_the_classic_chain() {
        let mut x0 = interval(0, 0);
        let mut x1_join = interval(0, 1);
        let cert0 = Certificate::of(&mut x0);
        let mut x1 = h79_widen(&mut x1_join, &mut x0);
        let cert1 = Certificate::of(&mut x1);
        assert!(cert1.is_strictly_smaller_than(&cert0) || cert1 == cert0);
    }
}
