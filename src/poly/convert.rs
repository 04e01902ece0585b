//! The Chernikova-style conversion algorithm: the machinery that keeps
//! [`super::Poly`]'s constraint and generator systems in a consistent
//! double-description pair as rows are added one at a time.
//!
//! Only skeletal rows participate in the saturation matrix; singular rows
//! (equalities/lines) always saturate every row of the dual system, so they
//! never need a sat entry. NNC strict inequalities and points/closure-points
//! are folded into the ordinary scalar-product computation via an
//! augmented ε term rather than a separate non-skeletal row compression
//! pass.
//!
//! Adjacency between two candidate rows is tested on their *saturating*
//! sets (the complement of the stored "does not saturate" sat bit): the
//! combination of `g-` and `g+` survives iff no third skeletal row
//! saturates a strict superset of what `g-` and `g+` saturate in common.
//! This is the standard combinatorial face test (Fukuda & Prodon); a sat
//! bit means "does not saturate", so the actual saturating set a candidate
//! row's adjacency test needs is the *complement* of what's stored.

use crate::num::{self, Z};
use crate::row::{Con, ConType, Gen, GenType, Topology};
use crate::satmatrix::SatMatrix;
use crate::bits::BitSet;
use crate::linexpr::LinExpr;
use num_traits::{Signed, Zero};
use std::collections::HashSet;

use super::{Poly, RowSystem};

// ======================================================================
// Bootstrap - PUBLIC(crate)

/// The universe of dimension `d`: one line per dimension, plus the origin
/// as the sole skeletal generator, and no constraints at all.
pub(crate) fn bootstrap_universe(
    d: usize,
    _topology: Topology,
) -> (RowSystem<Con>, RowSystem<Gen>, SatMatrix) {
    let mut gs = RowSystem::new();
    for i in 0..d {
        gs.sing.push(Gen::line(i));
    }
    gs.sk.push(Gen::origin(d));
    (RowSystem::new(), gs, SatMatrix::with_rows(1))
}

// ======================================================================
// Scalar product - PUBLIC(crate)

/// The augmented scalar product `e(c).e(g) + b(c)*div(g) - epsflag(c)*epsnum(g)`.
/// `epsflag(c)` is `1` iff `c` is strict; `epsnum(g)` is `g`'s divisor when
/// `g` is a point, `0` otherwise. Subtracting the epsilon term is what makes
/// a non-strict (ε=1) point fail a strict constraint it merely touches: a
/// point on the boundary of `e·x + b > 0` gives `base == 0`, and `0 - 1*div
/// < 0`, correctly placing it outside. The sign of the result is what drives
/// every partitioning step below.
pub(crate) fn con_gen_sp(c: &Con, g: &Gen) -> Z {
    let base = c.scalar_product(g.linear_expr(), g.divisor());
    if c.is_strict() {
        base - g.epsilon_coeff() * g.divisor()
    } else {
        base
    }
}

// ======================================================================
// Driving loop - PUBLIC(crate)

/// Incorporates every pending row, in order. Returns `true` iff the
/// polyhedron turned out to be empty (callers must then reset to
/// [`super::Status::Empty`]; this function does not mutate `poly.status`).
pub(crate) fn run_minimize(poly: &mut Poly) -> bool {
    let cs_pending = std::mem::take(&mut poly.cs_pending);
    for c in cs_pending {
        if incorporate_con(poly, c) {
            return true;
        }
    }
    let gs_pending = std::mem::take(&mut poly.gs_pending);
    for g in gs_pending {
        if poly.gs.sing.is_empty()
            && poly.gs.sk.is_empty()
            && poly.cs.sing.is_empty()
            && poly.cs.sk.is_empty()
        {
            bootstrap_from_point(poly, g);
        } else {
            incorporate_gen(poly, g);
        }
    }
    false
}

/// Starting a polyhedron from its first generator (necessarily a point):
/// pins every dimension with an equality, exactly as if that point had
/// been reached by rotating the universe's lines out one at a time.
fn bootstrap_from_point(poly: &mut Poly, g: Gen) {
    debug_assert!(
        g.is_point(),
        "the first generator added to an empty polyhedron must be a point"
    );
    for i in 0..poly.d {
        let mut e = LinExpr::zero_dim(poly.d);
        e.set(i, g.divisor().clone());
        let inhomo = -g.linear_expr().get(i);
        poly.cs.sing.push(Con::equality(e, inhomo));
    }
    poly.gs.sk.push(g);
    rebuild_sat(poly);
}

/// Recomputes `poly.sat` from scratch by direct evaluation. Exact (no
/// approximation from incremental bit-propagation), at the cost of doing
/// `O(|gs.sk| * |cs.sk|)` scalar products per call; acceptable since this
/// crate targets correctness over asymptotic performance.
fn rebuild_sat(poly: &mut Poly) {
    let ngens = poly.gs.sk.len();
    let ncons = poly.cs.sk.len();
    let mut sat = SatMatrix::with_rows(ngens);
    for (gi, g) in poly.gs.sk.iter().enumerate() {
        for (ci, c) in poly.cs.sk.iter().enumerate() {
            if !con_gen_sp(c, g).is_zero() {
                sat.set(gi, ci, true);
            }
        }
    }
    sat.resize(ngens, ncons);
    poly.sat = sat;
}

// ======================================================================
// Adding a constraint (grows cs, reorganizes gs)

/// Incorporates `c` into `(poly.cs, poly.gs)`. Returns `true` iff `c`
/// leaves no satisfying generator at all (the polyhedron becomes empty).
fn incorporate_con(poly: &mut Poly, c: Con) -> bool {
    if c.is_inconsistent() {
        return true;
    }
    if c.is_tautological() {
        return false;
    }

    let lines_rotated = rotate_lines_for_con(&mut poly.gs, &c);
    rebuild_sat(poly);
    let sat_before = poly.sat.clone();

    let sps: Vec<Z> = poly.gs.sk.iter().map(|g| con_gen_sp(&c, g)).collect();
    let minus: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_negative()).collect();
    let plus: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_positive()).collect();

    if minus.is_empty() && !lines_rotated {
        return false; // c is redundant w.r.t. the current generators.
    }
    if minus.len() == poly.gs.sk.len() {
        return true; // every skeletal generator violates c.
    }

    let minus_set: HashSet<usize> = minus.iter().copied().collect();
    let mut new_sk: Vec<Gen> = poly
        .gs
        .sk
        .iter()
        .enumerate()
        .filter(|(i, _)| !minus_set.contains(i))
        .map(|(_, g)| g.clone())
        .collect();
    for &mi in &minus {
        for &pi in &plus {
            if adjacent_gens(poly, &sat_before, mi, pi) {
                new_sk.push(combine_gens(&c, &poly.gs.sk[mi], &poly.gs.sk[pi]));
            }
        }
    }
    poly.gs.sk = new_sk;
    poly.cs.sk.push(c);
    rebuild_sat(poly);
    false
}

/// If some line has a non-zero scalar product with `c`, eliminates it from
/// every other line (so they stay lines, saturating `c`) and turns the
/// pivot line itself into a new skeletal ray oriented so as to satisfy
/// `c`. Returns whether any rotation happened.
fn rotate_lines_for_con(gs: &mut RowSystem<Gen>, c: &Con) -> bool {
    if gs.sing.is_empty() {
        return false;
    }
    let sps: Vec<Z> = gs.sing.iter().map(|l| con_gen_sp(c, l)).collect();
    let pivot = match sps.iter().position(|s| !s.is_zero()) {
        Some(p) => p,
        None => return false,
    };
    let sp_pivot = sps[pivot].clone();
    let pivot_expr = gs.sing[pivot].linear_expr().clone();
    for i in 0..gs.sing.len() {
        if i == pivot || sps[i].is_zero() {
            continue;
        }
        let mut new_expr = gs.sing[i].linear_expr().clone();
        new_expr.mul_assign(&sp_pivot);
        new_expr.add_mul_assign(&(-&sps[i]), &pivot_expr);
        gs.sing[i] = Gen::new(GenType::Line, new_expr, Z::zero());
    }
    let mut ray_expr = pivot_expr;
    if sp_pivot.is_negative() {
        ray_expr.negate();
    }
    gs.sing.remove(pivot);
    gs.sk.push(Gen::new(GenType::Ray, ray_expr, Z::zero()));
    true
}

/// Combines a violating generator with a satisfying one into a new
/// generator that exactly saturates `c`.
fn combine_gens(c: &Con, g_minus: &Gen, g_plus: &Gen) -> Gen {
    let sp_minus = con_gen_sp(c, g_minus);
    let sp_plus = con_gen_sp(c, g_plus);
    let a = sp_plus.abs();
    let b = sp_minus.abs();

    let mut expr = g_minus.linear_expr().clone();
    expr.mul_assign(&a);
    expr.add_mul_assign(&b, g_plus.linear_expr());
    let div = &a * g_minus.divisor() + &b * g_plus.divisor();

    if div.is_zero() {
        return Gen::new(GenType::Ray, expr, Z::zero());
    }
    // A combination that saturates `c` exactly (which this one always
    // does — it's the whole point of the construction) lies exactly on
    // `c`'s boundary; if that boundary is strict, the combined generator
    // must be a closure point regardless of its parents' own epsilon.
    if c.is_strict() {
        return Gen::new(GenType::ClosurePoint, expr, div);
    }
    let epsnum_minus = g_minus.epsilon_coeff() * g_minus.divisor();
    let epsnum_plus = g_plus.epsilon_coeff() * g_plus.divisor();
    let epsnum = &a * &epsnum_minus + &b * &epsnum_plus;
    if epsnum.is_zero() {
        Gen::new(GenType::ClosurePoint, expr, div)
    } else {
        Gen::new(GenType::Point, expr, div)
    }
}

/// True iff `gs.sk[i]` and `gs.sk[j]` combine into a non-redundant
/// generator, i.e. no *other* skeletal generator saturates a strict
/// superset of what `i` and `j` saturate in common (computed against
/// `sat_before`, the saturation matrix as it stood prior to adding the
/// constraint currently being incorporated).
fn adjacent_gens(poly: &Poly, sat_before: &SatMatrix, i: usize, j: usize) -> bool {
    let ncons = poly.cs.sk.len();
    let saturating = |row: &BitSet| -> BitSet {
        let mut z = BitSet::with_capacity(ncons);
        for c in 0..ncons {
            if !row.contains(c) {
                z.set(c, true);
            }
        }
        z
    };
    let zi = saturating(sat_before.row(i));
    let zj = saturating(sat_before.row(j));
    let mut inter = zi;
    inter.intersect_assign(&zj);
    for h in 0..poly.gs.sk.len() {
        if h == i || h == j {
            continue;
        }
        let zh = saturating(sat_before.row(h));
        if inter.is_strict_subset(&zh) {
            return false;
        }
    }
    true
}

// ======================================================================
// Adding a generator (grows gs, reorganizes cs)

/// Incorporates `g` into `(poly.cs, poly.gs)`. Unlike the dual, this can
/// never make the polyhedron empty — it only ever enlarges it.
fn incorporate_gen(poly: &mut Poly, g: Gen) {
    rotate_eqs_for_gen(&mut poly.cs, &g);
    rebuild_sat(poly);
    let sat_before = poly.sat.clone();
    let sat_t_before = sat_before.transpose();

    let sps: Vec<Z> = poly.cs.sk.iter().map(|c| con_gen_sp(c, &g)).collect();
    let minus: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_negative()).collect();
    let plus: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_positive()).collect();
    let minus_set: HashSet<usize> = minus.iter().copied().collect();

    let mut new_sk: Vec<Con> = poly
        .cs
        .sk
        .iter()
        .enumerate()
        .filter(|(i, _)| !minus_set.contains(i))
        .map(|(_, c)| c.clone())
        .collect();
    for &mi in &minus {
        for &pi in &plus {
            if adjacent_cons(poly, &sat_t_before, mi, pi) {
                new_sk.push(combine_cons(&g, &poly.cs.sk[mi], &poly.cs.sk[pi]));
            }
        }
    }
    poly.cs.sk = new_sk;
    poly.gs.sk.push(g);
    rebuild_sat(poly);
}

/// Dual of [`rotate_lines_for_con`]: rotates equalities so they stay
/// exactly saturated by the new generator `g`, turning the one equality
/// that doesn't into a new skeletal (non-strict) constraint.
fn rotate_eqs_for_gen(cs: &mut RowSystem<Con>, g: &Gen) -> bool {
    if cs.sing.is_empty() {
        return false;
    }
    let sps: Vec<Z> = cs.sing.iter().map(|e| con_gen_sp(e, g)).collect();
    let pivot = match sps.iter().position(|s| !s.is_zero()) {
        Some(p) => p,
        None => return false,
    };
    let sp_pivot = sps[pivot].clone();
    let pivot_expr = cs.sing[pivot].linear_expr().clone();
    let pivot_inhomo = cs.sing[pivot].inhomo_term().clone();
    for i in 0..cs.sing.len() {
        if i == pivot || sps[i].is_zero() {
            continue;
        }
        let mut new_expr = cs.sing[i].linear_expr().clone();
        new_expr.mul_assign(&sp_pivot);
        new_expr.add_mul_assign(&(-&sps[i]), &pivot_expr);
        let new_inhomo = cs.sing[i].inhomo_term() * &sp_pivot - &sps[i] * &pivot_inhomo;
        cs.sing[i] = Con::new(new_expr, new_inhomo, ConType::Equality);
    }
    let mut ray_expr = pivot_expr;
    let mut ray_inhomo = pivot_inhomo;
    if sp_pivot.is_negative() {
        ray_expr.negate();
        ray_inhomo = -ray_inhomo;
    }
    cs.sing.remove(pivot);
    cs.sk.push(Con::new(ray_expr, ray_inhomo, ConType::NonStrict));
    true
}

/// Dual of [`combine_gens`].
fn combine_cons(g: &Gen, c_minus: &Con, c_plus: &Con) -> Con {
    let sp_minus = con_gen_sp(c_minus, g);
    let sp_plus = con_gen_sp(c_plus, g);
    let a = sp_plus.abs();
    let b = sp_minus.abs();

    let mut expr = c_minus.linear_expr().clone();
    expr.mul_assign(&a);
    expr.add_mul_assign(&b, c_plus.linear_expr());
    let inhomo = &a * c_minus.inhomo_term() + &b * c_plus.inhomo_term();

    let flag_minus = if c_minus.is_strict() { num::one() } else { Z::zero() };
    let flag_plus = if c_plus.is_strict() { num::one() } else { Z::zero() };
    let flag = &a * &flag_minus + &b * &flag_plus;
    let typ = if flag.is_zero() {
        ConType::NonStrict
    } else {
        ConType::Strict
    };
    Con::new(expr, inhomo, typ)
}

/// Dual of [`adjacent_gens`], over the transposed (cons-as-rows)
/// saturation matrix.
fn adjacent_cons(poly: &Poly, sat_t_before: &SatMatrix, i: usize, j: usize) -> bool {
    let ngens = poly.gs.sk.len();
    let saturating = |row: &BitSet| -> BitSet {
        let mut z = BitSet::with_capacity(ngens);
        for g in 0..ngens {
            if !row.contains(g) {
                z.set(g, true);
            }
        }
        z
    };
    let zi = saturating(sat_t_before.row(i));
    let zj = saturating(sat_t_before.row(j));
    let mut inter = zi;
    inter.intersect_assign(&zj);
    for h in 0..poly.cs.sk.len() {
        if h == i || h == j {
            continue;
        }
        let zh = saturating(sat_t_before.row(h));
        if inter.is_strict_subset(&zh) {
            return false;
        }
    }
    true
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Topology;

    #[test]
    fn universe_bootstrap_has_lines_and_origin() {
        let (cs, gs, sat) = bootstrap_universe(3, Topology::Closed);
        assert!(cs.is_empty());
        assert_eq!(gs.sing.len(), 3);
        assert_eq!(gs.sk.len(), 1);
        assert_eq!(sat.num_rows(), 1);
    }

    #[test]
    fn single_half_space_rotates_one_line_into_a_ray() {
        let mut poly = Poly::new_universe_with(1, Topology::Closed);
        let c = Con::nonstrict(LinExpr::unit(0), Z::from(0)); // x >= 0
        poly.add_con(c);
        assert!(!poly.is_empty());
        assert_eq!(poly.gs.sing.len(), 0);
        assert_eq!(poly.gs.sk.len(), 2); // origin + ray(+x)
    }

    #[test]
    fn inconsistent_constraint_empties_the_universe() {
        let mut poly = Poly::new_universe_with(1, Topology::Closed);
        poly.add_con(Con::nonstrict(LinExpr::zero(), Z::from(-1))); // 0 >= 1
        assert!(poly.is_empty());
    }
}
