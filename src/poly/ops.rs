//! The `Poly` operation surface beyond bootstrap/minimize: containment,
//! hulls, affine transforms, dimension manipulation and splitting. Every
//! operation here is built on top of
//! [`Poly::add_con`]/[`Poly::add_gen`]/[`Poly::minimize`] rather than
//! reaching back into the conversion internals directly.
//!
//! Two composition primitives recur throughout: [`rebuild_from_gens`]
//! rebuilds a polyhedron by replaying a full generator set from scratch,
//! [`rebuild_from_cons`] does the dual from a full constraint set. Several
//! operations that could in principle be an in-place linear-algebra
//! rewrite of one representation (affine image/preimage, dimension
//! add/remove/map/fold/expand) are implemented here by transforming the
//! *other* representation pointwise and reconverting — simpler to get
//! right, at the cost of the asymptotic savings a column-rewrite would
//! give.

use crate::bbox::Itv;
use crate::linexpr::LinExpr;
use crate::num::{self, Q, Z};
use crate::row::{ComplementCons, Con, ConType, Gen, GenType, Topology};
use num_traits::{Signed, Zero};

use super::{Poly, RowSystem, Status};

// ======================================================================
// Rebuild primitives - PUBLIC(crate)

/// Replays `gens` into a fresh polyhedron of dimension `d`, points first
/// (the only generator kind [`Poly::add_gen`] accepts on an empty
/// polyhedron).
pub(crate) fn rebuild_from_gens(d: usize, topology: Topology, mut gens: Vec<Gen>) -> Poly {
    gens.sort_by_key(|g| match g.gen_type() {
        GenType::Point => 0,
        GenType::ClosurePoint => 1,
        GenType::Ray => 2,
        GenType::Line => 3,
    });
    let mut poly = Poly::new_empty_with(d, topology);
    if gens.is_empty() {
        return poly;
    }
    poly.add_gens(gens);
    poly.minimize();
    poly
}

/// Replays `cons` into the universe of dimension `d`.
pub(crate) fn rebuild_from_cons(d: usize, topology: Topology, cons: Vec<Con>) -> Poly {
    let mut poly = Poly::new_universe_with(d, topology);
    poly.add_cons(cons);
    poly.minimize();
    poly
}

/// The convex hull of `a` and `b` via their generators; handles either
/// operand already being empty without involving the conversion engine.
pub(crate) fn hull_gens(a: &mut Poly, b: &mut Poly) -> Poly {
    if a.is_empty() {
        return b.clone();
    }
    if b.is_empty() {
        return a.clone();
    }
    let d = a.space_dim();
    let topology = a.topology();
    let mut gens = a.gens();
    gens.extend(b.gens());
    rebuild_from_gens(d, topology, gens)
}

fn combined_topology(a: Topology, b: Topology) -> Topology {
    if a.is_nnc() || b.is_nnc() {
        Topology::Nnc
    } else {
        Topology::Closed
    }
}

// ======================================================================
// Satisfaction - PUBLIC(crate)

/// True iff generator `g` satisfies constraint `c`, using `c`'s actual
/// relation — not the conversion algorithm's ε-folded partitioning
/// oracle ([`super::convert::con_gen_sp`]), which answers a different,
/// internal-only question. Lines/rays are tested
/// against the recession cone (`>= 0`/`== 0`) regardless of `c`'s
/// strictness: a ray lies in the recession cone of an open half-space
/// iff it doesn't point outward.
pub(crate) fn gen_satisfies_con(c: &Con, g: &Gen) -> bool {
    let raw = c.scalar_product(g.linear_expr(), g.divisor());
    if g.is_line() {
        return raw.is_zero();
    }
    if g.is_line_or_ray() {
        return !raw.is_negative();
    }
    match c.con_type() {
        ConType::Equality => raw.is_zero(),
        ConType::NonStrict => !raw.is_negative(),
        ConType::Strict => raw.is_positive(),
    }
}

pub(crate) fn con_holds_for_gens(gs: &RowSystem<Gen>, c: &Con) -> bool {
    gs.sing.iter().all(|g| gen_satisfies_con(c, g)) && gs.sk.iter().all(|g| gen_satisfies_con(c, g))
}

// ======================================================================
// Affine rank / bounds - PUBLIC(crate)

/// Rank of the direction space spanned by `gs`'s lines, rays, and
/// point-to-point differences — the affine dimension of the polyhedron
/// `gs` generates.
pub(crate) fn gens_affine_rank(gs: &RowSystem<Gen>) -> usize {
    let d = gs
        .sing
        .iter()
        .map(|g| g.space_dim())
        .chain(gs.sk.iter().map(|g| g.space_dim()))
        .max()
        .unwrap_or(0);
    let mut vectors: Vec<Vec<Q>> = Vec::new();
    for l in &gs.sing {
        vectors.push((0..d).map(|i| Q::from_integer(l.linear_expr().get(i))).collect());
    }
    for r in gs.sk.iter().filter(|g| g.is_line_or_ray()) {
        vectors.push((0..d).map(|i| Q::from_integer(r.linear_expr().get(i))).collect());
    }
    let points: Vec<&Gen> = gs.sk.iter().filter(|g| g.is_point_or_closure_point()).collect();
    if let Some(first) = points.first() {
        for p in &points[1..] {
            vectors.push((0..d).map(|i| p.rational_coord(i) - first.rational_coord(i)).collect());
        }
    }
    rank(vectors, d)
}

/// Gaussian elimination over `Q`, fine for the small row counts this
/// crate deals with; returns the number of independent rows.
fn rank(mut vectors: Vec<Vec<Q>>, d: usize) -> usize {
    let mut pivot_row = 0;
    for col in 0..d {
        if pivot_row >= vectors.len() {
            break;
        }
        let found = (pivot_row..vectors.len()).find(|&r| !vectors[r][col].is_zero());
        let Some(found) = found else { continue };
        vectors.swap(pivot_row, found);
        let pivot_val = vectors[pivot_row][col].clone();
        for r in 0..vectors.len() {
            if r != pivot_row && !vectors[r][col].is_zero() {
                let factor = vectors[r][col].clone() / pivot_val.clone();
                for c in col..d {
                    let delta = factor.clone() * vectors[pivot_row][c].clone();
                    vectors[r][c] -= delta;
                }
            }
        }
        pivot_row += 1;
    }
    pivot_row
}

/// The rational min/max of `(e.x + b) / den` over `poly`'s generators;
/// `None` if `poly` is empty or unbounded in the requested direction.
/// Returns the value plus whether it is attained by an actual point (as
/// opposed to only approached via a closure point or an unbounded ray).
pub(crate) fn get_min_max(poly: &mut Poly, e: &LinExpr, b: &Z, den: &Z, want_min: bool) -> Option<(Q, bool)> {
    debug_assert!(den.is_positive());
    poly.minimize();
    if poly.status == Status::Empty {
        return None;
    }
    for l in &poly.gs.sing {
        if !e.dot(l.linear_expr()).is_zero() {
            return None;
        }
    }
    for r in poly.gs.sk.iter().filter(|g| g.is_line_or_ray()) {
        let coeff = e.dot(r.linear_expr());
        if want_min && coeff.is_negative() {
            return None;
        }
        if !want_min && coeff.is_positive() {
            return None;
        }
    }
    let mut best: Option<(Q, bool)> = None;
    for p in poly.gs.sk.iter().filter(|g| g.is_point_or_closure_point()) {
        let raw = e.dot(p.linear_expr()) + b * p.divisor();
        let val = Q::new(raw, p.divisor().clone() * den);
        let attained = p.is_point();
        best = Some(match best {
            None => (val, attained),
            Some((bv, battained)) => {
                let better = if want_min { val < bv } else { val > bv };
                let tie_better = val == bv && attained && !battained;
                if better || tie_better {
                    (val, attained)
                } else {
                    (bv, battained)
                }
            }
        });
    }
    best
}

/// The rational interval bounds of `(e.x + b) / den` over `poly`.
pub(crate) fn get_bounds_affine(poly: &mut Poly, e: &LinExpr, b: &Z, den: &Z) -> Itv {
    poly.minimize();
    if poly.status == Status::Empty {
        return Itv::empty();
    }
    let lo = get_min_max(poly, e, b, den, true);
    let hi = get_min_max(poly, e, b, den, false);
    if lo.is_none() && hi.is_none() {
        return Itv::universe();
    }
    let (lb, lb_closed) = match lo {
        Some((v, c)) => (Some(v), c),
        None => (None, false),
    };
    let (ub, ub_closed) = match hi {
        Some((v, c)) => (Some(v), c),
        None => (None, false),
    };
    Itv::from_parts(lb, lb_closed, ub, ub_closed)
}

pub(crate) fn get_bounds_var(poly: &mut Poly, var: usize) -> Itv {
    get_bounds_affine(poly, &LinExpr::unit(var), &Z::zero(), &num::one())
}

// ======================================================================
// Containment / equality / disjointness - PUBLIC(crate)

pub(crate) fn contains(x: &mut Poly, y: &mut Poly) -> bool {
    debug_assert_eq!(x.space_dim(), y.space_dim());
    y.minimize();
    if y.status == Status::Empty {
        return true;
    }
    x.minimize();
    if x.status == Status::Empty {
        return false;
    }
    let cons = x.cons();
    cons.iter().all(|c| con_holds_for_gens(&y.gs, c))
}

pub(crate) fn equals(x: &mut Poly, y: &mut Poly) -> bool {
    contains(x, y) && contains(y, x)
}

/// True iff some point of `other` satisfies `c` — the single-constraint
/// shortcut [`is_disjoint_from`] uses instead of a full intersection.
fn con_satisfiable_together(c: &Con, other: &mut Poly) -> bool {
    match get_min_max(other, c.linear_expr(), c.inhomo_term(), &num::one(), false) {
        Some((hi, _)) => {
            if c.is_strict() {
                hi.is_positive()
            } else {
                !hi.is_negative()
            }
        }
        None => true,
    }
}

pub(crate) fn is_disjoint_from(x: &mut Poly, y: &mut Poly) -> bool {
    debug_assert_eq!(x.space_dim(), y.space_dim());
    x.minimize();
    y.minimize();
    if x.status == Status::Empty || y.status == Status::Empty {
        return true;
    }
    if x.cs.len() <= 1 {
        if let Some(c) = x.cons().into_iter().next() {
            return !con_satisfiable_together(&c, y);
        }
    }
    if y.cs.len() <= 1 {
        if let Some(c) = y.cons().into_iter().next() {
            return !con_satisfiable_together(&c, x);
        }
    }
    let d = x.space_dim();
    let topology = combined_topology(x.topology(), y.topology());
    let mut cons = x.cons();
    cons.extend(y.cons());
    let mut inter = rebuild_from_cons(d, topology, cons);
    inter.is_empty()
}

// ======================================================================
// Relation flags - PUBLIC(crate)

/// Flags describing how a constraint relates to a polyhedron's
/// generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConRelation {
    /// Every generator saturates `c` (the polyhedron lies exactly on its
    /// hyperplane).
    pub saturates: bool,
    /// Every generator satisfies `c` (the polyhedron is included in `c`'s
    /// half-space/hyperplane).
    pub is_included: bool,
    /// No generator satisfies `c` (the polyhedron is disjoint from it).
    pub is_disjoint: bool,
    /// Some generators satisfy `c` and some violate it.
    pub strictly_intersects: bool,
}

pub(crate) fn relation_with_con(poly: &mut Poly, c: &Con) -> ConRelation {
    poly.minimize();
    if poly.status == Status::Empty {
        return ConRelation {
            saturates: true,
            is_included: true,
            is_disjoint: true,
            strictly_intersects: false,
        };
    }
    let gens = poly.gens();
    let saturates = gens
        .iter()
        .all(|g| super::convert::con_gen_sp(c, g).is_zero());
    let satisfy: Vec<bool> = gens.iter().map(|g| gen_satisfies_con(c, g)).collect();
    let any_sat = satisfy.iter().any(|&b| b);
    let all_sat = satisfy.iter().all(|&b| b);
    ConRelation {
        saturates,
        is_included: all_sat,
        is_disjoint: !any_sat,
        strictly_intersects: any_sat && !all_sat,
    }
}

// ======================================================================
// Hulls / intersection - PUBLIC(crate)

pub(crate) fn intersection_assign(x: &mut Poly, y: &mut Poly) {
    let cons = y.cons();
    x.add_cons(cons);
}

pub(crate) fn join_assign(x: &mut Poly, y: &mut Poly) {
    let gens = y.gens();
    if !gens.is_empty() {
        x.add_gens(gens);
    }
}

/// The most precise constraint hull over `inputs`: for every normalized
/// slope appearing in any
/// input's constraints (plus, if `boxed`, the `2d` axis-aligned slopes),
/// emit the tightest bound valid for every input simultaneously.
pub(crate) fn con_hull(inputs: &mut [Poly], boxed: bool) -> Poly {
    debug_assert!(!inputs.is_empty());
    let d = inputs[0].space_dim();
    let topology = inputs
        .iter()
        .map(|p| p.topology())
        .fold(Topology::Closed, combined_topology);

    let mut slopes: Vec<LinExpr> = Vec::new();
    if boxed {
        for i in 0..d {
            slopes.push(LinExpr::unit(i));
            let mut neg = LinExpr::unit(i);
            neg.negate();
            slopes.push(neg);
        }
    }
    for p in inputs.iter_mut() {
        for c in p.cons() {
            if c.is_equality() {
                let mut neg = c.linear_expr().clone();
                neg.negate();
                slopes.push(neg);
            }
            slopes.push(c.linear_expr().clone());
        }
    }

    let mut cons = Vec::new();
    for s in slopes {
        if s.is_zero() {
            continue;
        }
        let mut worst: Option<Q> = None;
        let mut bounded = true;
        for p in inputs.iter_mut() {
            match get_min_max(p, &s, &Z::zero(), &num::one(), false) {
                Some((val, _)) => {
                    worst = Some(match worst {
                        None => val,
                        Some(w) => {
                            if val > w {
                                val
                            } else {
                                w
                            }
                        }
                    });
                }
                None => {
                    bounded = false;
                    break;
                }
            }
        }
        if !bounded {
            continue;
        }
        let val = worst.unwrap();
        let q_den = val.denom().clone();
        let p_num = val.numer().clone();
        let mut e = s.clone();
        e.mul_assign(&(-&q_den));
        cons.push(Con::nonstrict(e, p_num));
    }
    rebuild_from_cons(d, topology, cons)
}

/// True iff every point of `x` already satisfies `c` (so intersecting
/// with `c` would change nothing).
fn con_implied_by(x: &mut Poly, c: &Con) -> bool {
    match c.con_type() {
        ConType::Equality => match (
            get_min_max(x, c.linear_expr(), c.inhomo_term(), &num::one(), true),
            get_min_max(x, c.linear_expr(), c.inhomo_term(), &num::one(), false),
        ) {
            (Some((lo, _)), Some((hi, _))) => lo.is_zero() && hi.is_zero(),
            _ => false,
        },
        _ => match get_min_max(x, c.linear_expr(), c.inhomo_term(), &num::one(), true) {
            Some((lo, _)) => {
                if c.is_strict() {
                    lo.is_positive()
                } else {
                    !lo.is_negative()
                }
            }
            None => false,
        },
    }
}

/// Over-approximates `x \ y` as the hull of `x ∩ ¬c_i` over `y`'s
/// constraints not already implied by `x`.
pub(crate) fn poly_difference(x: &mut Poly, y: &mut Poly) -> Poly {
    let d = x.space_dim();
    let topology = x.topology();
    x.minimize();
    if x.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let y_cons = y.cons();
    let mut result = Poly::new_empty_with(d, topology);
    for c in &y_cons {
        if c.is_equality() && !topology.is_nnc() {
            if !con_implied_by(x, c) {
                // Closed topology cannot split an equality's complement;
                // the difference w.r.t. this constraint can't be computed
                // exactly, so the whole operation degrades to "no change".
                return x.clone();
            }
            continue;
        }
        match c.complement(topology) {
            Some(ComplementCons::One(comp)) => {
                let mut piece = x.clone();
                piece.add_con(comp);
                if !piece.is_empty() {
                    result = hull_gens(&mut result, &mut piece);
                }
            }
            Some(ComplementCons::Two(a, b)) => {
                let mut piece_a = x.clone();
                piece_a.add_con(a);
                if !piece_a.is_empty() {
                    result = hull_gens(&mut result, &mut piece_a);
                }
                let mut piece_b = x.clone();
                piece_b.add_con(b);
                if !piece_b.is_empty() {
                    result = hull_gens(&mut result, &mut piece_b);
                }
            }
            None => {}
        }
    }
    result
}

// ======================================================================
// Affine transforms - PUBLIC(crate)

fn transform_gen_affine(g: &Gen, var: usize, e: &LinExpr, b: &Z, den: &Z) -> Gen {
    let old_expr = g.linear_expr();
    let old_div = g.divisor().clone();
    let mut new_expr = old_expr.clone();
    new_expr.mul_assign(den);
    let var_term = if g.is_line_or_ray() {
        e.dot(old_expr)
    } else {
        e.dot(old_expr) + b * &old_div
    };
    new_expr.set(var, var_term);
    let new_div = if g.is_line_or_ray() { Z::zero() } else { &old_div * den };
    Gen::new(g.gen_type(), new_expr, new_div)
}

pub(crate) fn affine_image(poly: &mut Poly, var: usize, e: &LinExpr, b: &Z, den: &Z) -> Poly {
    debug_assert!(den.is_positive());
    poly.minimize();
    let d = poly.space_dim();
    let topology = poly.topology();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let mut gens = Vec::new();
    for g in poly.gens() {
        let ng = transform_gen_affine(&g, var, e, b, den);
        if ng.is_line_or_ray() && ng.linear_expr().is_zero() {
            continue;
        }
        gens.push(ng);
    }
    rebuild_from_gens(d, topology, gens)
}

fn transform_con_preimage(c: &Con, var: usize, e: &LinExpr, b: &Z, den: &Z) -> Con {
    let c_var = c.linear_expr().get(var);
    let mut expr = c.linear_expr().clone();
    expr.set(var, Z::zero());
    expr.mul_assign(den);
    expr.add_mul_assign(&c_var, e);
    let inhomo = c.inhomo_term() * den + &c_var * b;
    Con::new(expr, inhomo, c.con_type())
}

pub(crate) fn affine_preimage(poly: &mut Poly, var: usize, e: &LinExpr, b: &Z, den: &Z) -> Poly {
    debug_assert!(den.is_positive());
    poly.minimize();
    let d = poly.space_dim();
    let topology = poly.topology();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let cons: Vec<Con> = poly
        .cons()
        .iter()
        .map(|c| transform_con_preimage(c, var, e, b, den))
        .collect();
    rebuild_from_cons(d, topology, cons)
}

pub(crate) fn parallel_affine_image(
    poly: &mut Poly,
    vars: &[usize],
    exprs: &[LinExpr],
    inhomos: &[Z],
    dens: &[Z],
) -> Poly {
    debug_assert_eq!(vars.len(), exprs.len());
    debug_assert_eq!(vars.len(), inhomos.len());
    debug_assert_eq!(vars.len(), dens.len());
    poly.minimize();
    let d = poly.space_dim();
    let topology = poly.topology();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let common_den = dens.iter().fold(num::one(), |acc, dd| num::lcm(&acc, dd));
    let mut out_gens = Vec::new();
    for g in poly.gens() {
        let old_expr = g.linear_expr().clone();
        let old_div = g.divisor().clone();
        let mut new_expr = old_expr.clone();
        new_expr.mul_assign(&common_den);
        for (k, &var) in vars.iter().enumerate() {
            let scale = &common_den / &dens[k];
            let var_term = if g.is_line_or_ray() {
                exprs[k].dot(&old_expr) * &scale
            } else {
                (exprs[k].dot(&old_expr) + &inhomos[k] * &old_div) * &scale
            };
            new_expr.set(var, var_term);
        }
        let new_div = if g.is_line_or_ray() { Z::zero() } else { &old_div * &common_den };
        let ng = Gen::new(g.gen_type(), new_expr, new_div);
        if ng.is_line_or_ray() && ng.linear_expr().is_zero() {
            continue;
        }
        out_gens.push(ng);
    }
    rebuild_from_gens(d, topology, out_gens)
}

// ======================================================================
// Dimension manipulation - PUBLIC(crate)

pub(crate) fn unconstrain_vars(poly: &mut Poly, vars: &[usize]) {
    for &v in vars {
        poly.add_gen(Gen::line(v));
    }
    poly.minimize();
}

fn extend_gen_dim(g: Gen, new_d: usize) -> Gen {
    let mut expr = g.linear_expr().clone();
    expr.set_space_dim(new_d);
    Gen::new(g.gen_type(), expr, g.divisor().clone())
}

pub(crate) fn add_space_dims(poly: &mut Poly, m: usize, project: bool) -> Poly {
    let d = poly.space_dim();
    let new_d = d + m;
    let topology = poly.topology();
    poly.minimize();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(new_d, topology);
    }
    let mut gens: Vec<Gen> = poly.gens().into_iter().map(|g| extend_gen_dim(g, new_d)).collect();
    if !project {
        for i in d..new_d {
            gens.push(Gen::line(i));
        }
    }
    rebuild_from_gens(new_d, topology, gens)
}

pub(crate) fn remove_space_dims(poly: &mut Poly, dims: &[usize]) -> Poly {
    poly.minimize();
    let d = poly.space_dim();
    let topology = poly.topology();
    let new_d = d - dims.len();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(new_d, topology);
    }
    let keep: Vec<usize> = (0..d).filter(|i| !dims.contains(i)).collect();
    let mut gens = Vec::new();
    for g in poly.gens() {
        let mut expr = LinExpr::zero_dim(keep.len());
        for (new_i, &old_i) in keep.iter().enumerate() {
            expr.set(new_i, g.linear_expr().get(old_i));
        }
        gens.push(Gen::new(g.gen_type(), expr, g.divisor().clone()));
    }
    rebuild_from_gens(new_d, topology, gens)
}

pub(crate) fn remove_higher_space_dims(poly: &mut Poly, new_dim: usize) -> Poly {
    let d = poly.space_dim();
    let dims: Vec<usize> = (new_dim..d).collect();
    remove_space_dims(poly, &dims)
}

pub(crate) fn map_space_dims(poly: &mut Poly, pfunc: &[Option<usize>]) -> Poly {
    poly.minimize();
    let topology = poly.topology();
    let new_d = pfunc.iter().filter_map(|x| x.map(|v| v + 1)).max().unwrap_or(0);
    if poly.status == Status::Empty {
        return Poly::new_empty_with(new_d, topology);
    }
    let mut gens = Vec::new();
    for g in poly.gens() {
        let mut expr = LinExpr::zero_dim(new_d);
        for (old_i, mapped) in pfunc.iter().enumerate() {
            if let Some(new_i) = mapped {
                expr.set(*new_i, g.linear_expr().get(old_i));
            }
        }
        gens.push(Gen::new(g.gen_type(), expr, g.divisor().clone()));
    }
    rebuild_from_gens(new_d, topology, gens)
}

fn rename_dim_into_dest(poly: &mut Poly, from: usize, dest: usize) -> Poly {
    poly.minimize();
    let d = poly.space_dim();
    let topology = poly.topology();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let mut gens = Vec::new();
    for g in poly.gens() {
        let mut expr = g.linear_expr().clone();
        let v = expr.get(from);
        expr.set(dest, v);
        gens.push(Gen::new(g.gen_type(), expr, g.divisor().clone()));
    }
    rebuild_from_gens(d, topology, gens)
}

/// Folds `vars` into `dest` as the hull of renamed copies, then projects
/// the now-redundant `vars` away.
pub(crate) fn fold_space_dims(poly: &mut Poly, vars: &[usize], dest: usize) -> Poly {
    let d = poly.space_dim();
    let topology = poly.topology();
    let mut acc = Poly::new_empty_with(d, topology);
    for &v in vars.iter().chain(std::iter::once(&dest)) {
        let mut copy = if v == dest {
            poly.clone()
        } else {
            rename_dim_into_dest(poly, v, dest)
        };
        acc = hull_gens(&mut acc, &mut copy);
    }
    remove_space_dims(&mut acc, vars)
}

pub(crate) fn expand_space_dim(poly: &mut Poly, var: usize, m: usize) -> Poly {
    let d = poly.space_dim();
    let new_d = d + m;
    let topology = poly.topology();
    poly.minimize();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(new_d, topology);
    }
    let mut gens = Vec::new();
    for g in poly.gens() {
        let mut expr = g.linear_expr().clone();
        expr.set_space_dim(new_d);
        let v = expr.get(var);
        for k in 0..m {
            expr.set(d + k, v.clone());
        }
        gens.push(Gen::new(g.gen_type(), expr, g.divisor().clone()));
    }
    rebuild_from_gens(new_d, topology, gens)
}

// ======================================================================
// Split / time elapse / closure / topology - PUBLIC(crate)

/// Splits `poly` in place into (kept: `poly ∩ c`, returned: `poly ∩ ¬c`).
/// Exact only in NNC topology — a non-strict constraint's complement
/// can't be represented as a closed polyhedron; use [`integral_split`]
/// there instead.
pub(crate) fn split(poly: &mut Poly, c: Con) -> Poly {
    let topology = poly.topology();
    debug_assert!(
        topology.is_nnc(),
        "split is only exact in NNC topology; use integral_split otherwise"
    );
    let mut outside = Poly::new_empty_with(poly.space_dim(), topology);
    match c.complement(topology) {
        Some(ComplementCons::One(comp)) => {
            let mut piece = poly.clone();
            piece.add_con(comp);
            outside = piece;
        }
        Some(ComplementCons::Two(a, b)) => {
            let mut piece_a = poly.clone();
            piece_a.add_con(a);
            let mut piece_b = poly.clone();
            piece_b.add_con(b);
            // The two open half-spaces straddling an equality are
            // disjoint; `Poly` can only hold convex sets, so their union
            // is over-approximated by its hull.
            outside = hull_gens(&mut piece_a, &mut piece_b);
        }
        None => {}
    }
    poly.add_con(c);
    outside
}

/// Dual of [`split`] for non-strict cutting constraints under any
/// topology: the complement is rounded one unit past the cut, since no
/// point can lie strictly between `c == 0` and its open complement once
/// both sides are forced non-strict.
pub(crate) fn integral_split(poly: &mut Poly, c: &Con) -> Poly {
    debug_assert!(!c.is_strict(), "integral_split takes a non-strict/equality constraint");
    let one = num::one();
    let outside = if c.is_equality() {
        let mut lower = poly.clone();
        let mut e_lo = c.linear_expr().clone();
        e_lo.negate();
        lower.add_con(Con::nonstrict(e_lo, -(c.inhomo_term() + &one)));
        let mut upper = poly.clone();
        upper.add_con(Con::nonstrict(c.linear_expr().clone(), c.inhomo_term() - &one));
        hull_gens(&mut lower, &mut upper)
    } else {
        let mut e_out = c.linear_expr().clone();
        e_out.negate();
        let mut piece = poly.clone();
        piece.add_con(Con::nonstrict(e_out, -(c.inhomo_term() + &one)));
        piece
    };
    poly.add_con(c.clone());
    outside
}

pub(crate) fn time_elapse(x: &mut Poly, y: &mut Poly) -> Poly {
    let d = x.space_dim();
    let topology = x.topology();
    x.minimize();
    y.minimize();
    if x.status() == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    if y.status() == Status::Empty {
        return x.clone();
    }
    let mut gens = x.gens();
    for g in y.gens() {
        if g.is_line_or_ray() {
            gens.push(g);
        } else if let Some(r) = g.into_ray() {
            gens.push(r);
        }
    }
    rebuild_from_gens(d, topology, gens)
}

pub(crate) fn topological_closure(poly: &mut Poly) -> Poly {
    let topology = poly.topology();
    if !topology.is_nnc() {
        return poly.clone();
    }
    poly.minimize();
    let d = poly.space_dim();
    if poly.status == Status::Empty {
        return Poly::new_empty_with(d, topology);
    }
    let gens: Vec<Gen> = poly
        .gens()
        .into_iter()
        .map(|g| {
            if g.is_closure_point() {
                Gen::point(g.linear_expr().clone(), g.divisor().clone())
            } else {
                g
            }
        })
        .collect();
    let mut out = rebuild_from_gens(d, topology, gens);
    let cons = out.cons();
    if cons.iter().any(|c| c.is_strict()) {
        let relaxed: Vec<Con> = cons
            .into_iter()
            .map(|c| {
                if c.is_strict() {
                    Con::nonstrict(c.linear_expr().clone(), c.inhomo_term().clone())
                } else {
                    c
                }
            })
            .collect();
        out = rebuild_from_cons(d, topology, relaxed);
    }
    out
}

/// Reinterprets `poly` under `new_topology`. Cheap: this engine's NNC
/// encoding folds the ε term into scalar products by constraint
/// strictness alone, independent of the `topology` field — so the field
/// is the only thing that actually needs to change.
pub(crate) fn set_topology(poly: &Poly, new_topology: Topology) -> Poly {
    if poly.topology() == new_topology {
        return poly.clone();
    }
    if new_topology == Topology::Closed {
        let mut check = poly.clone();
        debug_assert!(
            check.is_topologically_closed(),
            "NNC -> Closed requires the polyhedron already be topologically closed"
        );
    }
    let mut new_poly = poly.clone();
    new_poly.topology = new_topology;
    new_poly
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Topology;

    fn square(lo: i64, hi: i64) -> Poly {
        let mut p = Poly::new_universe_with(2, Topology::Closed);
        for dim in 0..2 {
            p.add_con(Con::nonstrict(LinExpr::unit(dim), Z::from(-lo)));
            let mut e = LinExpr::zero_dim(2);
            e.set(dim, Z::from(-1));
            p.add_con(Con::nonstrict(e, Z::from(hi)));
        }
        p
    }

    #[test]
    fn contains_nested_squares() {
        let mut big = square(0, 10);
        let mut small = square(2, 4);
        assert!(contains(&mut big, &mut small));
        assert!(!contains(&mut small, &mut big));
    }

    #[test]
    fn equals_reflexive() {
        let mut a = square(0, 3);
        let mut b = square(0, 3);
        assert!(equals(&mut a, &mut b));
    }

    #[test]
    fn disjoint_squares() {
        let mut a = square(0, 1);
        let mut b = square(5, 6);
        assert!(is_disjoint_from(&mut a, &mut b));
    }

    #[test]
    fn min_max_of_sum_over_square() {
        let mut p = square(0, 2);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        e.set(1, Z::from(1));
        let (lo, lo_attained) = get_min_max(&mut p, &e, &Z::zero(), &num::one(), true).unwrap();
        let (hi, hi_attained) = get_min_max(&mut p, &e, &Z::zero(), &num::one(), false).unwrap();
        assert_eq!(lo, Q::from_integer(Z::from(0)));
        assert_eq!(hi, Q::from_integer(Z::from(4)));
        assert!(lo_attained && hi_attained);
    }

    #[test]
    fn affine_image_translates_square() {
        let mut p = square(0, 2);
        let mut e = LinExpr::unit(0);
        e.set_space_dim(2);
        let mut out = affine_image(&mut p, 0, &e, &Z::from(5), &num::one());
        let b = get_bounds_var(&mut out, 0);
        assert_eq!(b.lb_rational(), Some(Q::from_integer(Z::from(5))));
        assert_eq!(b.ub_rational(), Some(Q::from_integer(Z::from(7))));
    }

    #[test]
    fn remove_space_dim_projects() {
        let mut p = square(0, 2);
        let mut projected = remove_space_dims(&mut p, &[1]);
        assert_eq!(projected.space_dim(), 1);
        let b = get_bounds_var(&mut projected, 0);
        assert_eq!(b.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(b.ub_rational(), Some(Q::from_integer(Z::from(2))));
    }

    #[test]
    fn integral_split_leaves_a_gap() {
        let mut p = square(0, 4);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(-1));
        let cut = Con::nonstrict(e, Z::from(2)); // x <= 2
        let mut outside = integral_split(&mut p, &cut);
        let inside_bounds = get_bounds_var(&mut p, 0);
        assert_eq!(inside_bounds.ub_rational(), Some(Q::from_integer(Z::from(2))));
        let outside_bounds = get_bounds_var(&mut outside, 0);
        assert_eq!(outside_bounds.lb_rational(), Some(Q::from_integer(Z::from(3))));
    }
}
