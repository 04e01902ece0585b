//! Worked end-to-end scenarios exercising the core polyhedron operations:
//! intersection, strict-vs-non-strict containment, projection, convex
//! hull, widening stabilization, and Cartesian factorization.

use convex_polyhedra::num::{Q, Z};
use convex_polyhedra::row::{Con, Gen, Topology};
use convex_polyhedra::{linexpr::LinExpr, poly::Poly};

fn half_space_ge(d: usize, var: usize, bound: i64) -> Con {
    // x_var >= bound, i.e. x_var - bound >= 0
    let mut e = LinExpr::zero_dim(d);
    e.set(var, Z::from(1));
    Con::nonstrict(e, Z::from(-bound))
}

#[test]
fn scenario_1_intersection_of_half_spaces() {
    let mut p = Poly::new_universe_with(2, Topology::Closed);
    p.add_con(half_space_ge(2, 0, 0)); // x >= 0
    p.add_con(half_space_ge(2, 1, 0)); // y >= 0
    let mut sum = LinExpr::zero_dim(2);
    sum.set(0, Z::from(-1));
    sum.set(1, Z::from(-1));
    p.add_con(Con::nonstrict(sum, Z::from(2))); // x + y <= 2

    assert!(!p.is_empty());
    assert_eq!(p.affine_dim(), 2);
    assert!(p.is_topologically_closed());
    assert_eq!(p.num_min_cons(), 3);

    let gens = p.gens();
    assert_eq!(gens.len(), 3);
    assert!(gens.iter().all(Gen::is_point));

    let bx = p.get_bounds(0);
    assert_eq!(bx.lb_rational(), Some(Q::from_integer(Z::from(0))));
    assert_eq!(bx.ub_rational(), Some(Q::from_integer(Z::from(2))));
    assert!(bx.is_lb_closed() && bx.is_ub_closed());
}

#[test]
fn scenario_2_strict_vs_non_strict() {
    let mut p1 = Poly::new_universe_with(1, Topology::Nnc);
    p1.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0)));
    let mut p2 = Poly::new_universe_with(1, Topology::Nnc);
    p2.add_con(Con::strict(LinExpr::unit(0), Z::from(0)));

    assert!(!p1.clone().equals(&mut p2.clone()));
    assert!(p1.clone().contains(&mut p2.clone()));

    let mut closure = p2.clone();
    closure.topological_closure_assign();
    assert!(closure.equals(&mut p1.clone()));

    let mut x_eq_0 = Poly::new_universe_with(1, Topology::Nnc);
    x_eq_0.add_con(Con::equality(LinExpr::unit(0), Z::from(0)));

    assert!(p2.clone().is_disjoint_from(&mut x_eq_0.clone()));
    assert!(!p1.is_disjoint_from(&mut x_eq_0));
}

#[test]
fn scenario_3_projection() {
    let mut p = Poly::new_universe_with(2, Topology::Closed);
    let mut diag = LinExpr::zero_dim(2);
    diag.set(0, Z::from(1));
    diag.set(1, Z::from(-1));
    p.add_con(Con::equality(diag, Z::from(0))); // x = y
    p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0))); // x >= 0
    let mut ub = LinExpr::zero_dim(2);
    ub.set(0, Z::from(-1));
    p.add_con(Con::nonstrict(ub, Z::from(1))); // x <= 1

    assert_eq!(p.affine_dim(), 1);
    p.unconstrain_assign(&[1]);
    assert_eq!(p.affine_dim(), 2);

    let bx = p.get_bounds(0);
    assert_eq!(bx.lb_rational(), Some(Q::from_integer(Z::from(0))));
    assert_eq!(bx.ub_rational(), Some(Q::from_integer(Z::from(1))));
    let by = p.get_bounds(1);
    assert!(by.lb_rational().is_none() && by.ub_rational().is_none());
}

#[test]
fn scenario_4_convex_hull() {
    fn strip_at(x: i64) -> Poly {
        let mut p = Poly::new_universe_with(2, Topology::Closed);
        let mut ex = LinExpr::zero_dim(2);
        ex.set(0, Z::from(1));
        p.add_con(Con::equality(ex, Z::from(-x)));
        p.add_con(Con::nonstrict(LinExpr::unit(1), Z::from(0)));
        let mut uy = LinExpr::zero_dim(2);
        uy.set(1, Z::from(-1));
        p.add_con(Con::nonstrict(uy, Z::from(1)));
        p
    }
    let mut p = strip_at(0);
    let mut q = strip_at(1);
    p.poly_hull_assign(&mut q);

    assert_eq!(p.get_bounds(0).lb_rational(), Some(Q::from_integer(Z::from(0))));
    assert_eq!(p.get_bounds(0).ub_rational(), Some(Q::from_integer(Z::from(1))));
    assert_eq!(p.get_bounds(1).lb_rational(), Some(Q::from_integer(Z::from(0))));
    assert_eq!(p.get_bounds(1).ub_rational(), Some(Q::from_integer(Z::from(1))));
    assert_eq!(p.num_min_gens(), 4);
}

#[test]
fn scenario_5_h79_widening_stabilizes() {
    let mut x = Poly::new_universe_with(1, Topology::Closed);
    x.add_con(Con::equality(LinExpr::unit(0), Z::from(0))); // x = 0

    for k in 1..=4i64 {
        let mut step = Poly::new_universe_with(1, Topology::Closed);
        let mut e = LinExpr::zero_dim(1);
        e.set(0, Z::from(1));
        step.add_con(Con::equality(e, Z::from(-k)));

        let mut joined = x.clone();
        joined.poly_hull_assign(&mut step);
        let mut prev = x.clone();
        joined.widening_assign(&mut prev, None);
        x = joined;

        if k == 1 {
            assert_eq!(x.get_bounds(0).lb_rational(), Some(Q::from_integer(Z::from(0))));
            assert!(x.get_bounds(0).ub_rational().is_none());
        }
    }
    // Further widening steps against the now-stable x should be no-ops.
    let mut stable_copy = x.clone();
    let mut prev = x.clone();
    stable_copy.widening_assign(&mut prev, None);
    assert!(stable_copy.equals(&mut x));
}

#[test]
fn scenario_6_factorization() {
    let mut p = Poly::new_universe_with(4, Topology::Closed);
    p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0))); // x >= 0
    p.add_con(Con::nonstrict(LinExpr::unit(1), Z::from(0))); // y >= 0
    let mut xy = LinExpr::zero_dim(4);
    xy.set(0, Z::from(-1));
    xy.set(1, Z::from(-1));
    p.add_con(Con::nonstrict(xy, Z::from(1))); // x + y <= 1

    p.add_con(Con::nonstrict(LinExpr::unit(2), Z::from(0))); // z >= 0
    p.add_con(Con::nonstrict(LinExpr::unit(3), Z::from(0))); // w >= 0
    let mut zw = LinExpr::zero_dim(4);
    zw.set(2, Z::from(-1));
    zw.set(3, Z::from(-1));
    p.add_con(Con::nonstrict(zw, Z::from(2))); // z + w <= 2

    let mut as_poly = p.clone();
    let mut fp = convex_polyhedra::fpoly::FPoly::from_poly(p);
    fp.normalize();
    assert_eq!(fp.blocks().len(), 2);
    let mut dims: Vec<Vec<usize>> = fp.blocks().to_vec();
    for b in &mut dims {
        b.sort();
    }
    dims.sort();
    assert_eq!(dims, vec![vec![0, 1], vec![2, 3]]);

    let mut round_tripped = fp.to_poly();
    assert!(round_tripped.equals(&mut as_poly));
}
