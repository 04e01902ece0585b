//! `proptest`-based fuzz properties: DD duality consequences, idempotence,
//! lattice laws, topology, factorization/projection round trips and bbox
//! coherence, exercised over small randomly-built NNC polyhedra in a fixed
//! low dimension.

use convex_polyhedra::bbox::BPoly;
use convex_polyhedra::fpoly::FPoly;
use convex_polyhedra::num::Z;
use convex_polyhedra::row::{Con, Topology};
use convex_polyhedra::upoly::UPoly;
use convex_polyhedra::{linexpr::LinExpr, poly::Poly};
use proptest::prelude::*;

const DIM: usize = 2;

fn arb_con() -> impl Strategy<Value = Con> {
    (prop::collection::vec(-3i64..=3i64, DIM), -4i64..=4i64, 0u8..=2).prop_map(|(coeffs, inhomo, kind)| {
        let mut e = LinExpr::zero_dim(DIM);
        for (i, c) in coeffs.into_iter().enumerate() {
            e.set(i, Z::from(c));
        }
        match kind {
            0 => Con::equality(e, Z::from(inhomo)),
            1 => Con::nonstrict(e, Z::from(inhomo)),
            _ => Con::strict(e, Z::from(inhomo)),
        }
    })
}

fn arb_poly() -> impl Strategy<Value = Poly> {
    prop::collection::vec(arb_con(), 0..5).prop_map(|cons| {
        let mut p = Poly::new_universe_with(DIM, Topology::Nnc);
        for c in cons {
            p.add_con(c);
        }
        p
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Re-minimizing an already-minimal system is a no-op.
    #[test]
    fn idempotence_of_minimize(mut p in arb_poly()) {
        p.minimize();
        let before = p.num_min_cons();
        p.minimize();
        let after = p.num_min_cons();
        prop_assert_eq!(before, after);
    }

    /// `P ∪ P = P`, `P ∩ P = P`.
    #[test]
    fn self_union_and_intersection_are_identity(p in arb_poly()) {
        let mut q = p.clone();
        q.poly_hull_assign(&mut p.clone());
        prop_assert!(q.equals(&mut p.clone()));

        let mut r = p.clone();
        r.intersection_assign(&mut p.clone());
        prop_assert!(r.equals(&mut p.clone()));
    }

    /// `P ⊆ P ∪ Q`, `Q ⊆ P ∪ Q`.
    #[test]
    fn union_contains_both_operands(p in arb_poly(), q in arb_poly()) {
        let mut joined = p.clone();
        joined.poly_hull_assign(&mut q.clone());
        prop_assert!(joined.clone().contains(&mut p.clone()));
        prop_assert!(joined.contains(&mut q.clone()));
    }

    /// `P ∩ Q ⊆ P`, `P ∩ Q ⊆ Q`.
    #[test]
    fn intersection_is_contained_in_both_operands(p in arb_poly(), q in arb_poly()) {
        let mut inter = p.clone();
        inter.intersection_assign(&mut q.clone());
        prop_assert!(p.clone().contains(&mut inter.clone()));
        prop_assert!(q.clone().contains(&mut inter.clone()));
    }

    /// Closure is idempotent and inflationary, and its result is always
    /// topologically closed.
    #[test]
    fn topological_closure_is_idempotent_and_inflationary(p in arb_poly()) {
        let mut once = p.clone();
        once.topological_closure_assign();
        let mut twice = once.clone();
        twice.topological_closure_assign();
        prop_assert!(twice.equals(&mut once.clone()));
        prop_assert!(once.clone().contains(&mut p.clone()));
        prop_assert!(once.is_topologically_closed());
    }

    /// `F_Poly` side: `to_poly(from_poly(P)) == P`.
    #[test]
    fn factorization_roundtrips_through_to_poly(p in arb_poly()) {
        let mut expected = p.clone();
        let mut fp = FPoly::from_poly(p);
        let mut actual = fp.to_poly();
        prop_assert!(actual.equals(&mut expected));
    }

    /// `U_Poly` side: `to_poly(from_poly(P)) == P`.
    #[test]
    fn unconstrained_projection_roundtrips_through_to_poly(p in arb_poly()) {
        let mut expected = p.clone();
        let mut up = UPoly::from_poly(p);
        let mut actual = up.to_poly();
        prop_assert!(actual.equals(&mut expected));
    }

    /// `B_Poly`'s cached bbox matches `Poly::get_bounds` on the wrapped
    /// polyhedron, dimension by dimension.
    #[test]
    fn bbox_matches_get_bounds(p in arb_poly()) {
        let mut reference = p.clone();
        let mut bp = BPoly::new(p);
        let bbox = bp.bbox().clone();
        for i in 0..DIM {
            prop_assert_eq!(bbox.itv(i).clone(), reference.get_bounds(i));
        }
    }
}

/// An invertible affine image (nonzero coefficient on the assigned
/// variable itself) is undone by a preimage with the same parameters.
#[test]
fn affine_image_then_preimage_is_identity_for_a_translation() {
    let mut p = Poly::new_universe_with(2, Topology::Closed);
    p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0)));
    let mut ub = LinExpr::zero_dim(2);
    ub.set(0, Z::from(-1));
    p.add_con(Con::nonstrict(ub, Z::from(3)));
    let mut expected = p.clone();

    let e = LinExpr::unit(0);
    p.affine_image_assign(0, &e, &Z::from(5), &Z::from(1));
    p.affine_preimage_assign(0, &e, &Z::from(5), &Z::from(1));
    assert!(p.equals(&mut expected));
}

/// One `risky_widen` step never shrinks, and widening a polyhedron
/// against itself is idempotent.
#[test]
fn widening_against_self_is_a_no_op() {
    let mut p = Poly::new_universe_with(1, Topology::Closed);
    p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0)));
    let mut ub = LinExpr::zero_dim(1);
    ub.set(0, Z::from(-1));
    p.add_con(Con::nonstrict(ub, Z::from(3)));
    let mut expected = p.clone();
    let mut other = p.clone();
    p.widening_assign(&mut other, None);
    assert!(p.equals(&mut expected));
}
