//! Constraint and generator rows: [`Con`] and [`Gen`].
//!
//! Both wrap a [`LinExpr`] plus a small amount of extra state (an
//! inhomogeneous term for constraints, a divisor for generators) and both
//! maintain a *strong normalization* invariant enforced at construction
//! time.

use crate::linexpr::LinExpr;
use crate::num::{self, Z};
use num_traits::{Signed, Zero};
use std::fmt;

// ======================================================================
// Topology - PUBLIC

/// Whether strict inequalities (and closure points) are admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Only equalities and non-strict inequalities.
    Closed,
    /// Not Necessarily Closed: additionally admits strict inequalities.
    Nnc,
}

impl Topology {
    /// True iff this is [`Topology::Nnc`].
    pub fn is_nnc(self) -> bool {
        matches!(self, Topology::Nnc)
    }
}

// ======================================================================
// Con - PUBLIC

/// A constraint `e * x + b ⊙ 0`, with `⊙` given by [`ConType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Con {
    expr: LinExpr,
    inhomo: Z,
    typ: ConType,
}

/// The relational operator of a [`Con`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConType {
    /// `e * x + b = 0`
    Equality,
    /// `e * x + b >= 0`
    NonStrict,
    /// `e * x + b > 0`
    Strict,
}

impl Con {
    /// Builds `expr + inhomo ⊙ 0` and strongly normalizes it.
    pub fn new(expr: LinExpr, inhomo: Z, typ: ConType) -> Self {
        let mut c = Self { expr, inhomo, typ };
        c.strong_normalize();
        c
    }

    /// `e * x + b = 0`.
    pub fn equality(expr: LinExpr, inhomo: Z) -> Self {
        Self::new(expr, inhomo, ConType::Equality)
    }

    /// `e * x + b >= 0`.
    pub fn nonstrict(expr: LinExpr, inhomo: Z) -> Self {
        Self::new(expr, inhomo, ConType::NonStrict)
    }

    /// `e * x + b > 0`.
    pub fn strict(expr: LinExpr, inhomo: Z) -> Self {
        Self::new(expr, inhomo, ConType::Strict)
    }

    /// Linear part.
    pub fn linear_expr(&self) -> &LinExpr {
        &self.expr
    }

    /// Inhomogeneous term `b`.
    pub fn inhomo_term(&self) -> &Z {
        &self.inhomo
    }

    /// Relational operator.
    pub fn con_type(&self) -> ConType {
        self.typ
    }

    /// `self.con_type() == Equality`.
    pub fn is_equality(&self) -> bool {
        self.typ == ConType::Equality
    }

    /// `self.con_type() == Strict`.
    pub fn is_strict(&self) -> bool {
        self.typ == ConType::Strict
    }

    /// Dimension of the ambient space this row is defined over.
    pub fn space_dim(&self) -> usize {
        self.expr.space_dim()
    }

    /// True iff this constraint is satisfied by every point, e.g. `0 >= 0`.
    pub fn is_tautological(&self) -> bool {
        if !self.expr.is_zero() {
            return false;
        }
        match self.typ {
            ConType::Equality => self.inhomo.is_zero(),
            ConType::NonStrict => !self.inhomo.is_negative(),
            ConType::Strict => self.inhomo.is_positive(),
        }
    }

    /// True iff this constraint is satisfied by no point at all, e.g.
    /// `0 > 0`. Mirrors `Con::is_inconsistent`.
    pub fn is_inconsistent(&self) -> bool {
        if !self.expr.is_zero() {
            return false;
        }
        match self.typ {
            ConType::Equality => !self.inhomo.is_zero(),
            ConType::NonStrict => self.inhomo.is_negative(),
            ConType::Strict => !self.inhomo.is_positive(),
        }
    }

    /// Strongly normalizes this row in place: divides `(expr, inhomo)` by
    /// their gcd, then fixes the sign of the leading non-zero coefficient
    /// (or of `inhomo` when `expr` is zero).
    ///
    /// Sign convention (an implementation-defined choice):
    /// for equalities and non-strict inequalities the leading non-zero is
    /// positive; for strict inequalities the leading non-zero is negative.
    /// Fixing *some* deterministic rule is all correctness requires; this
    /// crate picks a rule that differs between strict/non-strict so two
    /// rows that are otherwise identical modulo relation can never collide
    /// under `Ord`, which simplifies the total order used for hashing and
    /// equality (see [`Con::normalized_cmp_key`]).
    pub fn strong_normalize(&mut self) {
        self.expr.normalize(&mut self.inhomo);
        let leading = self
            .expr
            .coeffs()
            .iter()
            .find(|c| !c.is_zero())
            .cloned()
            .unwrap_or_else(Z::zero);
        let want_positive = !matches!(self.typ, ConType::Strict);
        let pivot = if leading.is_zero() {
            self.inhomo.clone()
        } else {
            leading
        };
        let flip = if want_positive {
            pivot.is_negative()
        } else {
            pivot.is_positive()
        };
        if flip {
            self.expr.negate();
            self.inhomo = -(&self.inhomo);
        }
    }

    /// The "other side" of this half-space/hyperplane under the given
    /// topology. For a non-strict `e*x+b >= 0` in NNC this is the strict
    /// `-e*x-b > 0`; for a strict `> 0` in Closed topology this is the
    /// non-strict `<= 0`; equalities split into the two open half-spaces
    /// `< 0` / `> 0` (NNC only — undefined, i.e. `None`, for an equality
    /// under Closed topology).
    pub fn complement(&self, topology: Topology) -> Option<ComplementCons> {
        match self.typ {
            ConType::NonStrict => {
                let mut e = self.expr.clone();
                e.negate();
                let b = -(&self.inhomo);
                let typ = if topology.is_nnc() {
                    ConType::Strict
                } else {
                    // Closed topology cannot represent `< 0`.
                    return None;
                };
                Some(ComplementCons::One(Con::new(e, b, typ)))
            }
            ConType::Strict => {
                let mut e = self.expr.clone();
                e.negate();
                let b = -(&self.inhomo);
                Some(ComplementCons::One(Con::new(e, b, ConType::NonStrict)))
            }
            ConType::Equality => {
                if !topology.is_nnc() {
                    return None;
                }
                let mut e1 = self.expr.clone();
                e1.negate();
                let b1 = -(&self.inhomo);
                let lt = Con::new(e1, b1, ConType::Strict);
                let gt = Con::new(self.expr.clone(), self.inhomo.clone(), ConType::Strict);
                Some(ComplementCons::Two(lt, gt))
            }
        }
    }

    /// Scalar product with a generator's homogeneous coordinates, i.e.
    /// `e(self) . e(g) + b(self) * div(g)`, used throughout the conversion
    /// algorithm's partitioning step. The NNC epsilon slot (if any) must
    /// be folded into `g`'s expression by the caller (see
    /// [`crate::poly::convert`]).
    pub fn scalar_product(&self, gen_expr: &LinExpr, gen_div: &Z) -> Z {
        self.expr.dot(gen_expr) + &self.inhomo * gen_div
    }
}

/// Result of [`Con::complement`]: one row, or two when an equality splits.
pub enum ComplementCons {
    /// Non-equality complement: a single row.
    One(Con),
    /// Equality complement under NNC: the two open half-spaces.
    Two(Con, Con),
}

impl fmt::Display for Con {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rel = match self.typ {
            ConType::Equality => "=",
            ConType::NonStrict => ">=",
            ConType::Strict => ">",
        };
        write!(f, "{:?} {} {}", self.expr.coeffs(), rel, -&self.inhomo)
    }
}

// ======================================================================
// Gen - PUBLIC

/// A generator: a line, ray, point or closure point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gen {
    expr: LinExpr,
    div: Z,
    typ: GenType,
}

/// The kind of a [`Gen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenType {
    /// A line through the origin, in both directions; `div == 0`.
    Line,
    /// A ray from the origin; `div == 0`.
    Ray,
    /// A point `expr / div`, `div > 0`, with `ε = 1` (NNC).
    Point,
    /// A point on the NNC closure boundary, `expr / div`, `div > 0`, `ε = 0`.
    ClosurePoint,
}

impl Gen {
    /// Builds a generator and strongly normalizes it.
    pub fn new(typ: GenType, expr: LinExpr, div: Z) -> Self {
        let mut g = Self { expr, div, typ };
        g.strong_normalize();
        g
    }

    /// The line along `x_var`.
    pub fn line(var: usize) -> Self {
        Self::new(GenType::Line, LinExpr::unit(var), Z::zero())
    }

    /// The ray along `x_var`.
    pub fn ray(var: usize) -> Self {
        Self::new(GenType::Ray, LinExpr::unit(var), Z::zero())
    }

    /// The point at the origin of a `space_dim`-dimensional space.
    pub fn origin(space_dim: usize) -> Self {
        Self::new(GenType::Point, LinExpr::zero_dim(space_dim), num::one())
    }

    /// A point with homogeneous coordinates `expr`, divisor `div`.
    pub fn point(expr: LinExpr, div: Z) -> Self {
        Self::new(GenType::Point, expr, div)
    }

    /// A closure point with homogeneous coordinates `expr`, divisor `div`.
    pub fn closure_point(expr: LinExpr, div: Z) -> Self {
        Self::new(GenType::ClosurePoint, expr, div)
    }

    /// Homogeneous coordinates.
    pub fn linear_expr(&self) -> &LinExpr {
        &self.expr
    }

    /// Divisor: `0` for lines/rays, strictly positive for points.
    pub fn divisor(&self) -> &Z {
        &self.div
    }

    /// Kind of generator.
    pub fn gen_type(&self) -> GenType {
        self.typ
    }

    /// True iff this is a [`GenType::Line`].
    pub fn is_line(&self) -> bool {
        self.typ == GenType::Line
    }

    /// True iff this is a [`GenType::Line`] or [`GenType::Ray`].
    pub fn is_line_or_ray(&self) -> bool {
        matches!(self.typ, GenType::Line | GenType::Ray)
    }

    /// True iff this is a [`GenType::Point`].
    pub fn is_point(&self) -> bool {
        self.typ == GenType::Point
    }

    /// True iff this is a [`GenType::Point`] or [`GenType::ClosurePoint`].
    pub fn is_point_or_closure_point(&self) -> bool {
        matches!(self.typ, GenType::Point | GenType::ClosurePoint)
    }

    /// True iff this is a [`GenType::ClosurePoint`].
    pub fn is_closure_point(&self) -> bool {
        self.typ == GenType::ClosurePoint
    }

    /// Dimension of the ambient space this row is defined over.
    pub fn space_dim(&self) -> usize {
        self.expr.space_dim()
    }

    /// The implicit `ε` coefficient used by the conversion algorithm's NNC
    /// scalar products: `1` for points, `0` for everything else — a
    /// non-strict (ε=1) point must fail a strict constraint it merely
    /// touches, while a closure point (ε=0) never can.
    pub fn epsilon_coeff(&self) -> Z {
        if self.is_point() {
            num::one()
        } else {
            Z::zero()
        }
    }

    /// Rational coordinate of dimension `i`, i.e. `coeff(i) / div`. Lines
    /// and rays have no well-defined point coordinate; callers must not
    /// call this on them.
    pub fn rational_coord(&self, i: usize) -> num::Q {
        assert!(self.is_point_or_closure_point());
        num::Q::new(self.expr.get(i), self.div.clone())
    }

    /// Converts this point/closure-point into a ray (used by
    /// [`crate::poly::Poly::time_elapse_assign`]): drops the divisor,
    /// re-normalizes, and becomes a [`GenType::Ray`]. The origin cannot be
    /// turned into a ray and is dropped by the caller instead.
    pub fn into_ray(mut self) -> Option<Gen> {
        if self.expr.is_zero() {
            return None;
        }
        self.div = Z::zero();
        self.typ = GenType::Ray;
        self.strong_normalize();
        Some(self)
    }

    /// Strongly normalizes this row in place: for
    /// points/closure-points, divide `(expr, div)` by their gcd so that
    /// `div > 0`; for lines/rays, divide `expr` by its gcd and fix the
    /// sign of the leading non-zero (positive for lines; for rays the
    /// convention is likewise "positive", since unlike constraints there
    /// is no second relation to disambiguate against).
    pub fn strong_normalize(&mut self) {
        if self.is_point_or_closure_point() {
            assert!(self.div.is_positive(), "points must have a positive divisor");
            let mut neg_div = -(&self.div);
            self.expr.normalize(&mut neg_div);
            self.div = -neg_div;
            if self.div.is_negative() {
                self.expr.negate();
                self.div = -(&self.div);
            }
        } else {
            assert!(self.div.is_zero(), "lines/rays must have a zero divisor");
            let mut zero = Z::zero();
            self.expr.normalize(&mut zero);
            let leading = self
                .expr
                .coeffs()
                .iter()
                .find(|c| !c.is_zero())
                .cloned()
                .unwrap_or_else(Z::zero);
            if leading.is_negative() {
                self.expr.negate();
            }
        }
    }
}

impl fmt::Display for Gen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.typ {
            GenType::Line => "l",
            GenType::Ray => "r",
            GenType::Point => "p",
            GenType::ClosurePoint => "c",
        };
        if self.is_point_or_closure_point() {
            write!(f, "{}({:?}/{})", tag, self.expr.coeffs(), self.div)
        } else {
            write!(f, "{}({:?})", tag, self.expr.coeffs())
        }
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Con

    mod con {
        use super::*;

        #[test]
        fn tautological_and_inconsistent() {
            let taut = Con::nonstrict(LinExpr::zero(), Z::from(3));
            assert!(taut.is_tautological());
            let incons = Con::nonstrict(LinExpr::zero(), Z::from(-3));
            assert!(incons.is_inconsistent());
            let eq_taut = Con::equality(LinExpr::zero(), Z::from(0));
            assert!(eq_taut.is_tautological());
            let strict_incons = Con::strict(LinExpr::zero(), Z::from(0));
            assert!(strict_incons.is_inconsistent());
        }

        #[test]
        fn strong_normalize_divides_by_gcd_and_fixes_sign() {
            let c = Con::nonstrict(LinExpr::from_coeffs(vec![Z::from(-4), Z::from(-6)]), Z::from(-2));
            assert_eq!(c.linear_expr().coeffs(), &[Z::from(2), Z::from(3)]);
            assert_eq!(*c.inhomo_term(), Z::from(1));
        }

        #[test]
        fn complement_nonstrict_in_nnc_is_strict() {
            let c = Con::nonstrict(LinExpr::unit(0), Z::from(0)); // x >= 0
            match c.complement(Topology::Nnc).unwrap() {
                ComplementCons::One(d) => {
                    assert!(d.is_strict());
                    assert_eq!(d.linear_expr().get(0), Z::from(-1));
                }
                _ => panic!("expected one row"),
            }
        }

        #[test]
        fn complement_nonstrict_in_closed_is_undefined() {
            let c = Con::nonstrict(LinExpr::unit(0), Z::from(0));
            assert!(c.complement(Topology::Closed).is_none());
        }

        #[test]
        fn complement_equality_in_nnc_splits_in_two() {
            let c = Con::equality(LinExpr::unit(0), Z::from(0)); // x = 0
            match c.complement(Topology::Nnc).unwrap() {
                ComplementCons::Two(a, b) => {
                    assert!(a.is_strict() && b.is_strict());
                }
                _ => panic!("expected two rows"),
            }
        }
    }

    // ============================================================
    // Gen

    mod gen {
        use super::*;

        #[test]
        fn point_normalizes_divisor_positive() {
            let g = Gen::point(LinExpr::from_coeffs(vec![Z::from(-4)]), Z::from(-2));
            assert_eq!(*g.divisor(), Z::from(1));
            assert_eq!(g.linear_expr().coeffs(), &[Z::from(2)]);
        }

        #[test]
        fn line_and_ray_have_zero_divisor() {
            let l = Gen::line(0);
            assert!(l.is_line());
            assert_eq!(*l.divisor(), Z::from(0));
        }

        #[test]
        fn point_into_ray_drops_divisor() {
            let p = Gen::point(LinExpr::from_coeffs(vec![Z::from(4)]), Z::from(2));
            let r = p.into_ray().unwrap();
            assert!(matches!(r.gen_type(), GenType::Ray));
            assert_eq!(r.linear_expr().coeffs(), &[Z::from(1)]);
        }

        #[test]
        fn origin_into_ray_is_none() {
            let origin = Gen::origin(2);
            assert!(origin.into_ray().is_none());
        }
    }
}
