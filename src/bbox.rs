//! Bounding boxes: per-dimension interval bounds, and [`BPoly`], the
//! bounding-box-cached wrapper around [`crate::poly::Poly`].
//!
//! An [`Itv`] is a rational interval, open or closed at each end
//! independently (NNC polyhedra can be bounded by a closure point without
//! being bounded by an actual point there). [`BBox`] is a dense vector of
//! one `Itv` per dimension, plus a "pseudo-volume" used to decide whether
//! a cached box is worth keeping around.

use crate::num::{self, Q};
use crate::poly::Poly;
use num_traits::Zero;

// ======================================================================
// Itv - PUBLIC

/// A (possibly unbounded, possibly open) rational interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Itv {
    empty: bool,
    lb: Option<Q>,
    lb_closed: bool,
    ub: Option<Q>,
    ub_closed: bool,
}

impl Itv {
    /// The empty interval (only arises from querying an empty polyhedron).
    pub fn empty() -> Self {
        Self {
            empty: true,
            lb: None,
            lb_closed: false,
            ub: None,
            ub_closed: false,
        }
    }

    /// `(-inf, +inf)`.
    pub fn universe() -> Self {
        Self {
            empty: false,
            lb: None,
            lb_closed: false,
            ub: None,
            ub_closed: false,
        }
    }

    /// The degenerate interval `[v, v]`.
    pub fn singleton(v: Q) -> Self {
        Self {
            empty: false,
            lb: Some(v.clone()),
            lb_closed: true,
            ub: Some(v),
            ub_closed: true,
        }
    }

    fn bounded(lb: Option<Q>, lb_closed: bool, ub: Option<Q>, ub_closed: bool) -> Self {
        Self {
            empty: false,
            lb,
            lb_closed,
            ub,
            ub_closed,
        }
    }

    /// Crate-internal general constructor, for [`crate::poly::ops`]'s
    /// `get_bounds_affine`, which computes each end independently via
    /// `min`/`max` over the polyhedron's generators.
    pub(crate) fn from_parts(lb: Option<Q>, lb_closed: bool, ub: Option<Q>, ub_closed: bool) -> Self {
        Self::bounded(lb, lb_closed, ub, ub_closed)
    }

    /// True iff this interval represents the empty polyhedron's (lack of
    /// a) bound, not a genuinely empty numeric range.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Lower bound value, if finite.
    pub fn lb_rational(&self) -> Option<Q> {
        self.lb.clone()
    }

    /// Upper bound value, if finite.
    pub fn ub_rational(&self) -> Option<Q> {
        self.ub.clone()
    }

    /// True iff the lower bound (when finite) is attained.
    pub fn is_lb_closed(&self) -> bool {
        self.lb_closed
    }

    /// True iff the upper bound (when finite) is attained.
    pub fn is_ub_closed(&self) -> bool {
        self.ub_closed
    }

    /// True iff both ends are finite.
    pub fn is_bounded(&self) -> bool {
        !self.empty && self.lb.is_some() && self.ub.is_some()
    }

    /// Width `ub - lb`, or `None` if unbounded or empty.
    pub fn width(&self) -> Option<Q> {
        match (&self.lb, &self.ub) {
            (Some(l), Some(u)) => Some(u - l),
            _ => None,
        }
    }

    /// The intersection of `self` and `other`.
    pub fn intersect(&self, other: &Itv) -> Itv {
        if self.empty || other.empty {
            return Itv::empty();
        }
        let (lb, lb_closed) = match (&self.lb, &other.lb) {
            (Some(a), Some(b)) => {
                if a > b {
                    (Some(a.clone()), self.lb_closed)
                } else if b > a {
                    (Some(b.clone()), other.lb_closed)
                } else {
                    (Some(a.clone()), self.lb_closed && other.lb_closed)
                }
            }
            (Some(a), None) => (Some(a.clone()), self.lb_closed),
            (None, Some(b)) => (Some(b.clone()), other.lb_closed),
            (None, None) => (None, false),
        };
        let (ub, ub_closed) = match (&self.ub, &other.ub) {
            (Some(a), Some(b)) => {
                if a < b {
                    (Some(a.clone()), self.ub_closed)
                } else if b < a {
                    (Some(b.clone()), other.ub_closed)
                } else {
                    (Some(a.clone()), self.ub_closed && other.ub_closed)
                }
            }
            (Some(a), None) => (Some(a.clone()), self.ub_closed),
            (None, Some(b)) => (Some(b.clone()), other.ub_closed),
            (None, None) => (None, false),
        };
        if let (Some(l), Some(u)) = (&lb, &ub) {
            if l > u || (l == u && !(lb_closed && ub_closed)) {
                return Itv::empty();
            }
        }
        Itv::bounded(lb, lb_closed, ub, ub_closed)
    }

    /// The smallest interval containing both `self` and `other`.
    pub fn join(&self, other: &Itv) -> Itv {
        if self.empty {
            return other.clone();
        }
        if other.empty {
            return self.clone();
        }
        let (lb, lb_closed) = match (&self.lb, &other.lb) {
            (Some(a), Some(b)) => {
                if a < b {
                    (Some(a.clone()), self.lb_closed)
                } else if b < a {
                    (Some(b.clone()), other.lb_closed)
                } else {
                    (Some(a.clone()), self.lb_closed || other.lb_closed)
                }
            }
            _ => (None, false),
        };
        let (ub, ub_closed) = match (&self.ub, &other.ub) {
            (Some(a), Some(b)) => {
                if a > b {
                    (Some(a.clone()), self.ub_closed)
                } else if b > a {
                    (Some(b.clone()), other.ub_closed)
                } else {
                    (Some(a.clone()), self.ub_closed || other.ub_closed)
                }
            }
            _ => (None, false),
        };
        Itv::bounded(lb, lb_closed, ub, ub_closed)
    }
}

// ======================================================================
// BBox - PUBLIC

/// A dense vector of per-dimension bounds, plus a pseudo-volume summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BBox {
    itvs: Vec<Itv>,
}

impl BBox {
    /// Computes the bounding box of `poly` by querying each dimension in
    /// turn. `poly` is minimized as a side effect.
    pub fn from_poly(poly: &mut Poly) -> Self {
        let d = poly.space_dim();
        let itvs = (0..d).map(|i| poly.get_bounds(i)).collect();
        Self { itvs }
    }

    /// Space dimension.
    pub fn space_dim(&self) -> usize {
        self.itvs.len()
    }

    /// Interval for dimension `i`.
    pub fn itv(&self, i: usize) -> &Itv {
        &self.itvs[i]
    }

    /// True iff any dimension is empty (the polyhedron itself was empty).
    pub fn is_empty(&self) -> bool {
        self.itvs.iter().any(|i| i.is_empty())
    }

    /// The "pseudo-volume": product of finite widths, `0` if any dimension
    /// is a single point, ignoring unbounded dimensions entirely. Used
    /// only as a coarse cache-invalidation heuristic, never for exact
    /// geometric reasoning.
    pub fn pseudo_volume(&self) -> Q {
        let mut acc = Q::from_integer(num::one());
        for itv in &self.itvs {
            if let Some(w) = itv.width() {
                if w.is_zero() {
                    return Q::zero();
                }
                acc *= w;
            }
        }
        acc
    }

    /// The join of two bounding boxes, dimension-wise.
    pub fn join(&self, other: &BBox) -> BBox {
        let itvs = self
            .itvs
            .iter()
            .zip(other.itvs.iter())
            .map(|(a, b)| a.join(b))
            .collect();
        BBox { itvs }
    }
}

// ======================================================================
// BPoly - PUBLIC

/// A [`Poly`] paired with a lazily-recomputed [`BBox`] cache: every
/// mutating operation invalidates the cache; every bound query
/// recomputes it if stale, then serves future queries from the cache
/// until the next mutation.
#[derive(Clone, Debug)]
pub struct BPoly {
    core: Poly,
    cache: Option<BBox>,
}

impl BPoly {
    /// Wraps an existing core polyhedron with an empty (stale) cache.
    pub fn new(core: Poly) -> Self {
        Self { core, cache: None }
    }

    /// Read-only access to the wrapped engine.
    pub fn core(&self) -> &Poly {
        &self.core
    }

    /// Mutable access to the wrapped engine; invalidates the cache, since
    /// the caller may be about to change the represented polyhedron.
    pub fn core_mut(&mut self) -> &mut Poly {
        self.cache = None;
        &mut self.core
    }

    /// Returns the (possibly freshly recomputed) bounding box.
    pub fn bbox(&mut self) -> &BBox {
        if self.cache.is_none() {
            self.cache = Some(BBox::from_poly(&mut self.core));
        }
        self.cache.as_ref().unwrap()
    }

    /// Drops the cache without recomputing it, for callers that know they
    /// mutated `core` through a channel this wrapper didn't see.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linexpr::LinExpr;
    use crate::num::Z;
    use crate::row::{Con, Topology};

    fn unit_square() -> Poly {
        let mut p = Poly::new_universe_with(2, Topology::Closed);
        p.add_con(Con::nonstrict(LinExpr::unit(0), Z::from(0)));
        p.add_con(Con::nonstrict(LinExpr::unit(1), Z::from(0)));
        let mut ex = LinExpr::zero_dim(2);
        ex.set(0, Z::from(-1));
        p.add_con(Con::nonstrict(ex, Z::from(1)));
        let mut ey = LinExpr::zero_dim(2);
        ey.set(1, Z::from(-1));
        p.add_con(Con::nonstrict(ey, Z::from(1)));
        p
    }

    #[test]
    fn bbox_of_unit_square() {
        let mut p = unit_square();
        let bbox = BBox::from_poly(&mut p);
        assert_eq!(bbox.itv(0).lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(bbox.itv(0).ub_rational(), Some(Q::from_integer(Z::from(1))));
        assert_eq!(bbox.pseudo_volume(), Q::from_integer(Z::from(1)));
    }

    #[test]
    fn bpoly_cache_invalidates_on_core_mut() {
        let mut bp = BPoly::new(unit_square());
        let first = bp.bbox().clone();
        assert!(!first.is_empty());
        bp.core_mut().add_con(Con::nonstrict(LinExpr::zero(), Z::from(0)));
        assert!(bp.cache.is_none());
    }

    #[test]
    fn join_of_boxes_widens() {
        let a = Itv::singleton(Q::from_integer(Z::from(0)));
        let b = Itv::singleton(Q::from_integer(Z::from(5)));
        let j = a.join(&b);
        assert_eq!(j.lb_rational(), Some(Q::from_integer(Z::from(0))));
        assert_eq!(j.ub_rational(), Some(Q::from_integer(Z::from(5))));
    }
}
