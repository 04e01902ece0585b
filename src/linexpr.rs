//! Linear expressions: `e = c_0*x_0 + c_1*x_1 + ... `.
//!
//! Coefficients are stored densely (a flat `Vec<Z>`, not a sparse map)
//! because rows are small relative to typical analysis dimensions and
//! dense storage keeps the conversion algorithm's scalar-product loop
//! branch-free.

use crate::bits::BitSet;
use crate::num::{self, Z};
use num_traits::Zero;

// ======================================================================
// LinExpr - PUBLIC

/// A linear expression over dimensions `0..space_dim()`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LinExpr {
    coeffs: Vec<Z>,
}

impl LinExpr {
    /// The zero expression of dimension 0.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The zero expression of dimension `space_dim`.
    pub fn zero_dim(space_dim: usize) -> Self {
        Self {
            coeffs: vec![Z::zero(); space_dim],
        }
    }

    /// The expression `1 * x_var`.
    pub fn unit(var: usize) -> Self {
        let mut e = Self::zero_dim(var + 1);
        e.coeffs[var] = num::one();
        e
    }

    /// Builds an expression from explicit dense coefficients.
    pub fn from_coeffs(coeffs: Vec<Z>) -> Self {
        Self { coeffs }
    }

    /// Number of dimensions this expression is defined over.
    pub fn space_dim(&self) -> usize {
        self.coeffs.len()
    }

    /// Grows (never shrinks) this expression to `space_dim` dimensions,
    /// filling new coefficients with zero.
    pub fn set_space_dim(&mut self, space_dim: usize) {
        if space_dim > self.coeffs.len() {
            self.coeffs.resize(space_dim, Z::zero());
        }
    }

    /// Coefficient of dimension `i`, or zero if `i` is out of range.
    pub fn get(&self, i: usize) -> Z {
        self.coeffs.get(i).cloned().unwrap_or_else(Z::zero)
    }

    /// Sets the coefficient of dimension `i`, growing if necessary.
    pub fn set(&mut self, i: usize, value: Z) {
        if i >= self.coeffs.len() {
            self.set_space_dim(i + 1);
        }
        self.coeffs[i] = value;
    }

    /// Raw coefficient slice.
    pub fn coeffs(&self) -> &[Z] {
        &self.coeffs
    }

    /// True iff every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }

    /// True iff every coefficient in `lo..hi` is zero.
    pub fn all_zeroes(&self, lo: usize, hi: usize) -> bool {
        let hi = hi.min(self.coeffs.len());
        lo >= hi || self.coeffs[lo..hi].iter().all(|c| c.is_zero())
    }

    /// Index of the highest dimension with a non-zero coefficient, if any.
    pub fn last_nonzero(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|c| !c.is_zero())
    }

    /// Index of the lowest dimension with a non-zero coefficient, if any.
    pub fn first_nonzero(&self) -> Option<usize> {
        self.coeffs.iter().position(|c| !c.is_zero())
    }

    /// The set of dimensions with a non-zero coefficient.
    pub fn support(&self) -> BitSet {
        let mut s = BitSet::with_capacity(self.coeffs.len());
        for (i, c) in self.coeffs.iter().enumerate() {
            if !c.is_zero() {
                s.set(i, true);
            }
        }
        s
    }

    /// True iff exactly one coefficient is non-zero, returning its index.
    pub fn single_nonzero_dim(&self) -> Option<usize> {
        let mut found = None;
        for (i, c) in self.coeffs.iter().enumerate() {
            if !c.is_zero() {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    /// `self *= k`.
    pub fn mul_assign(&mut self, k: &Z) {
        for c in &mut self.coeffs {
            *c *= k;
        }
    }

    /// `self += k * other`, growing `self` to cover `other`'s dimension.
    pub fn add_mul_assign(&mut self, k: &Z, other: &LinExpr) {
        self.set_space_dim(other.space_dim());
        for (c, o) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *c += k * o;
        }
    }

    /// `self += other`.
    pub fn add_assign(&mut self, other: &LinExpr) {
        self.add_mul_assign(&num::one(), other);
    }

    /// Negates every coefficient in place.
    pub fn negate(&mut self) {
        for c in &mut self.coeffs {
            *c = -(&*c);
        }
    }

    /// Dot product `self . other`, padding the shorter with zeroes.
    pub fn dot(&self, other: &LinExpr) -> Z {
        let n = self.coeffs.len().max(other.coeffs.len());
        let mut acc = Z::zero();
        for i in 0..n {
            acc += self.get(i) * other.get(i);
        }
        acc
    }

    /// Divides every coefficient, plus `inhomo_term`, by their gcd,
    /// leaving (coeffs, inhomo) in lowest terms; returns the (always
    /// non-negative) gcd used, or `1` if everything was already zero.
    pub fn normalize(&mut self, inhomo_term: &mut Z) -> Z {
        let mut g = Z::zero();
        for c in &self.coeffs {
            g = num::gcd(&g, c);
        }
        g = num::gcd(&g, inhomo_term);
        if g.is_zero() || g == num::one() {
            return num::one();
        }
        for c in &mut self.coeffs {
            *c = &*c / &g;
        }
        *inhomo_term = &*inhomo_term / &g;
        g
    }

    /// Applies the permutation cycle `dims[0] -> dims[1] -> ... -> dims[0]`
    /// to coefficients, i.e. the coefficient that was at `dims[i]` moves to
    /// `dims[i+1]` (wrapping).
    pub fn cycle_dims(&mut self, dims: &[usize]) {
        if dims.len() < 2 {
            return;
        }
        let max = *dims.iter().max().unwrap();
        self.set_space_dim(max + 1);
        let last = self.get(*dims.last().unwrap());
        for w in (1..dims.len()).rev() {
            let v = self.get(dims[w - 1]);
            self.set(dims[w], v);
        }
        self.set(dims[0], last);
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_divides_by_gcd() {
        let mut e = LinExpr::from_coeffs(vec![Z::from(4), Z::from(6)]);
        let mut b = Z::from(8);
        let g = e.normalize(&mut b);
        assert_eq!(g, Z::from(2));
        assert_eq!(e.coeffs(), &[Z::from(2), Z::from(3)]);
        assert_eq!(b, Z::from(4));
    }

    #[test]
    fn normalize_noop_when_already_coprime() {
        let mut e = LinExpr::from_coeffs(vec![Z::from(3), Z::from(4)]);
        let mut b = Z::from(1);
        let g = e.normalize(&mut b);
        assert_eq!(g, num::one());
        assert_eq!(e.coeffs(), &[Z::from(3), Z::from(4)]);
    }

    #[test]
    fn support_and_single_nonzero() {
        let e = LinExpr::from_coeffs(vec![Z::from(0), Z::from(5), Z::from(0)]);
        assert_eq!(e.support(), BitSet::from_iter([1]));
        assert_eq!(e.single_nonzero_dim(), Some(1));

        let e2 = LinExpr::from_coeffs(vec![Z::from(1), Z::from(5)]);
        assert_eq!(e2.single_nonzero_dim(), None);
    }

    #[test]
    fn dot_product_pads_shorter() {
        let a = LinExpr::from_coeffs(vec![Z::from(1), Z::from(2), Z::from(3)]);
        let b = LinExpr::from_coeffs(vec![Z::from(1), Z::from(1)]);
        assert_eq!(a.dot(&b), Z::from(3));
    }

    #[test]
    fn cycle_dims_rotates_coefficients() {
        let mut e = LinExpr::from_coeffs(vec![Z::from(1), Z::from(2), Z::from(3)]);
        e.cycle_dims(&[0, 1, 2]);
        assert_eq!(e.coeffs(), &[Z::from(3), Z::from(1), Z::from(2)]);
    }
}
