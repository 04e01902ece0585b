//! Arbitrary-precision numeric substrate.
//!
//! The double-description engine needs exact integer (`Z`) and rational
//! (`Q`) arithmetic. Both are thin aliases over `num-bigint`/`num-rational`
//! plus a handful of free functions (`gcd`, `lcm`, `sign`) used throughout
//! [`crate::linexpr`] and [`crate::row`] for strong normalization.

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Arbitrary-precision signed integer.
pub type Z = BigInt;

/// Arbitrary-precision rational.
pub type Q = BigRational;

// ======================================================================
// FUNCTIONS - PUBLIC

/// Greatest common divisor of `a` and `b`, always non-negative.
pub fn gcd(a: &Z, b: &Z) -> Z {
    a.gcd(b)
}

/// Least common multiple of `a` and `b`, always non-negative.
pub fn lcm(a: &Z, b: &Z) -> Z {
    a.lcm(b)
}

/// `-1`, `0` or `1` according to the sign of `x`.
pub fn sign(x: &Z) -> i32 {
    if x.is_zero() {
        0
    } else if x.is_negative() {
        -1
    } else {
        1
    }
}

/// Shorthand for `Z::from(0)`.
pub fn zero() -> Z {
    Z::zero()
}

/// Shorthand for `Z::from(1)`.
pub fn one() -> Z {
    Z::one()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_lcm() {
        let a = Z::from(12);
        let b = Z::from(18);
        assert_eq!(gcd(&a, &b), Z::from(6));
        assert_eq!(lcm(&a, &b), Z::from(36));
    }

    #[test]
    fn sign_cases() {
        assert_eq!(sign(&Z::from(-5)), -1);
        assert_eq!(sign(&Z::from(0)), 0);
        assert_eq!(sign(&Z::from(5)), 1);
    }
}
