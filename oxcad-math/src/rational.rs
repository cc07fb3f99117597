//! Rational number helpers.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Create a rational from an integer.
#[inline]
pub fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Create the rational `num / den`.
#[inline]
pub fn frac(num: i64, den: i64) -> BigRational {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

/// Raise a rational to a non-negative integer power.
pub fn pow_uint(base: &BigRational, exp: u32) -> BigRational {
    let mut result = BigRational::one();
    let mut b = base.clone();
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result *= &b;
        }
        e >>= 1;
        if e > 0 {
            b = &b * &b;
        }
    }
    result
}

/// Midpoint of two rationals.
#[inline]
pub fn midpoint(a: &BigRational, b: &BigRational) -> BigRational {
    (a + b) / rat(2)
}

/// Largest integer not above `value`.
pub fn floor(value: &BigRational) -> BigInt {
    value.numer().div_floor(value.denom())
}

/// Smallest integer not below `value`.
pub fn ceil(value: &BigRational) -> BigInt {
    -((-value.numer()).div_floor(value.denom()))
}

/// Gcd of the numerators divided by the lcm of the denominators.
///
/// Dividing every input by the result yields coprime integers. Returns zero
/// only if all inputs are zero.
pub fn rational_content<'a>(values: impl IntoIterator<Item = &'a BigRational>) -> BigRational {
    let mut num = BigInt::zero();
    let mut den = BigInt::one();
    for v in values {
        if v.is_zero() {
            continue;
        }
        num = num.gcd(v.numer());
        den = den.lcm(v.denom());
    }
    if num.is_zero() {
        BigRational::zero()
    } else {
        BigRational::new(num.abs(), den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_ceil() {
        assert_eq!(floor(&frac(7, 2)), BigInt::from(3));
        assert_eq!(ceil(&frac(7, 2)), BigInt::from(4));
        assert_eq!(floor(&frac(-7, 2)), BigInt::from(-4));
        assert_eq!(ceil(&frac(-7, 2)), BigInt::from(-3));
        assert_eq!(ceil(&rat(5)), BigInt::from(5));
    }

    #[test]
    fn test_pow_uint() {
        assert_eq!(pow_uint(&frac(2, 3), 3), frac(8, 27));
        assert_eq!(pow_uint(&rat(-2), 0), rat(1));
    }

    #[test]
    fn test_rational_content() {
        let values = [frac(2, 3), frac(4, 9), rat(0)];
        assert_eq!(rational_content(values.iter()), frac(2, 9));
    }
}
