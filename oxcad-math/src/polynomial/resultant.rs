//! Resultants and discriminants.
//!
//! ## Algorithm
//!
//! Subresultant pseudo-remainder sequence (Cohen, Algorithm 3.3.7). All
//! divisions are exact in the coefficient ring `Q[other variables]`, so the
//! intermediate coefficients stay small compared to the Euclidean PRS.
//!
//! ## References
//!
//! - Cohen: "A Course in Computational Algebraic Number Theory" (1993), §3.3
//! - Z3's `math/polynomial/polynomial.cpp` (`resultant`, `discriminant`)

use super::{Polynomial, Var};

/// Resultant of `a` and `b` with respect to `var`.
///
/// The result does not contain `var`. It vanishes iff `a` and `b` have a
/// common factor of positive degree in `var` (or one of them is zero).
pub fn resultant(a: &Polynomial, b: &Polynomial, var: Var) -> Polynomial {
    if a.is_zero() || b.is_zero() {
        return Polynomial::zero();
    }
    let mut da = a.degree(var);
    let mut db = b.degree(var);
    if da == 0 {
        return a.pow(db);
    }
    if db == 0 {
        return b.pow(da);
    }

    let mut a = a.clone();
    let mut b = b.clone();
    let mut negate = false;
    if da < db {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut da, &mut db);
        if da % 2 == 1 && db % 2 == 1 {
            negate = true;
        }
    }

    let mut g = Polynomial::one();
    let mut h = Polynomial::one();
    loop {
        let delta = da - db;
        if da % 2 == 1 && db % 2 == 1 {
            negate = !negate;
        }
        let r = a.pseudo_remainder(&b, var);
        if r.is_zero() {
            return Polynomial::zero();
        }
        a = b;
        let divisor = g.mul(&h.pow(delta));
        b = exact(&r, &divisor);
        g = a.leading_coeff_wrt(var);
        h = match delta {
            0 => h,
            1 => g.clone(),
            _ => exact(&g.pow(delta), &h.pow(delta - 1)),
        };
        da = a.degree(var);
        db = b.degree(var);
        if db == 0 {
            break;
        }
    }

    let result = if da == 1 {
        b
    } else {
        exact(&b.pow(da), &h.pow(da - 1))
    };
    if negate {
        result.neg()
    } else {
        result
    }
}

/// Discriminant of `p` with respect to `var`:
/// `(-1)^(n(n-1)/2) res(p, p') / lc(p)`.
///
/// Linear and constant polynomials have discriminant one.
pub fn discriminant(p: &Polynomial, var: Var) -> Polynomial {
    let n = p.degree(var);
    if n <= 1 {
        return Polynomial::one();
    }
    let res = resultant(p, &p.derivative(var), var);
    let lc = p.leading_coeff_wrt(var);
    let disc = exact(&res, &lc);
    if (n * (n - 1) / 2) % 2 == 1 {
        disc.neg()
    } else {
        disc
    }
}

fn exact(num: &Polynomial, den: &Polynomial) -> Polynomial {
    let quotient = num.div_exact(den);
    debug_assert!(
        quotient.is_some(),
        "inexact division {} / {} in subresultant PRS",
        num,
        den
    );
    quotient.unwrap_or_else(|| num.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Polynomial {
        Polynomial::from_var(0)
    }

    fn y() -> Polynomial {
        Polynomial::from_var(1)
    }

    #[test]
    fn test_resultant_circle_and_line() {
        // res_x(x^2 + y^2 - 1, x - 2) = y^2 + 3
        let circle = x().pow(2).add(&y().pow(2)).sub(&Polynomial::one());
        let line = x().sub(&Polynomial::from_int(2));
        let r = resultant(&circle, &line, 0);
        assert_eq!(r, y().pow(2).add(&Polynomial::from_int(3)));
    }

    #[test]
    fn test_resultant_common_root() {
        // res_x(x^2 - 1, x - 1) = 0
        let a = x().pow(2).sub(&Polynomial::one());
        let b = x().sub(&Polynomial::one());
        assert!(resultant(&a, &b, 0).is_zero());
    }

    #[test]
    fn test_resultant_univariate_value() {
        // res(x^2 - 2, x^2 - 3) = prod over roots of first of (a^2 - 3) = (2-3)^2 = 1
        let a = x().pow(2).sub(&Polynomial::from_int(2));
        let b = x().pow(2).sub(&Polynomial::from_int(3));
        assert_eq!(resultant(&a, &b, 0), Polynomial::one());
    }

    #[test]
    fn test_resultant_degree_three() {
        let a = x().pow(3).sub(&y());
        let b = x().sub(&y());
        let r = resultant(&a, &b, 0);
        // res(a, b) = (-1)^(3*1) res(b, a) = -a(y) = -(y^3 - y)
        assert_eq!(r, y().pow(3).sub(&y()).neg());
    }

    #[test]
    fn test_discriminant_quadratic() {
        // disc(a x^2 + b x + c) = b^2 - 4ac; for x^2 + y^2 - 1: -4(y^2 - 1)
        let p = x().pow(2).add(&y().pow(2)).sub(&Polynomial::one());
        let d = discriminant(&p, 0);
        let expected = y().pow(2).sub(&Polynomial::one()).scale(&crate::rational::rat(-4));
        assert_eq!(d, expected);
    }
}
