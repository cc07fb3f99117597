//! Dense univariate polynomials with rational coefficients.
//!
//! The root isolation and algebraic number code works on this
//! representation: coefficients are stored from the constant term upward and
//! the vector never carries trailing zeros.

use super::{Polynomial, Var};
use crate::rational::rat;
use crate::sign::Sign;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// Dense univariate polynomial, `coeffs[i]` is the coefficient of x^i.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct DensePolynomial {
    coeffs: Vec<BigRational>,
}

impl DensePolynomial {
    /// Create from coefficients (constant term first); trailing zeros are
    /// stripped.
    pub fn new(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Create from integer coefficients (constant term first).
    pub fn from_ints(coeffs: &[i64]) -> Self {
        Self::new(coeffs.iter().map(|&c| rat(c)).collect())
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// A constant polynomial.
    pub fn constant(c: BigRational) -> Self {
        Self::new(vec![c])
    }

    /// Coefficients, constant term first.
    #[inline]
    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// Check if the polynomial is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Check if the polynomial has degree zero (zero included).
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    /// Degree; zero for the zero polynomial.
    #[inline]
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Leading coefficient; zero for the zero polynomial.
    pub fn leading_coeff(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    /// Convert back to a sparse polynomial in `var`.
    pub fn to_polynomial(&self, var: Var) -> Polynomial {
        Polynomial::univariate(var, &self.coeffs)
    }

    /// Evaluate at a rational point (Horner).
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Sign at a rational point.
    pub fn sign_at(&self, x: &BigRational) -> Sign {
        Sign::of(&self.eval(x))
    }

    /// Sign for x tending to +infinity.
    pub fn sign_at_pos_inf(&self) -> Sign {
        Sign::of(&self.leading_coeff())
    }

    /// Sign for x tending to -infinity.
    pub fn sign_at_neg_inf(&self) -> Sign {
        let s = Sign::of(&self.leading_coeff());
        if self.degree() % 2 == 1 {
            -s
        } else {
            s
        }
    }

    /// Formal derivative.
    pub fn derivative(&self) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero();
        }
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * rat(i as i64))
                .collect(),
        )
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, c: &BigRational) -> Self {
        Self::new(self.coeffs.iter().map(|a| a * c).collect())
    }

    /// Product of two polynomials.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(coeffs)
    }

    /// Difference of two polynomials.
    pub fn sub(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        let zero = BigRational::zero();
        Self::new(
            (0..n)
                .map(|i| {
                    self.coeffs.get(i).unwrap_or(&zero) - other.coeffs.get(i).unwrap_or(&zero)
                })
                .collect(),
        )
    }

    /// Euclidean division over the rationals: returns `(quotient, remainder)`.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        debug_assert!(!divisor.is_zero(), "division by the zero polynomial");
        if self.degree() < divisor.degree() || self.is_zero() {
            return (Self::zero(), self.clone());
        }
        let lc = divisor.leading_coeff();
        let dd = divisor.degree();
        let mut rem = self.coeffs.clone();
        let mut quot = vec![BigRational::zero(); self.degree() - dd + 1];
        for k in (0..quot.len()).rev() {
            let factor = &rem[k + dd] / &lc;
            if factor.is_zero() {
                continue;
            }
            for (j, c) in divisor.coeffs.iter().enumerate() {
                rem[k + j] -= &factor * c;
            }
            quot[k] = factor;
        }
        rem.truncate(dd);
        (Self::new(quot), Self::new(rem))
    }

    /// Remainder of Euclidean division.
    pub fn rem(&self, divisor: &Self) -> Self {
        self.div_rem(divisor).1
    }

    /// Exact quotient, if `divisor` divides `self`.
    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor);
        r.is_zero().then_some(q)
    }

    /// Monic associate (zero stays zero).
    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let lc = self.leading_coeff();
        self.scale(&lc.recip())
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let r = a.rem(&b);
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Squarefree part `p / gcd(p, p')`, monic.
    pub fn square_free(&self) -> Self {
        if self.degree() <= 1 {
            return self.monic();
        }
        let g = self.gcd(&self.derivative());
        match self.div_exact(&g) {
            Some(q) => q.monic(),
            None => self.monic(),
        }
    }

    /// Divide out the factor x (requires a zero constant term).
    pub fn deflate(&self) -> Self {
        debug_assert!(self.coeffs.first().map_or(true, |c| c.is_zero()));
        if self.coeffs.is_empty() {
            return Self::zero();
        }
        Self::new(self.coeffs[1..].to_vec())
    }

    /// Reversed coefficients: `x^n p(1/x)`.
    pub fn reverse(&self) -> Self {
        let mut coeffs = self.coeffs.clone();
        coeffs.reverse();
        Self::new(coeffs)
    }

    /// Strict Cauchy bound: every complex root `z` satisfies `|z| < bound`.
    pub fn cauchy_bound(&self) -> BigRational {
        if self.degree() == 0 {
            return BigRational::one();
        }
        let lc = self.leading_coeff().abs();
        let max_ratio = self.coeffs[..self.degree()]
            .iter()
            .map(|c| c.abs() / &lc)
            .fold(BigRational::zero(), |m, r| if r > m { r } else { m });
        max_ratio + rat(2)
    }

    /// Lower bound `d > 0` with `|z| > d` for every nonzero root `z`.
    pub fn nonzero_root_lower_bound(&self) -> BigRational {
        let mut p = self.clone();
        while p.coeffs.first().is_some_and(|c| c.is_zero()) {
            p = p.deflate();
        }
        p.reverse().cauchy_bound().recip()
    }
}

impl fmt::Debug for DensePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DensePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_polynomial(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::frac;

    #[test]
    fn test_div_rem() {
        // (x^3 - 1) / (x - 1) = x^2 + x + 1
        let a = DensePolynomial::from_ints(&[-1, 0, 0, 1]);
        let b = DensePolynomial::from_ints(&[-1, 1]);
        let (q, r) = a.div_rem(&b);
        assert_eq!(q, DensePolynomial::from_ints(&[1, 1, 1]));
        assert!(r.is_zero());
    }

    #[test]
    fn test_gcd_and_square_free() {
        // (x - 1)^2 (x + 2)
        let p = DensePolynomial::from_ints(&[-1, 1])
            .mul(&DensePolynomial::from_ints(&[-1, 1]))
            .mul(&DensePolynomial::from_ints(&[2, 1]));
        let sf = p.square_free();
        assert_eq!(sf, DensePolynomial::from_ints(&[-2, 1, 1]));
        let g = p.gcd(&DensePolynomial::from_ints(&[-1, 1]));
        assert_eq!(g, DensePolynomial::from_ints(&[-1, 1]));
    }

    #[test]
    fn test_cauchy_bound_is_strict() {
        let p = DensePolynomial::from_ints(&[-6, 1, 1]); // roots 2, -3
        let b = p.cauchy_bound();
        assert!(b > rat(3));
    }

    #[test]
    fn test_nonzero_root_lower_bound() {
        // x (x - 1/2): nonzero root 1/2
        let p = DensePolynomial::new(vec![rat(0), frac(-1, 2), rat(1)]);
        let d = p.nonzero_root_lower_bound();
        assert!(d > rat(0));
        assert!(d < frac(1, 2));
    }

    #[test]
    fn test_sign_at_infinity() {
        let p = DensePolynomial::from_ints(&[0, 0, 0, -1]);
        assert_eq!(p.sign_at_pos_inf(), Sign::Negative);
        assert_eq!(p.sign_at_neg_inf(), Sign::Positive);
    }
}
