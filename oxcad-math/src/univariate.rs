//! Polynomials viewed as univariate in a designated main variable.
//!
//! The CAD projection works level by level: at each level a polynomial is
//! read as a polynomial in that level's variable whose coefficients are
//! polynomials in the remaining variables.

use crate::polynomial::resultant::{discriminant, resultant};
use crate::polynomial::{Polynomial, Var};
use std::fmt;

/// A polynomial together with its main variable.
///
/// Two values are equal iff both the polynomial and the main variable agree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnivariatePolynomial {
    poly: Polynomial,
    main_var: Var,
}

impl UnivariatePolynomial {
    /// View `poly` as univariate in `main_var`.
    pub fn new(poly: Polynomial, main_var: Var) -> Self {
        Self { poly, main_var }
    }

    /// The underlying multivariate polynomial.
    #[inline]
    pub fn polynomial(&self) -> &Polynomial {
        &self.poly
    }

    /// Consume the view.
    pub fn into_polynomial(self) -> Polynomial {
        self.poly
    }

    /// The main variable.
    #[inline]
    pub fn main_var(&self) -> Var {
        self.main_var
    }

    /// Degree in the main variable.
    pub fn degree(&self) -> u32 {
        self.poly.degree(self.main_var)
    }

    /// Coefficients in the main variable, lowest power first.
    pub fn coefficients(&self) -> Vec<Polynomial> {
        self.poly.coefficients(self.main_var)
    }

    /// Leading coefficient in the main variable.
    pub fn leading_coefficient(&self) -> Polynomial {
        self.poly.leading_coeff_wrt(self.main_var)
    }

    /// Check whether the main variable does not occur.
    pub fn is_constant(&self) -> bool {
        !self.poly.has_var(self.main_var)
    }

    /// Check whether no variable occurs at all.
    pub fn is_numeric(&self) -> bool {
        self.poly.is_constant()
    }

    /// Check whether the polynomial is identically zero.
    pub fn is_zero(&self) -> bool {
        self.poly.is_zero()
    }

    /// Resultant with `other` in the common main variable.
    pub fn resultant(&self, other: &UnivariatePolynomial) -> Polynomial {
        debug_assert_eq!(self.main_var, other.main_var);
        resultant(&self.poly, &other.poly, self.main_var)
    }

    /// Discriminant in the main variable.
    pub fn discriminant(&self) -> Polynomial {
        discriminant(&self.poly, self.main_var)
    }

    /// Derivative in the main variable.
    pub fn derivative(&self) -> UnivariatePolynomial {
        Self::new(self.poly.derivative(self.main_var), self.main_var)
    }

    /// The same polynomial with a different main variable.
    #[must_use]
    pub fn switch_main_var(&self, var: Var) -> UnivariatePolynomial {
        Self::new(self.poly.clone(), var)
    }
}

impl fmt::Debug for UnivariatePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [in x{}]", self.poly, self.main_var)
    }
}

impl fmt::Display for UnivariatePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.poly)
    }
}
