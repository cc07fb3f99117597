//! Sign constraints on polynomials.

use oxcad_math::algebraic::sign_at;
use oxcad_math::{ExactInterval, MathResult, Polynomial, RealAlgebraicNumber, Sign, Var};
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::fmt;

/// The constraint `sign(p) == sign`, or `sign(p) != sign` when negated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    polynomial: Polynomial,
    sign: Sign,
    negated: bool,
}

impl Constraint {
    /// Create a constraint.
    #[must_use]
    pub fn new(polynomial: Polynomial, sign: Sign, negated: bool) -> Self {
        Self {
            polynomial,
            sign,
            negated,
        }
    }

    /// `p = 0`
    #[must_use]
    pub fn eq(p: Polynomial) -> Self {
        Self::new(p, Sign::Zero, false)
    }

    /// `p != 0`
    #[must_use]
    pub fn neq(p: Polynomial) -> Self {
        Self::new(p, Sign::Zero, true)
    }

    /// `p < 0`
    #[must_use]
    pub fn less(p: Polynomial) -> Self {
        Self::new(p, Sign::Negative, false)
    }

    /// `p <= 0`
    #[must_use]
    pub fn leq(p: Polynomial) -> Self {
        Self::new(p, Sign::Positive, true)
    }

    /// `p > 0`
    #[must_use]
    pub fn greater(p: Polynomial) -> Self {
        Self::new(p, Sign::Positive, false)
    }

    /// `p >= 0`
    #[must_use]
    pub fn geq(p: Polynomial) -> Self {
        Self::new(p, Sign::Negative, true)
    }

    /// The constrained polynomial.
    #[inline]
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// The sign that is required (or excluded when negated).
    #[inline]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Check whether the sign is excluded rather than required.
    #[inline]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Variables of the polynomial.
    pub fn variables(&self) -> Vec<Var> {
        self.polynomial.vars()
    }

    /// Check whether the constraint is `p = 0`.
    pub fn is_equation(&self) -> bool {
        self.sign == Sign::Zero && !self.negated
    }

    /// Check whether the solution set is open (`<`, `>` or `!=`).
    pub fn is_strict(&self) -> bool {
        (self.sign == Sign::Zero) == self.negated
    }

    /// Check whether a polynomial sign meets the constraint.
    #[inline]
    pub fn admits(&self, sign: Sign) -> bool {
        (sign == self.sign) != self.negated
    }

    /// Evaluate at a point assigning every variable of the polynomial.
    pub fn satisfied_by(&self, assignment: &FxHashMap<Var, RealAlgebraicNumber>) -> MathResult<bool> {
        Ok(self.admits(sign_at(&self.polynomial, assignment)?))
    }

    /// Check by interval arithmetic whether the constraint may hold somewhere
    /// in `domain`. Unlisted variables range over the whole line.
    ///
    /// A `false` answer is definite.
    pub fn possibly_satisfied_on(&self, domain: &FxHashMap<Var, ExactInterval>) -> bool {
        let mut domain = domain.clone();
        for var in self.polynomial.vars() {
            domain.entry(var).or_insert_with(ExactInterval::unbounded);
        }
        let value = ExactInterval::evaluate(&self.polynomial, &domain);
        if value.is_empty() {
            return false;
        }
        let zero = BigRational::zero();
        let possible = [
            (Sign::Negative, ExactInterval::less_than(zero.clone())),
            (Sign::Zero, ExactInterval::point(zero.clone())),
            (Sign::Positive, ExactInterval::greater_than(zero)),
        ];
        possible
            .iter()
            .any(|(s, part)| self.admits(*s) && !value.intersect(part).is_empty())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rel = match (self.sign, self.negated) {
            (Sign::Zero, false) => "=",
            (Sign::Zero, true) => "!=",
            (Sign::Negative, false) => "<",
            (Sign::Negative, true) => ">=",
            (Sign::Positive, false) => ">",
            (Sign::Positive, true) => "<=",
        };
        write!(f, "{} {} 0", self.polynomial, rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxcad_math::rational::{frac, rat};

    fn circle() -> Polynomial {
        Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])])
    }

    #[test]
    fn test_relations() {
        assert!(Constraint::leq(circle()).admits(Sign::Zero));
        assert!(Constraint::leq(circle()).admits(Sign::Negative));
        assert!(!Constraint::leq(circle()).admits(Sign::Positive));
        assert!(Constraint::neq(circle()).admits(Sign::Positive));
        assert!(!Constraint::geq(circle()).admits(Sign::Negative));

        assert!(Constraint::less(circle()).is_strict());
        assert!(Constraint::neq(circle()).is_strict());
        assert!(!Constraint::geq(circle()).is_strict());
        assert!(Constraint::eq(circle()).is_equation());
        assert_eq!(Constraint::leq(circle()).variables(), vec![0, 1]);
    }

    #[test]
    fn test_satisfied_by_point() {
        let mut a = FxHashMap::default();
        a.insert(0, RealAlgebraicNumber::from_rational(frac(1, 2)));
        a.insert(1, RealAlgebraicNumber::from_rational(rat(0)));
        assert!(Constraint::less(circle()).satisfied_by(&a).unwrap());
        assert!(!Constraint::eq(circle()).satisfied_by(&a).unwrap());
        a.remove(&1);
        assert!(Constraint::less(circle()).satisfied_by(&a).is_err());
    }

    #[test]
    fn test_interval_presolve() {
        // x^2 + y^2 - 1 <= 0 is impossible for x in [2, 3]
        let mut domain = FxHashMap::default();
        domain.insert(0, ExactInterval::closed(rat(2), rat(3)));
        assert!(!Constraint::leq(circle()).possibly_satisfied_on(&domain));
        assert!(Constraint::greater(circle()).possibly_satisfied_on(&domain));

        domain.insert(0, ExactInterval::closed(rat(0), rat(1)));
        assert!(Constraint::leq(circle()).possibly_satisfied_on(&domain));
    }

    #[test]
    fn test_display() {
        let c = Constraint::leq(Polynomial::from_var(0));
        assert!(c.to_string().ends_with("<= 0"));
    }
}
