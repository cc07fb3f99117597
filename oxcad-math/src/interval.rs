//! Exact Interval Arithmetic
//!
//! Intervals over `BigRational` whose ends are each weak (closed), strict
//! (open) or infinite. They serve as variable bounds for the CAD search and
//! as conservative enclosures of polynomial values over a box.
//!
//! ## Theory
//!
//! For intervals I, J and an operation ⊕ the result encloses
//! { a ⊕ b | a ∈ I, b ∈ J }. Products take the extreme corner products;
//! an end of the result is strict iff it is only approached, never attained:
//! some factor end is strict and neither factor end is an attained zero.

use crate::polynomial::{Polynomial, Var};
use crate::rational::{ceil, floor, midpoint, pow_uint, rat};
use crate::sign::Sign;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;

/// Kind of an interval end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundType {
    /// Open end, the value itself is excluded.
    Strict,
    /// Closed end, the value itself is included.
    Weak,
    /// No bound in this direction.
    Infinity,
}

/// Interval with rational, possibly open or infinite, ends.
///
/// The value stored for an infinite end is zero and never read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactInterval {
    lower: BigRational,
    lower_type: BoundType,
    upper: BigRational,
    upper_type: BoundType,
}

/// An end of an interval on the extended real line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    NegInf,
    Finite { value: BigRational, strict: bool },
    PosInf,
}

impl Endpoint {
    fn finite(value: BigRational, strict: bool) -> Self {
        Endpoint::Finite { value, strict }
    }

    fn neg(&self) -> Self {
        match self {
            Endpoint::NegInf => Endpoint::PosInf,
            Endpoint::PosInf => Endpoint::NegInf,
            Endpoint::Finite { value, strict } => Endpoint::finite(-value, *strict),
        }
    }

    fn sign(&self) -> Sign {
        match self {
            Endpoint::NegInf => Sign::Negative,
            Endpoint::PosInf => Sign::Positive,
            Endpoint::Finite { value, .. } => Sign::of(value),
        }
    }

    fn is_weak_zero(&self) -> bool {
        matches!(self, Endpoint::Finite { value, strict: false } if value.is_zero())
    }

    fn is_strict(&self) -> bool {
        matches!(self, Endpoint::Finite { strict: true, .. })
    }

    fn add(&self, other: &Endpoint) -> Endpoint {
        match (self, other) {
            (Endpoint::Finite { value: a, strict: sa }, Endpoint::Finite { value: b, strict: sb }) => {
                Endpoint::finite(a + b, *sa || *sb)
            }
            (Endpoint::NegInf, _) | (_, Endpoint::NegInf) => Endpoint::NegInf,
            _ => Endpoint::PosInf,
        }
    }

    fn mul(&self, other: &Endpoint) -> Endpoint {
        let strict = (self.is_strict() || other.is_strict())
            && !self.is_weak_zero()
            && !other.is_weak_zero();
        match (self, other) {
            (Endpoint::Finite { value: a, .. }, Endpoint::Finite { value: b, .. }) => {
                Endpoint::finite(a * b, strict)
            }
            _ => match self.sign() * other.sign() {
                Sign::Zero => Endpoint::finite(BigRational::zero(), strict),
                Sign::Positive => Endpoint::PosInf,
                Sign::Negative => Endpoint::NegInf,
            },
        }
    }

    fn pow(&self, n: u32) -> Endpoint {
        match self {
            Endpoint::Finite { value, strict } => Endpoint::finite(pow_uint(value, n), *strict),
            Endpoint::PosInf => Endpoint::PosInf,
            Endpoint::NegInf if n % 2 == 0 => Endpoint::PosInf,
            Endpoint::NegInf => Endpoint::NegInf,
        }
    }

    fn cmp_value(&self, other: &Endpoint) -> Ordering {
        match (self, other) {
            (Endpoint::NegInf, Endpoint::NegInf) | (Endpoint::PosInf, Endpoint::PosInf) => {
                Ordering::Equal
            }
            (Endpoint::NegInf, _) | (_, Endpoint::PosInf) => Ordering::Less,
            (_, Endpoint::NegInf) | (Endpoint::PosInf, _) => Ordering::Greater,
            (Endpoint::Finite { value: a, .. }, Endpoint::Finite { value: b, .. }) => a.cmp(b),
        }
    }

    /// Smaller of two candidate lower ends; ties prefer the closed one.
    fn min(self, other: Endpoint) -> Endpoint {
        match self.cmp_value(&other) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal if self.is_strict() => other,
            Ordering::Equal => self,
        }
    }

    /// Larger of two candidate upper ends; ties prefer the closed one.
    fn max(self, other: Endpoint) -> Endpoint {
        match self.cmp_value(&other) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal if self.is_strict() => other,
            Ordering::Equal => self,
        }
    }
}

impl ExactInterval {
    /// Create an interval from its ends.
    #[must_use]
    pub fn new(
        lower: BigRational,
        lower_type: BoundType,
        upper: BigRational,
        upper_type: BoundType,
    ) -> Self {
        let lower = if lower_type == BoundType::Infinity {
            BigRational::zero()
        } else {
            lower
        };
        let upper = if upper_type == BoundType::Infinity {
            BigRational::zero()
        } else {
            upper
        };
        Self {
            lower,
            lower_type,
            upper,
            upper_type,
        }
    }

    /// The closed interval `[lower, upper]`.
    #[must_use]
    pub fn closed(lower: BigRational, upper: BigRational) -> Self {
        Self::new(lower, BoundType::Weak, upper, BoundType::Weak)
    }

    /// The open interval `(lower, upper)`.
    #[must_use]
    pub fn open(lower: BigRational, upper: BigRational) -> Self {
        Self::new(lower, BoundType::Strict, upper, BoundType::Strict)
    }

    /// The point interval `[value, value]`.
    #[must_use]
    pub fn point(value: BigRational) -> Self {
        Self::closed(value.clone(), value)
    }

    /// The whole real line.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(
            BigRational::zero(),
            BoundType::Infinity,
            BigRational::zero(),
            BoundType::Infinity,
        )
    }

    /// `[value, +inf)`.
    #[must_use]
    pub fn at_least(value: BigRational) -> Self {
        Self::new(value, BoundType::Weak, BigRational::zero(), BoundType::Infinity)
    }

    /// `(-inf, value]`.
    #[must_use]
    pub fn at_most(value: BigRational) -> Self {
        Self::new(BigRational::zero(), BoundType::Infinity, value, BoundType::Weak)
    }

    /// `(value, +inf)`.
    #[must_use]
    pub fn greater_than(value: BigRational) -> Self {
        Self::new(value, BoundType::Strict, BigRational::zero(), BoundType::Infinity)
    }

    /// `(-inf, value)`.
    #[must_use]
    pub fn less_than(value: BigRational) -> Self {
        Self::new(BigRational::zero(), BoundType::Infinity, value, BoundType::Strict)
    }

    /// Lower end, `None` if unbounded below.
    pub fn lower(&self) -> Option<&BigRational> {
        (self.lower_type != BoundType::Infinity).then_some(&self.lower)
    }

    /// Upper end, `None` if unbounded above.
    pub fn upper(&self) -> Option<&BigRational> {
        (self.upper_type != BoundType::Infinity).then_some(&self.upper)
    }

    /// Kind of the lower end.
    #[inline]
    pub fn lower_type(&self) -> BoundType {
        self.lower_type
    }

    /// Kind of the upper end.
    #[inline]
    pub fn upper_type(&self) -> BoundType {
        self.upper_type
    }

    fn lower_endpoint(&self) -> Endpoint {
        match self.lower_type {
            BoundType::Infinity => Endpoint::NegInf,
            t => Endpoint::finite(self.lower.clone(), t == BoundType::Strict),
        }
    }

    fn upper_endpoint(&self) -> Endpoint {
        match self.upper_type {
            BoundType::Infinity => Endpoint::PosInf,
            t => Endpoint::finite(self.upper.clone(), t == BoundType::Strict),
        }
    }

    fn from_endpoints(lower: Endpoint, upper: Endpoint) -> Self {
        let (lower, lower_type) = match lower {
            Endpoint::Finite { value, strict } => (value, strict_type(strict)),
            Endpoint::NegInf | Endpoint::PosInf => (BigRational::zero(), BoundType::Infinity),
        };
        let (upper, upper_type) = match upper {
            Endpoint::Finite { value, strict } => (value, strict_type(strict)),
            Endpoint::NegInf | Endpoint::PosInf => (BigRational::zero(), BoundType::Infinity),
        };
        Self {
            lower,
            lower_type,
            upper,
            upper_type,
        }
    }

    /// Check whether no value lies in the interval.
    pub fn is_empty(&self) -> bool {
        match (self.lower(), self.upper()) {
            (Some(l), Some(u)) => match l.cmp(u) {
                Ordering::Greater => true,
                Ordering::Equal => {
                    self.lower_type == BoundType::Strict || self.upper_type == BoundType::Strict
                }
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// Check whether `value` lies in the interval.
    pub fn contains(&self, value: &BigRational) -> bool {
        let above_lower = match self.lower_type {
            BoundType::Infinity => true,
            BoundType::Weak => value >= &self.lower,
            BoundType::Strict => value > &self.lower,
        };
        let below_upper = match self.upper_type {
            BoundType::Infinity => true,
            BoundType::Weak => value <= &self.upper,
            BoundType::Strict => value < &self.upper,
        };
        above_lower && below_upper
    }

    /// Check whether every value of `self` lies in `other`.
    pub fn is_subset_of(&self, other: &ExactInterval) -> bool {
        if self.is_empty() {
            return true;
        }
        let lower_ok = match (self.lower_endpoint(), other.lower_endpoint()) {
            (_, Endpoint::NegInf) => true,
            (Endpoint::NegInf, _) => false,
            (Endpoint::Finite { value: a, strict: sa }, Endpoint::Finite { value: b, strict: sb }) => {
                a > b || (a == b && (sa || !sb))
            }
            _ => false,
        };
        let upper_ok = match (self.upper_endpoint(), other.upper_endpoint()) {
            (_, Endpoint::PosInf) => true,
            (Endpoint::PosInf, _) => false,
            (Endpoint::Finite { value: a, strict: sa }, Endpoint::Finite { value: b, strict: sb }) => {
                a < b || (a == b && (sa || !sb))
            }
            _ => false,
        };
        lower_ok && upper_ok
    }

    /// Check whether the interval is a single value.
    pub fn is_point(&self) -> bool {
        self.lower_type == BoundType::Weak
            && self.upper_type == BoundType::Weak
            && self.lower == self.upper
    }

    /// Check whether both ends are infinite.
    pub fn is_unbounded(&self) -> bool {
        self.lower_type == BoundType::Infinity && self.upper_type == BoundType::Infinity
    }

    /// Check whether both ends are finite.
    pub fn is_bounded(&self) -> bool {
        self.lower_type != BoundType::Infinity && self.upper_type != BoundType::Infinity
    }

    /// Sign shared by every value of the interval, if there is one.
    pub fn sign(&self) -> Option<Sign> {
        if self.is_empty() {
            return None;
        }
        if let Some(l) = self.lower() {
            if l.is_positive() || (l.is_zero() && self.lower_type == BoundType::Strict) {
                return Some(Sign::Positive);
            }
        }
        if let Some(u) = self.upper() {
            if u.is_negative() || (u.is_zero() && self.upper_type == BoundType::Strict) {
                return Some(Sign::Negative);
            }
        }
        if self.is_point() && self.lower.is_zero() {
            return Some(Sign::Zero);
        }
        None
    }

    /// Check whether zero lies in the interval.
    pub fn contains_zero(&self) -> bool {
        self.contains(&BigRational::zero())
    }

    /// A value in the middle of the interval.
    ///
    /// Half-bounded intervals yield the finite end moved by one, the whole
    /// line yields zero.
    pub fn midpoint(&self) -> BigRational {
        match (self.lower(), self.upper()) {
            (Some(l), Some(u)) => midpoint(l, u),
            (Some(l), None) => l + rat(1),
            (None, Some(u)) => u - rat(1),
            (None, None) => BigRational::zero(),
        }
    }

    /// A simple value in a nonempty interval: zero if possible, otherwise
    /// the integer of least magnitude, otherwise the midpoint.
    pub fn sample(&self) -> BigRational {
        if self.contains_zero() {
            return BigRational::zero();
        }
        let candidate = match self.sign() {
            Some(Sign::Positive) => {
                let mut c = ceil(&self.lower);
                if self.lower_type == BoundType::Strict && BigRational::from_integer(c.clone()) == self.lower {
                    c += BigInt::from(1);
                }
                BigRational::from_integer(c)
            }
            Some(Sign::Negative) => {
                let mut f = floor(&self.upper);
                if self.upper_type == BoundType::Strict && BigRational::from_integer(f.clone()) == self.upper {
                    f -= BigInt::from(1);
                }
                BigRational::from_integer(f)
            }
            _ => return self.midpoint(),
        };
        if self.contains(&candidate) {
            candidate
        } else {
            self.midpoint()
        }
    }

    /// Intersection of two intervals (possibly empty).
    #[must_use]
    pub fn intersect(&self, other: &ExactInterval) -> ExactInterval {
        let (a, b) = (self.lower_endpoint(), other.lower_endpoint());
        let lower = match a.cmp_value(&b) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal if a.is_strict() => a,
            Ordering::Equal => b,
        };
        let (a, b) = (self.upper_endpoint(), other.upper_endpoint());
        let upper = match a.cmp_value(&b) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal if a.is_strict() => a,
            Ordering::Equal => b,
        };
        Self::from_endpoints(lower, upper)
    }

    /// Sum.
    #[must_use]
    pub fn add(&self, other: &ExactInterval) -> ExactInterval {
        Self::from_endpoints(
            self.lower_endpoint().add(&other.lower_endpoint()),
            self.upper_endpoint().add(&other.upper_endpoint()),
        )
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> ExactInterval {
        Self::from_endpoints(self.upper_endpoint().neg(), self.lower_endpoint().neg())
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &ExactInterval) -> ExactInterval {
        self.add(&other.neg())
    }

    /// Product with a rational scalar.
    #[must_use]
    pub fn scale(&self, c: &BigRational) -> ExactInterval {
        if c.is_zero() {
            return Self::point(BigRational::zero());
        }
        let factor = Endpoint::finite(c.clone(), false);
        let a = self.lower_endpoint().mul(&factor);
        let b = self.upper_endpoint().mul(&factor);
        if c.is_positive() {
            Self::from_endpoints(a, b)
        } else {
            Self::from_endpoints(b, a)
        }
    }

    /// Product.
    #[must_use]
    pub fn mul(&self, other: &ExactInterval) -> ExactInterval {
        let (a, b) = (self.lower_endpoint(), self.upper_endpoint());
        let (c, d) = (other.lower_endpoint(), other.upper_endpoint());
        let corners = [a.mul(&c), a.mul(&d), b.mul(&c), b.mul(&d)];
        let lower = corners
            .iter()
            .cloned()
            .reduce(Endpoint::min)
            .unwrap_or(Endpoint::NegInf);
        let upper = corners
            .into_iter()
            .reduce(Endpoint::max)
            .unwrap_or(Endpoint::PosInf);
        Self::from_endpoints(lower, upper)
    }

    /// Power with a non-negative integer exponent. Even powers are tight:
    /// `[-1, 2]^2 = [0, 4]`.
    #[must_use]
    pub fn pow(&self, n: u32) -> ExactInterval {
        if n == 0 {
            return Self::point(rat(1));
        }
        let (lo, hi) = (self.lower_endpoint(), self.upper_endpoint());
        if n % 2 == 1 {
            return Self::from_endpoints(lo.pow(n), hi.pow(n));
        }
        match self.sign() {
            Some(Sign::Negative) => Self::from_endpoints(hi.pow(n), lo.pow(n)),
            _ if lo.sign() != Sign::Negative => Self::from_endpoints(lo.pow(n), hi.pow(n)),
            _ => {
                let top = lo.neg().max(hi).pow(n);
                Self::from_endpoints(Endpoint::finite(BigRational::zero(), false), top)
            }
        }
    }

    /// Enclosure of the values of `poly` over the box `domain`.
    ///
    /// Variables missing from `domain` range over the whole line.
    pub fn evaluate(poly: &Polynomial, domain: &FxHashMap<Var, ExactInterval>) -> ExactInterval {
        let unbounded = Self::unbounded();
        let mut acc = Self::point(BigRational::zero());
        for term in poly.terms() {
            let mut value = Self::point(term.coeff.clone());
            for vp in term.monomial.vars() {
                let range = domain.get(&vp.var).unwrap_or(&unbounded);
                value = value.mul(&range.pow(vp.power));
            }
            acc = acc.add(&value);
        }
        acc
    }
}

fn strict_type(strict: bool) -> BoundType {
    if strict {
        BoundType::Strict
    } else {
        BoundType::Weak
    }
}

impl fmt::Display for ExactInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower_type {
            BoundType::Infinity => write!(f, "(-inf")?,
            BoundType::Strict => write!(f, "({}", self.lower)?,
            BoundType::Weak => write!(f, "[{}", self.lower)?,
        }
        write!(f, ", ")?;
        match self.upper_type {
            BoundType::Infinity => write!(f, "inf)"),
            BoundType::Strict => write!(f, "{})", self.upper),
            BoundType::Weak => write!(f, "{}]", self.upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::frac;

    #[test]
    fn test_contains_and_empty() {
        let i = ExactInterval::new(rat(0), BoundType::Strict, rat(1), BoundType::Weak);
        assert!(!i.contains(&rat(0)));
        assert!(i.contains(&rat(1)));
        assert!(!i.is_empty());
        assert!(ExactInterval::open(rat(1), rat(1)).is_empty());
        assert!(!ExactInterval::point(rat(1)).is_empty());
    }

    #[test]
    fn test_sample_prefers_small_integers() {
        assert_eq!(ExactInterval::open(rat(-3), rat(5)).sample(), rat(0));
        assert_eq!(ExactInterval::open(rat(2), rat(5)).sample(), rat(3));
        assert_eq!(ExactInterval::closed(rat(2), rat(5)).sample(), rat(2));
        assert_eq!(ExactInterval::less_than(rat(-2)).sample(), rat(-3));
        assert_eq!(ExactInterval::open(frac(1, 3), frac(1, 2)).sample(), frac(5, 12));
    }

    #[test]
    fn test_mul_strictness() {
        // (0, 1] * [-1, 2] = [-1, 2]
        let a = ExactInterval::new(rat(0), BoundType::Strict, rat(1), BoundType::Weak);
        let b = ExactInterval::closed(rat(-1), rat(2));
        assert_eq!(a.mul(&b), ExactInterval::closed(rat(-1), rat(2)));
        // (0, 1] * [1, inf) = (0, inf)
        let c = ExactInterval::at_least(rat(1));
        assert_eq!(a.mul(&c), ExactInterval::greater_than(rat(0)));
    }

    #[test]
    fn test_even_power_is_tight() {
        let i = ExactInterval::closed(rat(-1), rat(2));
        assert_eq!(i.pow(2), ExactInterval::closed(rat(0), rat(4)));
        let j = ExactInterval::open(rat(-3), rat(-1));
        assert_eq!(j.pow(2), ExactInterval::open(rat(1), rat(9)));
    }

    #[test]
    fn test_evaluate_sign() {
        // x^2 + y^2 - 1 over x in [2, 2] is at least 3
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let mut domain = FxHashMap::default();
        domain.insert(0, ExactInterval::point(rat(2)));
        let value = ExactInterval::evaluate(&p, &domain);
        assert_eq!(value, ExactInterval::at_least(rat(3)));
        assert_eq!(value.sign(), Some(Sign::Positive));
    }

    #[test]
    fn test_intersect_and_subset() {
        let a = ExactInterval::closed(rat(0), rat(4));
        let b = ExactInterval::open(rat(2), rat(6));
        let c = a.intersect(&b);
        assert_eq!(
            c,
            ExactInterval::new(rat(2), BoundType::Strict, rat(4), BoundType::Weak)
        );
        assert!(c.is_subset_of(&a));
        assert!(c.is_subset_of(&b));
        assert!(!a.is_subset_of(&b));
    }

    #[test]
    fn test_display() {
        let i = ExactInterval::new(rat(0), BoundType::Infinity, rat(3), BoundType::Strict);
        assert_eq!(i.to_string(), "(-inf, 3)");
    }
}
