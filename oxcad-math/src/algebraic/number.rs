//! Real Algebraic Number Representation.
//!
//! A real algebraic number is either an explicit rational or the unique root
//! of a squarefree polynomial inside an open isolating interval:
//!
//! ```text
//! α = (p(x), (a, b)) where p(α) = 0, p(a) != 0, p(b) != 0 and
//! p has no other root in (a, b)
//! ```
//!
//! Refinement bisects the interval; if a bisection point turns out to be
//! the root, the number is upgraded to its exact rational value.
//!
//! ## References
//!
//! - "Algorithms in Real Algebraic Geometry" (Basu et al., 2006)
//! - Z3's `math/polynomial/algebraic_numbers.h`

use crate::error::{MathError, MathResult};
use crate::interval::{BoundType, ExactInterval};
use crate::polynomial::root_isolation::{bisect_isolating, SturmSequence};
use crate::polynomial::DensePolynomial;
use crate::rational::midpoint;
use crate::sign::Sign;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Open interval isolating a single root of a squarefree polynomial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsolatingInterval {
    polynomial: DensePolynomial,
    lower: BigRational,
    upper: BigRational,
    lower_sign: Sign,
}

impl IsolatingInterval {
    /// Defining polynomial (squarefree).
    #[inline]
    pub fn polynomial(&self) -> &DensePolynomial {
        &self.polynomial
    }

    /// Lower end (not a root).
    #[inline]
    pub fn lower(&self) -> &BigRational {
        &self.lower
    }

    /// Upper end (not a root).
    #[inline]
    pub fn upper(&self) -> &BigRational {
        &self.upper
    }

    /// Width of the interval.
    pub fn width(&self) -> BigRational {
        &self.upper - &self.lower
    }

    /// Number of roots of `q` strictly inside the interval.
    pub fn count_roots_of(&self, q: &DensePolynomial) -> usize {
        roots_in_open_interval(q, &self.lower, &self.upper)
    }
}

fn roots_in_open_interval(q: &DensePolynomial, lower: &BigRational, upper: &BigRational) -> usize {
    if q.is_constant() {
        return 0;
    }
    let sturm = SturmSequence::new(&q.square_free());
    let n = sturm.count_roots(lower, upper);
    if q.sign_at(upper) == Sign::Zero {
        n.saturating_sub(1)
    } else {
        n
    }
}

/// Representation of a real algebraic number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RanValue {
    /// Exact rational value.
    Numeric(BigRational),
    /// Root isolated by an interval.
    Interval(IsolatingInterval),
}

/// A real algebraic number, tagged with whether it was produced as a root
/// of some polynomial during lifting.
///
/// Equality and ordering compare values only; the tag is ignored.
#[derive(Debug, Clone)]
pub struct RealAlgebraicNumber {
    value: RanValue,
    is_root: bool,
}

impl RealAlgebraicNumber {
    /// A rational number, not a root.
    #[must_use]
    pub fn from_rational(value: BigRational) -> Self {
        Self {
            value: RanValue::Numeric(value),
            is_root: false,
        }
    }

    /// A rational number with an explicit root tag.
    #[must_use]
    pub fn from_rational_root(value: BigRational, is_root: bool) -> Self {
        Self {
            value: RanValue::Numeric(value),
            is_root,
        }
    }

    /// The unique root of `polynomial` in the open interval `(lower, upper)`.
    ///
    /// The polynomial is made squarefree. Linear polynomials yield their
    /// rational root directly.
    pub fn from_isolating(
        polynomial: &DensePolynomial,
        lower: BigRational,
        upper: BigRational,
    ) -> MathResult<Self> {
        if polynomial.is_zero() {
            return Err(MathError::ZeroPolynomial);
        }
        let p = polynomial.square_free();
        let lower_sign = p.sign_at(&lower);
        let upper_sign = p.sign_at(&upper);
        let isolating = lower < upper
            && lower_sign != Sign::Zero
            && upper_sign != Sign::Zero
            && SturmSequence::new(&p).count_roots(&lower, &upper) == 1;
        if !isolating {
            return Err(MathError::NonIsolatingInterval {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
        if p.degree() == 1 {
            let c = p.coeffs();
            return Ok(Self::from_rational(-&c[0] / &c[1]));
        }
        Ok(Self {
            value: RanValue::Interval(IsolatingInterval {
                polynomial: p,
                lower,
                upper,
                lower_sign,
            }),
            is_root: false,
        })
    }

    /// Check whether the value is an explicit rational.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, RanValue::Numeric(_))
    }

    /// Check whether the number was produced as a polynomial root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Tag the number as a root. Never reverted.
    pub fn mark_root(&mut self) {
        self.is_root = true;
    }

    /// Representation of the value.
    #[inline]
    pub fn value(&self) -> &RanValue {
        &self.value
    }

    /// The rational value, if the number is numeric.
    pub fn numeric_value(&self) -> Option<&BigRational> {
        match &self.value {
            RanValue::Numeric(v) => Some(v),
            RanValue::Interval(_) => None,
        }
    }

    /// The isolating interval, if the number is interval-represented.
    pub fn isolating_interval(&self) -> Option<&IsolatingInterval> {
        match &self.value {
            RanValue::Numeric(_) => None,
            RanValue::Interval(i) => Some(i),
        }
    }

    /// Enclosure of the value: a point for numbers, the open isolating
    /// interval otherwise.
    pub fn interval(&self) -> ExactInterval {
        match &self.value {
            RanValue::Numeric(v) => ExactInterval::point(v.clone()),
            RanValue::Interval(i) => ExactInterval::open(i.lower.clone(), i.upper.clone()),
        }
    }

    /// Halve the isolating interval. Returns true if the value became
    /// numeric. Numeric values are left untouched.
    pub fn refine(&mut self) -> bool {
        let exact = match &mut self.value {
            RanValue::Numeric(_) => return false,
            RanValue::Interval(i) => bisect_isolating(&i.polynomial, &mut i.lower, &mut i.upper),
        };
        match exact {
            Some(v) => {
                self.value = RanValue::Numeric(v);
                true
            }
            None => false,
        }
    }

    /// Refine until the enclosure is narrower than `width` or the value is
    /// numeric.
    pub fn refine_to_width(&mut self, width: &BigRational) {
        while let RanValue::Interval(i) = &self.value {
            if &i.width() < width {
                break;
            }
            self.refine();
        }
    }

    /// Compare with a rational.
    pub fn cmp_rational(&self, q: &BigRational) -> Ordering {
        match &self.value {
            RanValue::Numeric(v) => v.cmp(q),
            RanValue::Interval(i) => {
                if q <= &i.lower {
                    return Ordering::Greater;
                }
                if q >= &i.upper {
                    return Ordering::Less;
                }
                match i.polynomial.sign_at(q) {
                    Sign::Zero => Ordering::Equal,
                    s if s == i.lower_sign => Ordering::Greater,
                    _ => Ordering::Less,
                }
            }
        }
    }

    /// Compare two numbers by value.
    ///
    /// Overlapping isolating intervals are resolved by testing for a common
    /// root in the overlap and otherwise refining copies until they separate.
    pub fn cmp_value(&self, other: &RealAlgebraicNumber) -> Ordering {
        let (a, b) = match (&self.value, &other.value) {
            (RanValue::Numeric(v), _) => return other.cmp_rational(v).reverse(),
            (_, RanValue::Numeric(v)) => return self.cmp_rational(v),
            (RanValue::Interval(a), RanValue::Interval(b)) => (a, b),
        };
        if a.upper <= b.lower {
            return Ordering::Less;
        }
        if b.upper <= a.lower {
            return Ordering::Greater;
        }
        if a.polynomial == b.polynomial && a.lower == b.lower && a.upper == b.upper {
            return Ordering::Equal;
        }
        let common = a.polynomial.gcd(&b.polynomial);
        let lower = a.lower.clone().max(b.lower.clone());
        let upper = a.upper.clone().min(b.upper.clone());
        if roots_in_open_interval(&common, &lower, &upper) > 0 {
            return Ordering::Equal;
        }

        let mut x = self.clone();
        let mut y = other.clone();
        loop {
            x.refine();
            y.refine();
            match (&x.value, &y.value) {
                (RanValue::Interval(a), RanValue::Interval(b)) => {
                    if a.upper <= b.lower {
                        return Ordering::Less;
                    }
                    if b.upper <= a.lower {
                        return Ordering::Greater;
                    }
                }
                _ => return x.cmp_value(&y),
            }
        }
    }

    /// Check whether the value lies in `interval`.
    pub fn is_in(&self, interval: &ExactInterval) -> bool {
        let above = match (interval.lower_type(), interval.lower()) {
            (BoundType::Weak, Some(l)) => self.cmp_rational(l) != Ordering::Less,
            (BoundType::Strict, Some(l)) => self.cmp_rational(l) == Ordering::Greater,
            _ => true,
        };
        let below = match (interval.upper_type(), interval.upper()) {
            (BoundType::Weak, Some(u)) => self.cmp_rational(u) != Ordering::Greater,
            (BoundType::Strict, Some(u)) => self.cmp_rational(u) == Ordering::Less,
            _ => true,
        };
        above && below
    }

    /// Sign of the value.
    pub fn sign(&self) -> Sign {
        match &self.value {
            RanValue::Numeric(v) => Sign::of(v),
            RanValue::Interval(_) => match self.cmp_rational(&BigRational::zero()) {
                Ordering::Less => Sign::Negative,
                Ordering::Equal => Sign::Zero,
                Ordering::Greater => Sign::Positive,
            },
        }
    }

    /// Floating-point approximation.
    pub fn to_f64(&self) -> f64 {
        match &self.value {
            RanValue::Numeric(v) => v.to_f64().unwrap_or(f64::NAN),
            RanValue::Interval(i) => {
                let mut x = self.clone();
                let eps = i.width().abs() / BigRational::from_integer(1_000_000_000_000i64.into());
                x.refine_to_width(&eps);
                match &x.value {
                    RanValue::Numeric(v) => v.to_f64().unwrap_or(f64::NAN),
                    RanValue::Interval(j) => midpoint(&j.lower, &j.upper).to_f64().unwrap_or(f64::NAN),
                }
            }
        }
    }
}

impl PartialEq for RealAlgebraicNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl Eq for RealAlgebraicNumber {}

impl PartialOrd for RealAlgebraicNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RealAlgebraicNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl fmt::Display for RealAlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RanValue::Numeric(v) => write!(f, "{}", v)?,
            RanValue::Interval(i) => write!(
                f,
                "root of {} in ({}, {})",
                i.polynomial, i.lower, i.upper
            )?,
        }
        if self.is_root {
            write!(f, " R")?;
        }
        Ok(())
    }
}
