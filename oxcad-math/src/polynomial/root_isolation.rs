//! Real root isolation for univariate polynomials.
//!
//! Implements algorithms for isolating real roots of polynomials including:
//! - Sturm sequences for exact root counting
//! - Bisection with exact detection of rational roots
//!
//! Every isolated root is either an exact rational or an open interval
//! `(lower, upper)` whose endpoints are not roots and which contains exactly
//! one root of the squarefree input.
//!
//! ## References
//!
//! - Basu, Pollack, Roy: "Algorithms in Real Algebraic Geometry" (2006), §2.2
//! - Z3's `math/polynomial/upolynomial.cpp`

use super::dense::DensePolynomial;
use crate::rational::{midpoint, rat};
use crate::sign::Sign;
use num_rational::BigRational;

/// A single isolated real root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolatedRoot {
    /// The root is exactly this rational.
    Exact(BigRational),
    /// The root is the only one in the open interval `(lower, upper)`.
    Interval {
        /// Lower endpoint (not a root).
        lower: BigRational,
        /// Upper endpoint (not a root).
        upper: BigRational,
    },
}

impl IsolatedRoot {
    /// Lower end of the enclosure.
    pub fn lower(&self) -> &BigRational {
        match self {
            IsolatedRoot::Exact(v) => v,
            IsolatedRoot::Interval { lower, .. } => lower,
        }
    }
}

/// Sturm sequence of a polynomial.
#[derive(Debug, Clone)]
pub struct SturmSequence {
    seq: Vec<DensePolynomial>,
}

impl SturmSequence {
    /// Build the Sturm sequence `p, p', -rem(p, p'), ...`.
    pub fn new(p: &DensePolynomial) -> Self {
        let mut seq = vec![p.clone()];
        if p.degree() == 0 {
            return Self { seq };
        }
        seq.push(p.derivative());
        loop {
            let n = seq.len();
            let r = seq[n - 2].rem(&seq[n - 1]);
            if r.is_zero() {
                break;
            }
            seq.push(r.neg());
        }
        Self { seq }
    }

    /// Number of sign changes at `x`, zeros skipped.
    pub fn variations_at(&self, x: &BigRational) -> usize {
        count_variations(self.seq.iter().map(|p| p.sign_at(x)))
    }

    fn variations_at_neg_inf(&self) -> usize {
        count_variations(self.seq.iter().map(|p| p.sign_at_neg_inf()))
    }

    fn variations_at_pos_inf(&self) -> usize {
        count_variations(self.seq.iter().map(|p| p.sign_at_pos_inf()))
    }

    /// Number of distinct real roots in the half-open interval `(a, b]`.
    pub fn count_roots(&self, a: &BigRational, b: &BigRational) -> usize {
        if a >= b {
            return 0;
        }
        self.variations_at(a).saturating_sub(self.variations_at(b))
    }

    /// Number of distinct real roots.
    pub fn count_all_roots(&self) -> usize {
        self.variations_at_neg_inf()
            .saturating_sub(self.variations_at_pos_inf())
    }
}

fn count_variations(signs: impl Iterator<Item = Sign>) -> usize {
    let mut last = Sign::Zero;
    let mut changes = 0;
    for s in signs {
        if s == Sign::Zero {
            continue;
        }
        if last != Sign::Zero && s != last {
            changes += 1;
        }
        last = s;
    }
    changes
}

/// Count the distinct real roots of `p`.
pub fn count_real_roots(p: &DensePolynomial) -> usize {
    if p.is_constant() {
        return 0;
    }
    SturmSequence::new(&p.square_free()).count_all_roots()
}

/// Isolate all real roots of `p`, in increasing order.
///
/// Multiple roots are reported once. Constant polynomials (including zero)
/// have no isolated roots.
pub fn isolate_real_roots(p: &DensePolynomial) -> Vec<IsolatedRoot> {
    if p.is_constant() {
        return Vec::new();
    }
    let sf = p.square_free();
    if sf.degree() == 1 {
        let c = sf.coeffs();
        return vec![IsolatedRoot::Exact(-&c[0] / &c[1])];
    }
    let sturm = SturmSequence::new(&sf);
    let bound = sf.cauchy_bound();
    let mut roots = Vec::new();
    let mut work = vec![(-bound.clone(), bound)];

    while let Some((a, b)) = work.pop() {
        let n = sturm.count_roots(&a, &b);
        if n == 0 {
            continue;
        }
        if n == 1 {
            roots.push(IsolatedRoot::Interval { lower: a, upper: b });
            continue;
        }
        let m = midpoint(&a, &b);
        if sf.sign_at(&m) != Sign::Zero {
            work.push((a, m.clone()));
            work.push((m, b));
            continue;
        }
        // Exact root at the split point: cut out a root-free neighborhood.
        let mut radius = (&b - &a) / rat(4);
        loop {
            let lo = &m - &radius;
            let hi = &m + &radius;
            if sf.sign_at(&lo) != Sign::Zero
                && sf.sign_at(&hi) != Sign::Zero
                && sturm.count_roots(&lo, &hi) == 1
            {
                work.push((a, lo));
                work.push((hi, b));
                break;
            }
            radius = radius / rat(2);
        }
        roots.push(IsolatedRoot::Exact(m));
    }

    roots.sort_by(|x, y| x.lower().cmp(y.lower()));
    roots
}

/// Refine `(lower, upper)` around the unique root of squarefree `p` by one
/// bisection step. Returns `Some(m)` if the midpoint is the root itself.
pub fn bisect_isolating(
    p: &DensePolynomial,
    lower: &mut BigRational,
    upper: &mut BigRational,
) -> Option<BigRational> {
    let m = midpoint(lower, upper);
    let sm = p.sign_at(&m);
    if sm == Sign::Zero {
        return Some(m);
    }
    if sm == p.sign_at(lower) {
        *lower = m;
    } else {
        *upper = m;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::frac;

    #[test]
    fn test_sturm_count() {
        // x^3 - x has roots -1, 0, 1
        let p = DensePolynomial::from_ints(&[0, -1, 0, 1]);
        let s = SturmSequence::new(&p);
        assert_eq!(s.count_all_roots(), 3);
        assert_eq!(s.count_roots(&frac(-1, 2), &rat(2)), 2);
        // Half-open: the root at the right end is counted
        assert_eq!(s.count_roots(&frac(1, 2), &rat(1)), 1);
    }

    #[test]
    fn test_isolate_sqrt_two() {
        let p = DensePolynomial::from_ints(&[-2, 0, 1]);
        let roots = isolate_real_roots(&p);
        assert_eq!(roots.len(), 2);
        for r in &roots {
            match r {
                IsolatedRoot::Interval { lower, upper } => {
                    assert_ne!(p.sign_at(lower), p.sign_at(upper));
                }
                IsolatedRoot::Exact(_) => panic!("sqrt(2) is irrational"),
            }
        }
        assert!(roots[0].lower() < roots[1].lower());
    }

    #[test]
    fn test_isolate_rational_roots() {
        // (x - 1)(x + 1) x with a double root at 1
        let p = DensePolynomial::from_ints(&[0, -1, 0, 1]).mul(&DensePolynomial::from_ints(&[-1, 1]));
        let roots = isolate_real_roots(&p);
        assert_eq!(roots.len(), 3);
        let sf = p.square_free();
        for r in &roots {
            match r {
                IsolatedRoot::Exact(v) => assert_eq!(sf.sign_at(v), Sign::Zero),
                IsolatedRoot::Interval { lower, upper } => {
                    assert_eq!(SturmSequence::new(&sf).count_roots(lower, upper), 1);
                }
            }
        }
    }

    #[test]
    fn test_no_real_roots() {
        let p = DensePolynomial::from_ints(&[1, 0, 1]);
        assert!(isolate_real_roots(&p).is_empty());
        assert_eq!(count_real_roots(&p), 0);
    }

    #[test]
    fn test_bisect_isolating() {
        let p = DensePolynomial::from_ints(&[-2, 0, 1]);
        let mut lo = rat(1);
        let mut hi = rat(2);
        for _ in 0..10 {
            assert!(bisect_isolating(&p, &mut lo, &mut hi).is_none());
        }
        assert!(&hi - &lo < frac(1, 1000));
        assert!(&lo * &lo < rat(2));
        assert!(&hi * &hi > rat(2));
    }
}
