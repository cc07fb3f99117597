//! Property-based tests for root isolation and algebraic numbers

use num_bigint::BigInt;
use num_rational::BigRational;
use oxcad_math::algebraic::{real_roots, RealAlgebraicNumber};
use oxcad_math::polynomial::root_isolation::{count_real_roots, isolate_real_roots, IsolatedRoot};
use oxcad_math::polynomial::{DensePolynomial, Polynomial};
use oxcad_math::sign::Sign;
use proptest::prelude::*;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// (x - r_1) ... (x - r_k)
fn from_roots(roots: &[i64]) -> DensePolynomial {
    roots.iter().fold(DensePolynomial::from_ints(&[1]), |acc, &r| {
        acc.mul(&DensePolynomial::from_ints(&[-r, 1]))
    })
}

proptest! {
    #[test]
    fn isolates_every_distinct_root(roots in prop::collection::vec(-6i64..=6i64, 1..5)) {
        let p = from_roots(&roots);
        let mut distinct = roots.clone();
        distinct.sort_unstable();
        distinct.dedup();

        let isolated = isolate_real_roots(&p);
        prop_assert_eq!(isolated.len(), distinct.len());
        prop_assert_eq!(count_real_roots(&p), distinct.len());
        for (iso, r) in isolated.iter().zip(distinct.iter()) {
            match iso {
                IsolatedRoot::Exact(v) => prop_assert_eq!(v, &rat(*r)),
                IsolatedRoot::Interval { lower, upper } => {
                    prop_assert!(lower < &rat(*r) && &rat(*r) < upper);
                }
            }
        }
    }

    #[test]
    fn square_roots_compare_like_squares(n in 2i64..50, a in 0i64..60, b in 1i64..8) {
        // sqrt(n) against the rational a / b
        let p = DensePolynomial::from_ints(&[-n, 0, 1]);
        let positive: Vec<_> = isolate_real_roots(&p)
            .into_iter()
            .filter(|r| r.lower() >= &rat(0))
            .collect();
        prop_assert_eq!(positive.len(), 1);
        let root = match &positive[0] {
            IsolatedRoot::Exact(v) => RealAlgebraicNumber::from_rational(v.clone()),
            IsolatedRoot::Interval { lower, upper } => {
                RealAlgebraicNumber::from_isolating(&p, lower.clone(), upper.clone()).unwrap()
            }
        };
        let q = BigRational::new(BigInt::from(a), BigInt::from(b));
        let expected = rat(n).cmp(&(&q * &q));
        prop_assert_eq!(root.cmp_rational(&q), expected);
    }

    #[test]
    fn roots_satisfy_the_polynomial(x in -4i64..=4i64, c in -6i64..=6i64) {
        // y^2 - x y + c at a rational x
        let p = Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (-1, &[(0, 1), (1, 1)]), (c, &[])]);
        let mut point = FxHashMap::default();
        point.insert(0, RealAlgebraicNumber::from_rational(rat(x)));
        let roots = real_roots(&p, 1, &point, None).unwrap().into_roots();
        let disc = x * x - 4 * c;
        let expected = match disc.cmp(&0) {
            Ordering::Less => 0,
            Ordering::Equal => 1,
            Ordering::Greater => 2,
        };
        prop_assert_eq!(roots.len(), expected);
        for w in roots.windows(2) {
            prop_assert_eq!(w[0].cmp_value(&w[1]), Ordering::Less);
        }
        for r in roots {
            let mut full = point.clone();
            full.insert(1, r);
            prop_assert_eq!(oxcad_math::algebraic::sign_at(&p, &full).unwrap(), Sign::Zero);
        }
    }
}
