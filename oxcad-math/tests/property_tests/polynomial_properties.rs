//! Property-based tests for polynomial arithmetic

use num_bigint::BigInt;
use num_rational::BigRational;
use oxcad_math::polynomial::gcd::gcd;
use oxcad_math::polynomial::resultant::resultant;
use oxcad_math::polynomial::*;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn coeff_strategy() -> impl Strategy<Value = i64> {
    -5i64..=5i64
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// x - a
fn linear(var: Var, a: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(1, &[(var, 1)]), (-a, &[])])
}

/// Small bivariate polynomial c0 + c1 x + c2 y + c3 x y + c4 x^2
fn bivariate(c: &[i64]) -> Polynomial {
    Polynomial::from_coeffs_int(&[
        (c[0], &[]),
        (c[1], &[(0, 1)]),
        (c[2], &[(1, 1)]),
        (c[3], &[(0, 1), (1, 1)]),
        (c[4], &[(0, 2)]),
    ])
}

proptest! {
    #[test]
    fn mul_is_commutative(
        a in prop::collection::vec(coeff_strategy(), 5),
        b in prop::collection::vec(coeff_strategy(), 5)
    ) {
        let p = bivariate(&a);
        let q = bivariate(&b);
        prop_assert_eq!(p.mul(&q), q.mul(&p));
    }

    #[test]
    fn exact_division_recovers_factor(
        a in prop::collection::vec(coeff_strategy(), 5),
        b in prop::collection::vec(coeff_strategy(), 5)
    ) {
        let p = bivariate(&a);
        let q = bivariate(&b);
        prop_assume!(!q.is_zero());
        prop_assert_eq!(p.mul(&q).div_exact(&q), Some(p));
    }

    #[test]
    fn evaluation_is_a_ring_homomorphism(
        a in prop::collection::vec(coeff_strategy(), 5),
        b in prop::collection::vec(coeff_strategy(), 5),
        x in coeff_strategy(),
        y in coeff_strategy()
    ) {
        let p = bivariate(&a);
        let q = bivariate(&b);
        let mut point = FxHashMap::default();
        point.insert(0, rat(x));
        point.insert(1, rat(y));
        let pv = p.eval(&point).unwrap();
        let qv = q.eval(&point).unwrap();
        prop_assert_eq!(p.mul(&q).eval(&point).unwrap(), &pv * &qv);
        prop_assert_eq!(p.add(&q).eval(&point).unwrap(), pv + qv);
    }

    #[test]
    fn resultant_detects_common_roots(a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy()) {
        let p = linear(0, a).mul(&linear(0, b));
        let q = linear(0, c);
        let r = resultant(&p, &q, 0);
        prop_assert_eq!(r.is_zero(), c == a || c == b);
        if !r.is_zero() {
            // res((x-a)(x-b), x-c) = (c-a)(c-b)
            prop_assert_eq!(r.constant_value(), rat((c - a) * (c - b)));
        }
    }

    #[test]
    fn gcd_finds_shared_linear_factor(a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy()) {
        prop_assume!(a != b && a != c && b != c);
        let shared = linear(0, a);
        let p = shared.mul(&linear(0, b));
        let q = shared.mul(&linear(0, c));
        prop_assert_eq!(gcd(&p, &q), shared);
    }

    #[test]
    fn pseudo_remainder_has_lower_degree(
        a in prop::collection::vec(coeff_strategy(), 5),
        b in prop::collection::vec(coeff_strategy(), 5)
    ) {
        let p = bivariate(&a);
        let q = bivariate(&b);
        prop_assume!(q.degree(0) > 0);
        let r = p.pseudo_remainder(&q, 0);
        prop_assert!(r.is_zero() || r.degree(0) < q.degree(0));
    }
}
