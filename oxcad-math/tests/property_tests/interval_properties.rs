//! Property-based tests for exact interval arithmetic

use num_bigint::BigInt;
use num_rational::BigRational;
use oxcad_math::interval::{BoundType, ExactInterval};
use oxcad_math::polynomial::Polynomial;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn bound_type() -> impl Strategy<Value = BoundType> {
    prop_oneof![
        Just(BoundType::Strict),
        Just(BoundType::Weak),
        Just(BoundType::Infinity)
    ]
}

/// A nonempty interval together with a value inside it.
fn interval_with_member() -> impl Strategy<Value = (ExactInterval, BigRational)> {
    (-6i64..=6, 0i64..=6, 0i64..=6, bound_type(), bound_type()).prop_map(|(v, dl, du, lt, ut)| {
        let value = rat(v);
        let (lower, lower_type) = match (dl, lt) {
            (0, BoundType::Strict) => (rat(v - 1), BoundType::Strict),
            (d, t) => (rat(v - d), t),
        };
        let (upper, upper_type) = match (du, ut) {
            (0, BoundType::Strict) => (rat(v + 1), BoundType::Strict),
            (d, t) => (rat(v + d), t),
        };
        (ExactInterval::new(lower, lower_type, upper, upper_type), value)
    })
}

proptest! {
    #[test]
    fn arithmetic_encloses_members(
        (i, a) in interval_with_member(),
        (j, b) in interval_with_member()
    ) {
        prop_assert!(i.contains(&a));
        prop_assert!(j.contains(&b));
        prop_assert!(i.add(&j).contains(&(&a + &b)));
        prop_assert!(i.sub(&j).contains(&(&a - &b)));
        prop_assert!(i.mul(&j).contains(&(&a * &b)));
        prop_assert!(i.pow(2).contains(&(&a * &a)));
        prop_assert!(i.pow(3).contains(&(&a * &a * &a)));
    }

    #[test]
    fn sample_lies_inside((i, _) in interval_with_member()) {
        prop_assert!(i.contains(&i.sample()));
        prop_assert!(i.contains(&i.midpoint()));
    }

    #[test]
    fn evaluation_encloses_values(
        (i, a) in interval_with_member(),
        (j, b) in interval_with_member(),
        c in prop::collection::vec(-3i64..=3, 4)
    ) {
        // c0 + c1 x y + c2 x^2 + c3 y^3
        let p = Polynomial::from_coeffs_int(&[
            (c[0], &[]),
            (c[1], &[(0, 1), (1, 1)]),
            (c[2], &[(0, 2)]),
            (c[3], &[(1, 3)]),
        ]);
        let mut domain = FxHashMap::default();
        domain.insert(0, i);
        domain.insert(1, j);
        let mut point = FxHashMap::default();
        point.insert(0, a);
        point.insert(1, b);
        let value = p.eval(&point).unwrap();
        prop_assert!(ExactInterval::evaluate(&p, &domain).contains(&value));
    }

    #[test]
    fn intersection_is_contained_in_both((i, _) in interval_with_member(), (j, _) in interval_with_member()) {
        let k = i.intersect(&j);
        prop_assert!(k.is_subset_of(&i));
        prop_assert!(k.is_subset_of(&j));
    }
}
