//! Property-based tests for the answers of `Cad::check`

use oxcad::{Cad, CadSettings, CheckRequest, Constraint, ExactInterval, Polynomial, RealAlgebraicPoint};
use oxcad_math::rational::{frac, rat};
use oxcad_math::RealAlgebraicNumber;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

type Terms = Vec<(i64, u32, u32)>;

/// Sum of c x^i y^j.
fn build(terms: &Terms) -> Polynomial {
    let powers: Vec<(i64, Vec<(u32, u32)>)> = terms
        .iter()
        .map(|&(c, i, j)| {
            let mut vp = Vec::new();
            if i > 0 {
                vp.push((0, i));
            }
            if j > 0 {
                vp.push((1, j));
            }
            (c, vp)
        })
        .collect();
    let refs: Vec<(i64, &[(u32, u32)])> = powers.iter().map(|(c, vp)| (*c, vp.as_slice())).collect();
    Polynomial::from_coeffs_int(&refs)
}

/// Sum of c x^i y^j z^k.
fn build_trivariate(terms: &[(i64, u32, u32, u32)]) -> Polynomial {
    let powers: Vec<(i64, Vec<(u32, u32)>)> = terms
        .iter()
        .map(|&(c, i, j, k)| {
            let vp: Vec<(u32, u32)> = [(0, i), (1, j), (2, k)]
                .into_iter()
                .filter(|&(_, e)| e > 0)
                .collect();
            (c, vp)
        })
        .collect();
    let refs: Vec<(i64, &[(u32, u32)])> = powers.iter().map(|(c, vp)| (*c, vp.as_slice())).collect();
    Polynomial::from_coeffs_int(&refs)
}

fn relate(p: Polynomial, rel: u8) -> Constraint {
    match rel % 6 {
        0 => Constraint::eq(p),
        1 => Constraint::neq(p),
        2 => Constraint::less(p),
        3 => Constraint::leq(p),
        4 => Constraint::greater(p),
        _ => Constraint::geq(p),
    }
}

fn bivariate_terms() -> impl Strategy<Value = Terms> {
    prop::collection::vec((-3i64..=3, 0u32..=2, 0u32..=1), 1..4)
}

fn univariate_terms() -> impl Strategy<Value = Terms> {
    prop::collection::vec((-4i64..=4, 0u32..=3, Just(0u32)), 1..4)
}

/// Multilinear polynomials in x, y and z plus an optional square in z.
fn trivariate_terms() -> impl Strategy<Value = Vec<(i64, u32, u32, u32)>> {
    prop::collection::vec((-2i64..=2, 0u32..=1, 0u32..=1, 0u32..=2), 1..4)
}

fn constraints_from(cases: &[(Terms, u8)]) -> Vec<Constraint> {
    cases.iter().map(|(t, rel)| relate(build(t), *rel)).collect()
}

fn satisfied_at(constraints: &[Constraint], x: &RealAlgebraicNumber) -> bool {
    let mut assignment = FxHashMap::default();
    assignment.insert(0, x.clone());
    constraints.iter().all(|c| c.satisfied_by(&assignment).unwrap_or(false))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn witness_satisfies_every_constraint(
        cases in prop::collection::vec((bivariate_terms(), any::<u8>()), 1..3),
        preset in any::<bool>(),
    ) {
        let constraints = constraints_from(&cases);
        let settings = if preset { CadSettings::default() } else { CadSettings::base() };
        let mut cad = Cad::new(settings);
        let mut point = RealAlgebraicPoint::empty();
        if cad.check(&constraints, &mut point, CheckRequest::new()).unwrap() {
            prop_assert_eq!(point.dim(), cad.dimension());
            let assignment = point.to_assignment(cad.variables());
            for c in &constraints {
                prop_assert!(c.satisfied_by(&assignment).unwrap());
            }
        }
    }

    #[test]
    fn unsat_has_no_rational_point(
        cases in prop::collection::vec((univariate_terms(), any::<u8>()), 1..3),
    ) {
        let constraints = constraints_from(&cases);
        let mut cad = Cad::new(CadSettings::base());
        let mut point = RealAlgebraicPoint::empty();
        let sat = cad.check(&constraints, &mut point, CheckRequest::new()).unwrap();
        if !sat {
            for n in -16i64..=16 {
                let x = RealAlgebraicNumber::from_rational(frac(n, 2));
                prop_assert!(!satisfied_at(&constraints, &x));
            }
        }
    }

    #[test]
    fn recheck_gives_same_answer(
        cases in prop::collection::vec((bivariate_terms(), any::<u8>()), 1..3),
    ) {
        let constraints = constraints_from(&cases);
        let mut cad = Cad::new(CadSettings::default());
        let mut point = RealAlgebraicPoint::empty();
        let first = cad.check(&constraints, &mut point, CheckRequest::new()).unwrap();
        let second = cad.check(&constraints, &mut point, CheckRequest::new()).unwrap();
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn trivariate_witness_satisfies_every_constraint(
        cases in prop::collection::vec((trivariate_terms(), any::<u8>()), 1..3),
    ) {
        let constraints: Vec<Constraint> = cases
            .iter()
            .map(|(t, rel)| relate(build_trivariate(t), *rel))
            .collect();
        let mut cad = Cad::new(CadSettings::default());
        let mut point = RealAlgebraicPoint::empty();
        let sat = cad.check(&constraints, &mut point, CheckRequest::new()).unwrap();
        if sat {
            let assignment = point.to_assignment(cad.variables());
            for c in &constraints {
                prop_assert!(c.satisfied_by(&assignment).unwrap());
            }
        } else {
            // every corner of a small grid violates some constraint
            for corner in 0..27i64 {
                let mut a = FxHashMap::default();
                for (v, digit) in [(0u32, corner % 3), (1, corner / 3 % 3), (2, corner / 9)] {
                    a.insert(v, RealAlgebraicNumber::from_rational(frac(digit - 1, 1)));
                }
                prop_assert!(!constraints.iter().all(|c| c.satisfied_by(&a).unwrap_or(false)));
            }
        }
    }

    #[test]
    fn bounds_follow_new_variable(
        cases in prop::collection::vec((bivariate_terms(), any::<u8>()), 1..3),
    ) {
        let constraints = constraints_from(&cases);
        let original = ExactInterval::closed(rat(-2), rat(2));
        let mut cad = Cad::new(CadSettings::default());
        cad.schedule(&[], &[0]);
        cad.prepare_elimination();
        let mut bounds = cad.bounds_for(&[(0, original.clone())]).unwrap();
        let mut point = RealAlgebraicPoint::empty();
        let sat = cad
            .check(&constraints, &mut point, CheckRequest::new().with_bounds(&mut bounds))
            .unwrap();
        let level = cad.level_of(0).unwrap();
        prop_assert!(bounds.contains_key(&level));
        prop_assert!(bounds[&level].is_subset_of(&original));
        if sat {
            let assignment = point.to_assignment(cad.variables());
            prop_assert!(assignment[&0].is_in(&original));
            for c in &constraints {
                prop_assert!(c.satisfied_by(&assignment).unwrap());
            }
        } else {
            // no grid point with x0 inside the bound satisfies all constraints
            for i in -4i64..=4 {
                for j in -4i64..=4 {
                    let mut a = FxHashMap::default();
                    a.insert(0, RealAlgebraicNumber::from_rational(frac(i, 2)));
                    a.insert(1, RealAlgebraicNumber::from_rational(frac(j, 2)));
                    prop_assert!(!constraints.iter().all(|c| c.satisfied_by(&a).unwrap_or(false)));
                }
            }
        }
    }
}
