//! Property-based tests for structural invariants across incremental use

use oxcad::{Cad, CadSettings, CheckRequest, Constraint, Polynomial, RealAlgebraicPoint};
use proptest::prelude::*;

fn build(terms: &[(i64, u32, u32)]) -> Polynomial {
    let powers: Vec<(i64, Vec<(u32, u32)>)> = terms
        .iter()
        .map(|&(c, i, j)| {
            let vp: Vec<(u32, u32)> = [(0, i), (1, j)].into_iter().filter(|&(_, e)| e > 0).collect();
            (c, vp)
        })
        .collect();
    let refs: Vec<(i64, &[(u32, u32)])> = powers.iter().map(|(c, vp)| (*c, vp.as_slice())).collect();
    Polynomial::from_coeffs_int(&refs)
}

fn polynomial() -> impl Strategy<Value = Polynomial> {
    prop::collection::vec((-3i64..=3, 0u32..=2, 0u32..=1), 1..4).prop_map(|t| build(&t))
}

fn assert_consistent(cad: &Cad) -> Result<(), TestCaseError> {
    prop_assert!(cad.tree().is_ordered());
    prop_assert_eq!(cad.levels().len(), cad.dimension());
    for level in cad.levels() {
        prop_assert!(level.check_invariants());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn incremental_checks_keep_invariants(
        polys in prop::collection::vec(polynomial(), 1..4),
    ) {
        let mut cad = Cad::new(CadSettings::base());
        let mut point = RealAlgebraicPoint::empty();
        let mut constraints = Vec::new();
        for p in polys {
            constraints.push(Constraint::leq(p));
            let sat = cad.check(&constraints, &mut point, CheckRequest::new()).unwrap();
            assert_consistent(&cad)?;
            if !sat {
                prop_assert!(cad.is_complete());
            }
        }
    }

    #[test]
    fn removal_restores_projection(
        base in prop::collection::vec(polynomial(), 1..3),
        extra in polynomial(),
    ) {
        prop_assume!(!extra.is_constant());
        let normalized = extra.normalized();
        prop_assume!(base.iter().all(|p| p.normalized() != normalized));

        let mut baseline = Cad::new(CadSettings::base());
        baseline.schedule(&base, &[0, 1]);
        baseline.complete_elimination().unwrap();

        let mut cad = Cad::new(CadSettings::base());
        cad.schedule(&base, &[0, 1]);
        cad.complete_elimination().unwrap();
        cad.schedule(std::slice::from_ref(&extra), &[]);
        cad.complete_elimination().unwrap();
        prop_assert!(cad.remove_polynomial(&extra));

        prop_assert_eq!(cad.level_sizes(), baseline.level_sizes());
        assert_consistent(&cad)?;
    }
}
