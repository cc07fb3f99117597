//! Interval bounds on CAD levels.
//!
//! Bounds restrict the search to a box. They prune samples during lifting,
//! let elimination drop polynomials without roots in the box, and are
//! narrowed to the witness after a satisfiable check.

use crate::constraint::Constraint;
use oxcad_math::{ExactInterval, RealAlgebraicNumber, Var};
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// Bounds keyed by level.
pub type BoundMap = FxHashMap<usize, ExactInterval>;

/// Move every bound up by `offset` levels, following variables that were
/// prepended below them.
pub fn shift_levels(bounds: &mut BoundMap, offset: usize) {
    if offset == 0 || bounds.is_empty() {
        return;
    }
    debug!(offset, "shifting bound levels");
    *bounds = bounds.drain().map(|(level, b)| (level + offset, b)).collect();
}

/// Check whether any bound restricts its level.
pub fn is_active(bounds: &BoundMap) -> bool {
    bounds.values().any(|b| !b.is_unbounded())
}

/// The bound box in terms of variables.
pub fn domain(bounds: &BoundMap, variables: &[Var]) -> FxHashMap<Var, ExactInterval> {
    bounds
        .iter()
        .filter_map(|(&level, b)| variables.get(level).map(|&v| (v, b.clone())))
        .collect()
}

/// Index of the first constraint that interval evaluation over the box
/// proves unsatisfiable.
pub fn presolve(constraints: &[Constraint], domain: &FxHashMap<Var, ExactInterval>) -> Option<usize> {
    constraints
        .iter()
        .position(|c| !c.possibly_satisfied_on(domain))
}

/// Check whether a witness, indexed by level, lies in the bounds.
pub fn contains_point(bounds: &BoundMap, witness: &[RealAlgebraicNumber]) -> bool {
    bounds
        .iter()
        .all(|(&level, b)| witness.get(level).map_or(true, |w| w.is_in(b)))
}

/// Narrow every bound to an enclosure of the witness coordinate on its
/// level. Returns true if some bound changed.
///
/// Numeric coordinates give point intervals. Irrational ones give their
/// isolating interval, refined once and intersected with the old bound.
/// Coordinates outside their bound leave it untouched.
pub fn shrink_bounds(bounds: &mut BoundMap, witness: &[RealAlgebraicNumber]) -> bool {
    let mut changed = false;
    for (&level, bound) in bounds.iter_mut() {
        let Some(w) = witness.get(level) else {
            continue;
        };
        if !w.is_in(bound) {
            continue;
        }
        let enclosure = if w.is_numeric() {
            w.interval()
        } else {
            let mut refined = w.clone();
            refined.refine();
            refined.interval()
        };
        let narrowed = enclosure.intersect(bound);
        if !narrowed.is_empty() && narrowed != *bound {
            debug!(level, from = %bound, to = %narrowed, "shrinking bound");
            *bound = narrowed;
            changed = true;
        }
    }
    changed
}

/// Feedback for an unsatisfiable check.
///
/// Bounds are left unchanged; the caller owns any relaxation policy.
pub fn widen_bounds(bounds: &mut BoundMap) -> bool {
    let _ = bounds;
    false
}

/// A learned fact: under `bounds`, the constraints with the listed indices
/// have no common solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    /// Active bounds, sorted by variable.
    pub bounds: Vec<(Var, ExactInterval)>,
    /// Indices of the constraints involved.
    pub constraints: Vec<usize>,
}

impl Deduction {
    /// Build a deduction from level bounds.
    pub fn new(bounds: &BoundMap, variables: &[Var], constraints: Vec<usize>) -> Self {
        let mut bounds: Vec<(Var, ExactInterval)> = domain(bounds, variables)
            .into_iter()
            .filter(|(_, b)| !b.is_unbounded())
            .collect();
        bounds.sort_by_key(|(v, _)| *v);
        Self { bounds, constraints }
    }
}

impl fmt::Display for Deduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds: Vec<String> = self
            .bounds
            .iter()
            .map(|(v, b)| format!("x{} in {}", v, b))
            .collect();
        write!(f, "{} => not {:?}", bounds.join(" and "), self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxcad_math::polynomial::DensePolynomial;
    use oxcad_math::rational::{frac, rat};
    use oxcad_math::Polynomial;

    fn sqrt2() -> RealAlgebraicNumber {
        let p = DensePolynomial::new(vec![rat(-2), rat(0), rat(1)]);
        RealAlgebraicNumber::from_isolating(&p, rat(1), rat(2)).unwrap()
    }

    #[test]
    fn test_shrink_numeric() {
        let mut bounds = BoundMap::default();
        bounds.insert(0, ExactInterval::closed(rat(0), rat(10)));
        let witness = vec![RealAlgebraicNumber::from_rational(rat(3))];
        assert!(shrink_bounds(&mut bounds, &witness));
        assert_eq!(bounds[&0], ExactInterval::point(rat(3)));
        assert!(!shrink_bounds(&mut bounds, &witness));
    }

    #[test]
    fn test_shrink_irrational() {
        let mut bounds = BoundMap::default();
        let original = ExactInterval::closed(rat(0), rat(10));
        bounds.insert(0, original.clone());
        let witness = vec![sqrt2()];
        assert!(shrink_bounds(&mut bounds, &witness));
        assert!(bounds[&0].is_subset_of(&original));
        assert!(witness[0].is_in(&bounds[&0]));
        // one bisection of (1, 2)
        assert_eq!(bounds[&0], ExactInterval::open(rat(1), frac(3, 2)));
    }

    #[test]
    fn test_shift_levels() {
        let mut bounds = BoundMap::default();
        bounds.insert(0, ExactInterval::closed(rat(5), rat(6)));
        bounds.insert(2, ExactInterval::unbounded());
        shift_levels(&mut bounds, 1);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[&1], ExactInterval::closed(rat(5), rat(6)));
        assert!(bounds[&3].is_unbounded());
        shift_levels(&mut bounds, 0);
        assert!(bounds.contains_key(&1));
    }

    #[test]
    fn test_widen_keeps_bounds() {
        let mut bounds = BoundMap::default();
        bounds.insert(0, ExactInterval::closed(rat(5), rat(6)));
        let before = bounds.clone();
        assert!(!widen_bounds(&mut bounds));
        assert_eq!(bounds, before);
    }

    #[test]
    fn test_witness_outside_bound() {
        let mut bounds = BoundMap::default();
        bounds.insert(0, ExactInterval::closed(rat(5), rat(6)));
        let witness = vec![RealAlgebraicNumber::from_rational(rat(0))];
        assert!(!contains_point(&bounds, &witness));
        assert!(!shrink_bounds(&mut bounds, &witness));
    }

    #[test]
    fn test_presolve_and_deduction() {
        let circle = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let constraints = vec![Constraint::geq(Polynomial::from_var(1)), Constraint::leq(circle)];
        let mut bounds = BoundMap::default();
        bounds.insert(1, ExactInterval::closed(rat(2), rat(3)));
        bounds.insert(0, ExactInterval::unbounded());
        let variables = [1, 0];
        let d = domain(&bounds, &variables);
        assert!(is_active(&bounds));
        assert_eq!(presolve(&constraints, &d), Some(1));

        let deduction = Deduction::new(&bounds, &variables, vec![1]);
        assert_eq!(deduction.bounds, vec![(0, ExactInterval::closed(rat(2), rat(3)))]);
        assert!(deduction.to_string().contains("x0 in"));
    }
}
