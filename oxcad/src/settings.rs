//! CAD configuration.
//!
//! [`CadSettings`] collects the boolean and enumerated options that steer
//! projection, sample choice and bound handling. None of them affects
//! soundness. [`CadPreset`] bundles common combinations and
//! [`LiftingStrategy`] is the sample policy derived once per check.

use crate::constraint::Constraint;
use crate::error::{CadError, CadResult};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use oxcad_math::UnivariatePolynomial;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Preset bundles of settings, applied as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CadPreset {
    /// No change to the field defaults.
    Generic = 1,
    /// Prefer rational samples.
    RationalSample = 2,
    /// Do not prefer rational samples.
    IrrationalSample = 4,
    /// Tune for pure equation systems.
    EquationsOnly = 8,
    /// Tune for pure inequality systems.
    InequalitiesOnly = 16,
    /// Detect pure equation or inequality systems per check.
    EquationDetect = 32,
    /// Treat equation systems as zero-dimensional.
    ZeroDim = 64,
    /// Use the alternative polynomial orders.
    AlternativeOrder = 128,
    /// Use bounds for pruning, elimination and bound refinement.
    Bounded = 256,
    /// Ignore bounds apart from the final point check.
    NotBounded = 512,
}

impl CadPreset {
    /// Bit of this preset.
    #[inline]
    pub fn bit(self) -> u32 {
        self as u32
    }

    /// Mask combining several presets.
    pub fn mask(presets: &[CadPreset]) -> u32 {
        presets.iter().fold(0, |m, p| m | p.bit())
    }
}

/// Order in which polynomials leave the elimination and lifting queues.
///
/// Every order is completed by comparing polynomial handles, so queue
/// contents are processed deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolynomialOrder {
    /// Total degree, then number of terms.
    #[default]
    Default,
    /// Degree in the main variable first.
    LowDegree,
    /// Smaller root bound first.
    SmallRoots,
    /// Odd main degree first (always has a real root), then low degree.
    OddDegreeFirst,
    /// Even main degree first, then low degree.
    EvenDegreeFirst,
}

impl PolynomialOrder {
    /// Compare two polynomials under this order (without tie breaking).
    pub fn compare(self, a: &UnivariatePolynomial, b: &UnivariatePolynomial) -> Ordering {
        let total = |p: &UnivariatePolynomial| p.polynomial().total_degree();
        let terms = |p: &UnivariatePolynomial| p.polynomial().num_terms();
        match self {
            PolynomialOrder::Default => total(a)
                .cmp(&total(b))
                .then_with(|| terms(a).cmp(&terms(b))),
            PolynomialOrder::LowDegree => a
                .degree()
                .cmp(&b.degree())
                .then_with(|| total(a).cmp(&total(b))),
            PolynomialOrder::SmallRoots => root_bound(a)
                .cmp(&root_bound(b))
                .then_with(|| a.degree().cmp(&b.degree())),
            PolynomialOrder::OddDegreeFirst => (a.degree() % 2 == 0)
                .cmp(&(b.degree() % 2 == 0))
                .then_with(|| a.degree().cmp(&b.degree())),
            PolynomialOrder::EvenDegreeFirst => (a.degree() % 2 == 1)
                .cmp(&(b.degree() % 2 == 1))
                .then_with(|| a.degree().cmp(&b.degree())),
        }
    }
}

/// Cauchy-style bound `1 + max_k h(c_k) / h(c_d)` on the roots in the main
/// variable, where `h` is the largest coefficient magnitude.
fn root_bound(p: &UnivariatePolynomial) -> BigRational {
    let height = |c: &oxcad_math::Polynomial| {
        c.terms()
            .iter()
            .map(|t| t.coeff.abs())
            .max()
            .unwrap_or_else(BigRational::zero)
    };
    let coeffs = p.coefficients();
    let Some((lc, rest)) = coeffs.split_last() else {
        return BigRational::zero();
    };
    let lead = height(lc);
    if lead.is_zero() {
        return BigRational::zero();
    }
    let max = rest.iter().map(height).max().unwrap_or_else(BigRational::zero);
    BigRational::one() + max / lead
}

/// Options of the CAD engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadSettings {
    /// Prefer numeric samples over interval-represented ones.
    pub prefer_nr_samples: bool,
    /// Choose between root and non-root samples first.
    pub prefer_samples_by_is_root: bool,
    /// With `prefer_samples_by_is_root`, take non-roots before roots.
    pub prefer_nonroot_samples: bool,
    /// Drop univariate projection polynomials without real roots.
    pub simplify_by_rootcounting: bool,
    /// Split projection polynomials into squarefree factors.
    pub simplify_by_factorization: bool,
    /// Constraint sets are expected to consist of equations.
    pub equations_only: bool,
    /// Constraint sets are expected to consist of strict inequalities.
    pub inequalities_only: bool,
    /// Erase polynomials from a level once they are copied to the next one.
    pub remove_constants: bool,
    /// Remove variables whose elimination level became empty.
    pub trim_variables: bool,
    /// Specialize the search per check for pure equation or inequality sets.
    pub auto_separate_equations: bool,
    /// Equation systems are zero-dimensional, so only roots are lifted.
    pub zero_dim_equations: bool,
    /// Record which samples satisfy which constraints.
    pub compute_conflict_graph: bool,
    /// Maximum number of deductions emitted per check.
    pub number_of_deductions: u32,
    /// Replay the last successful sample path first.
    pub warm_restart: bool,
    /// Decide by interval arithmetic over the bounds before lifting.
    pub pre_solve_by_bounds: bool,
    /// Do not lift samples outside the bounds.
    pub early_lifting_pruning_by_bounds: bool,
    /// Drop projection polynomials that do not vanish inside the bounds.
    pub simplify_elimination_by_bounds: bool,
    /// Shrink the bounds to the witness after a satisfiable check.
    pub improve_bounds: bool,
    /// Order of the elimination queues.
    pub elimination_order: PolynomialOrder,
    /// Order of the lifting queues.
    pub lifting_order: PolynomialOrder,
}

impl Default for CadSettings {
    fn default() -> Self {
        Self::preset(CadPreset::Bounded.bit())
    }
}

impl CadSettings {
    /// The field defaults without any preset.
    #[must_use]
    pub fn base() -> Self {
        Self {
            prefer_nr_samples: false,
            prefer_samples_by_is_root: false,
            prefer_nonroot_samples: false,
            simplify_by_rootcounting: false,
            simplify_by_factorization: true,
            equations_only: false,
            inequalities_only: false,
            remove_constants: true,
            trim_variables: false,
            auto_separate_equations: false,
            zero_dim_equations: false,
            compute_conflict_graph: true,
            number_of_deductions: 1,
            warm_restart: false,
            pre_solve_by_bounds: false,
            early_lifting_pruning_by_bounds: true,
            simplify_elimination_by_bounds: true,
            improve_bounds: true,
            elimination_order: PolynomialOrder::Default,
            lifting_order: PolynomialOrder::Default,
        }
    }

    /// The field defaults with the presets in `mask` applied.
    #[must_use]
    pub fn preset(mask: u32) -> Self {
        Self::base().with_preset(mask)
    }

    /// Apply the presets in `mask`.
    ///
    /// Sample presets go first, then the bound presets, then the equation
    /// and inequality presets, so later bundles override earlier ones.
    #[must_use]
    pub fn with_preset(mut self, mask: u32) -> Self {
        let has = |p: CadPreset| mask & p.bit() != 0;
        if has(CadPreset::RationalSample) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = true;
        }
        if has(CadPreset::IrrationalSample) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = false;
        }
        if has(CadPreset::EquationDetect) {
            self.auto_separate_equations = true;
        }
        if has(CadPreset::Bounded) {
            self.set_bound_options(true);
        }
        if has(CadPreset::NotBounded) {
            self.set_bound_options(false);
        }
        if has(CadPreset::EquationsOnly) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = false;
            self.equations_only = true;
            self.inequalities_only = false;
            self.prefer_samples_by_is_root = true;
            self.prefer_nonroot_samples = false;
        }
        if has(CadPreset::InequalitiesOnly) {
            self.prefer_nr_samples = false;
            self.equations_only = false;
            self.inequalities_only = true;
            self.prefer_samples_by_is_root = true;
            self.prefer_nonroot_samples = true;
        }
        if has(CadPreset::ZeroDim) {
            self.zero_dim_equations = true;
        }
        if has(CadPreset::AlternativeOrder) {
            self.elimination_order = PolynomialOrder::LowDegree;
            self.lifting_order = PolynomialOrder::OddDegreeFirst;
        }
        self
    }

    fn set_bound_options(&mut self, bounded: bool) {
        self.auto_separate_equations = true;
        self.compute_conflict_graph = false;
        self.number_of_deductions = 0;
        self.early_lifting_pruning_by_bounds = bounded;
        self.improve_bounds = bounded;
        self.pre_solve_by_bounds = false;
        self.remove_constants = true;
        self.simplify_by_factorization = true;
        self.simplify_by_rootcounting = false;
        self.simplify_elimination_by_bounds = bounded;
        self.trim_variables = false;
        self.warm_restart = true;
    }

    /// Reject contradictory combinations.
    pub fn validate(&self) -> CadResult<()> {
        if self.equations_only && self.inequalities_only {
            return Err(CadError::InvalidSettings(
                "equations_only and inequalities_only are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for a nested decomposition that decides whether a single
    /// polynomial vanishes inside a box.
    pub(crate) fn for_box_test(&self) -> Self {
        Self {
            simplify_by_factorization: true,
            simplify_elimination_by_bounds: false,
            early_lifting_pruning_by_bounds: true,
            pre_solve_by_bounds: false,
            improve_bounds: false,
            compute_conflict_graph: false,
            number_of_deductions: 0,
            warm_restart: false,
            auto_separate_equations: false,
            equations_only: false,
            inequalities_only: false,
            trim_variables: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for CadSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        let mut add = |on: bool, text: &str| {
            if on {
                lines.push(text.to_string());
            }
        };
        add(self.simplify_by_rootcounting, "drop projection polynomials without real roots");
        add(self.simplify_by_factorization, "factor projection polynomials");
        add(self.prefer_nr_samples, "prefer numeric samples");
        add(
            self.prefer_samples_by_is_root && self.prefer_nonroot_samples,
            "prefer non-root samples",
        );
        add(
            self.prefer_samples_by_is_root && !self.prefer_nonroot_samples,
            "prefer root samples",
        );
        add(self.equations_only, "equations only");
        add(self.inequalities_only, "inequalities only");
        add(self.remove_constants, "remove copied constants");
        add(self.trim_variables, "trim variables of empty levels");
        add(self.auto_separate_equations, "separate equations per check");
        add(self.zero_dim_equations, "zero-dimensional equations");
        add(self.compute_conflict_graph, "compute conflict graph");
        add(self.warm_restart, "warm restart from trace");
        add(self.pre_solve_by_bounds, "pre-solve by bounds");
        add(self.early_lifting_pruning_by_bounds, "prune lifting by bounds");
        add(self.simplify_elimination_by_bounds, "simplify elimination by bounds");
        add(self.improve_bounds, "shrink bounds to witness");
        lines.push(format!("deductions per check: {}", self.number_of_deductions));
        lines.push(format!("elimination order: {:?}", self.elimination_order));
        lines.push(format!("lifting order: {:?}", self.lifting_order));
        writeln!(f, "CAD settings:")?;
        for line in &lines {
            writeln!(f, "  - {}", line)?;
        }
        Ok(())
    }
}

/// Which samples are tried first during lifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplePolicy {
    /// First constructed, first tried.
    #[default]
    InsertionOrder,
    /// Numeric samples first.
    PreferNumeric,
    /// Root samples first.
    PreferRoots,
    /// Non-root samples first.
    PreferNonRoots,
}

/// Which samples are lifted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleFilter {
    /// Every sample.
    #[default]
    All,
    /// Only roots (zero-dimensional equation systems).
    RootsOnly,
    /// Only non-roots (strict inequality systems).
    NonRootsOnly,
}

impl SampleFilter {
    /// Check whether a sample with the given root tag passes.
    #[inline]
    pub fn admits(self, is_root: bool) -> bool {
        match self {
            SampleFilter::All => true,
            SampleFilter::RootsOnly => is_root,
            SampleFilter::NonRootsOnly => !is_root,
        }
    }
}

/// Sample policy of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LiftingStrategy {
    /// Preference among admitted samples.
    pub policy: SamplePolicy,
    /// Samples that are lifted at all.
    pub filter: SampleFilter,
}

impl LiftingStrategy {
    /// Strategy for checking `constraints` under `settings`.
    ///
    /// Filters are only chosen where they cannot lose solutions: roots only
    /// for zero-dimensional equation systems, non-roots only when every
    /// constraint defines an open set.
    pub fn derive(settings: &CadSettings, constraints: &[Constraint]) -> CadResult<Self> {
        settings.validate()?;
        let all_equations = !constraints.is_empty() && constraints.iter().all(Constraint::is_equation);
        let all_strict = !constraints.is_empty() && constraints.iter().all(Constraint::is_strict);

        let (equations_only, inequalities_only, by_root, nonroot_first) =
            if settings.auto_separate_equations && all_equations {
                (true, false, true, false)
            } else if settings.auto_separate_equations && all_strict {
                (false, true, true, true)
            } else {
                (
                    settings.equations_only,
                    settings.inequalities_only,
                    settings.prefer_samples_by_is_root,
                    settings.prefer_nonroot_samples,
                )
            };

        let policy = if settings.prefer_nr_samples {
            SamplePolicy::PreferNumeric
        } else if by_root && nonroot_first {
            SamplePolicy::PreferNonRoots
        } else if by_root {
            SamplePolicy::PreferRoots
        } else {
            SamplePolicy::InsertionOrder
        };
        let filter = if equations_only && settings.zero_dim_equations && all_equations {
            SampleFilter::RootsOnly
        } else if inequalities_only && all_strict {
            SampleFilter::NonRootsOnly
        } else {
            SampleFilter::All
        };
        Ok(Self { policy, filter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxcad_math::Polynomial;

    fn upoly(coeffs: &[(i64, &[(u32, u32)])], var: u32) -> UnivariatePolynomial {
        UnivariatePolynomial::new(Polynomial::from_coeffs_int(coeffs), var)
    }

    #[test]
    fn test_default_is_bounded_preset() {
        let s = CadSettings::default();
        assert!(s.auto_separate_equations);
        assert!(s.warm_restart);
        assert!(!s.compute_conflict_graph);
        assert_eq!(s.number_of_deductions, 0);
        assert!(s.early_lifting_pruning_by_bounds);
        assert!(s.simplify_elimination_by_bounds);

        let n = CadSettings::preset(CadPreset::NotBounded.bit());
        assert!(!n.early_lifting_pruning_by_bounds);
        assert!(!n.improve_bounds);
        assert!(!n.simplify_elimination_by_bounds);
    }

    #[test]
    fn test_preset_order() {
        // the equation preset is applied after the bound preset
        let s = CadSettings::preset(CadPreset::mask(&[CadPreset::Bounded, CadPreset::EquationsOnly]));
        assert!(s.equations_only);
        assert!(!s.auto_separate_equations);
        assert!(s.prefer_samples_by_is_root);
        assert!(!s.prefer_nonroot_samples);
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        let s = CadSettings {
            equations_only: true,
            inequalities_only: true,
            ..CadSettings::base()
        };
        assert!(matches!(s.validate(), Err(CadError::InvalidSettings(_))));
        assert!(LiftingStrategy::derive(&s, &[]).is_err());
    }

    #[test]
    fn test_strategy_derivation() {
        let x = Polynomial::from_var(0);
        let strict = vec![Constraint::greater(x.clone()), Constraint::neq(x.clone())];
        let equations = vec![Constraint::eq(x.clone())];
        let mixed = vec![Constraint::eq(x.clone()), Constraint::leq(x)];

        let numeric = CadSettings {
            prefer_nr_samples: true,
            prefer_samples_by_is_root: true,
            ..CadSettings::base()
        };
        let st = LiftingStrategy::derive(&numeric, &strict).unwrap();
        assert_eq!(st.policy, SamplePolicy::PreferNumeric);

        let auto = CadSettings {
            auto_separate_equations: true,
            ..CadSettings::base()
        };
        let st = LiftingStrategy::derive(&auto, &strict).unwrap();
        assert_eq!(st.policy, SamplePolicy::PreferNonRoots);
        assert_eq!(st.filter, SampleFilter::NonRootsOnly);

        let st = LiftingStrategy::derive(&auto, &equations).unwrap();
        assert_eq!(st.policy, SamplePolicy::PreferRoots);
        assert_eq!(st.filter, SampleFilter::All);

        let zero_dim = CadSettings {
            zero_dim_equations: true,
            ..auto.clone()
        };
        let st = LiftingStrategy::derive(&zero_dim, &equations).unwrap();
        assert_eq!(st.filter, SampleFilter::RootsOnly);

        let st = LiftingStrategy::derive(&auto, &mixed).unwrap();
        assert_eq!(st, LiftingStrategy::default());

        // a user-set inequality flag is ignored for non-strict constraints
        let ineq = CadSettings::preset(CadPreset::InequalitiesOnly.bit());
        let st = LiftingStrategy::derive(&ineq, &mixed).unwrap();
        assert_eq!(st.filter, SampleFilter::All);
    }

    #[test]
    fn test_polynomial_orders() {
        // x^3 + y and x^2 * y^2 in x
        let a = upoly(&[(1, &[(0, 3)]), (1, &[(1, 1)])], 0);
        let b = upoly(&[(1, &[(0, 2), (1, 2)])], 0);
        assert_eq!(PolynomialOrder::Default.compare(&a, &b), Ordering::Less);
        assert_eq!(PolynomialOrder::LowDegree.compare(&a, &b), Ordering::Greater);
        assert_eq!(PolynomialOrder::OddDegreeFirst.compare(&a, &b), Ordering::Less);
        assert_eq!(PolynomialOrder::EvenDegreeFirst.compare(&a, &b), Ordering::Greater);

        // x - 10 has a larger root bound than x - 1
        let c = upoly(&[(1, &[(0, 1)]), (-10, &[])], 0);
        let d = upoly(&[(1, &[(0, 1)]), (-1, &[])], 0);
        assert_eq!(PolynomialOrder::SmallRoots.compare(&c, &d), Ordering::Greater);
    }

    #[test]
    fn test_settings_serde_roundtrip() {
        let s = CadSettings::preset(CadPreset::mask(&[CadPreset::RationalSample, CadPreset::AlternativeOrder]));
        let json = serde_json::to_string(&s).unwrap();
        let back: CadSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
        // missing fields fall back to the defaults
        let partial: CadSettings = serde_json::from_str(r#"{"warm_restart": false}"#).unwrap();
        assert!(!partial.warm_restart);
        assert!(partial.simplify_by_factorization);
    }

    #[test]
    fn test_display_lists_options() {
        let text = CadSettings::default().to_string();
        assert!(text.contains("warm restart from trace"));
        assert!(text.contains("lifting order: Default"));
    }
}
