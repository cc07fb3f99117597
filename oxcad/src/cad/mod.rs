//! Incremental Cylindrical Algebraic Decomposition.
//!
//! A [`Cad`] owns an ordered list of variables, one [`EliminationSet`] per
//! variable and a [`SampleTree`]. Level 0 holds the input polynomials in all
//! variables and is eliminated first; the last level is univariate. The tree
//! is built the other way round: children of the root carry values of the
//! last level, leaves at full depth are points of the whole space.
//!
//! Both halves are built lazily. [`Cad::check`] lifts whatever projection is
//! available, stops at the first point satisfying the constraints, and only
//! computes more projection polynomials when the current tree is exhausted.
//! Polynomials and variables can be added between checks; everything built
//! so far is kept.
//!
//! ## References
//!
//! - Collins: "Quantifier elimination for real closed fields by cylindrical
//!   algebraic decomposition" (1975)
//! - Loup, Scheibler et al.: "A symbiosis of interval constraint propagation
//!   and cylindrical algebraic decomposition" (CADE 2013)
//! - Jovanović & de Moura: "Solving Non-Linear Arithmetic" (IJCAR 2012)

mod elimination;
mod lifting;
mod removal;

use crate::bounds::{BoundMap, Deduction};
use crate::conflict_graph::ConflictGraph;
use crate::constraint::Constraint;
use crate::diagnostics::{DiagnosticSink, NullSink};
use crate::elimination_set::{EliminationSet, Parents, PolyId, PolyPool};
use crate::error::{CadError, CadResult};
use crate::sample_tree::{SampleTree, Trace};
use crate::settings::CadSettings;
use oxcad_math::{ExactInterval, Polynomial, RealAlgebraicPoint, UnivariatePolynomial, Var};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::debug;

/// Counters of the work done by a [`Cad`].
#[derive(Debug, Clone, Default)]
pub struct CadStats {
    /// Number of checks.
    pub checks: u64,
    /// Number of elimination steps.
    pub eliminations: u64,
    /// Number of resultants computed.
    pub resultants: u64,
    /// Number of samples added to the tree.
    pub samples_constructed: u64,
    /// Number of full-dimensional samples evaluated.
    pub leaves_checked: u64,
    /// Number of nested decompositions run by bound-aware elimination.
    pub sub_cad_calls: u64,
    /// Number of samples not explored because they lie outside the bounds.
    pub pruned_samples: u64,
}

/// Optional inputs and outputs of [`Cad::check`].
pub struct CheckRequest<'a> {
    bounds: Option<&'a mut BoundMap>,
    conflict_graph: Option<&'a mut ConflictGraph>,
    deductions: Option<&'a mut Vec<Deduction>>,
    next: bool,
    use_trace_first: bool,
    check_bounds: bool,
}

impl Default for CheckRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CheckRequest<'a> {
    /// No bounds, no conflict graph, no deductions; the trace is replayed
    /// first and leaves are checked against the bounds.
    pub fn new() -> Self {
        Self {
            bounds: None,
            conflict_graph: None,
            deductions: None,
            next: false,
            use_trace_first: true,
            check_bounds: true,
        }
    }

    /// Restrict the search to `bounds` (keyed by level). With
    /// `improve_bounds` they are narrowed to the witness on success.
    ///
    /// Keys refer to the levels before the call. When the check prepends
    /// variables for new constraints, the keys are shifted in place so the
    /// map keeps restricting the same variables.
    #[must_use]
    pub fn with_bounds(mut self, bounds: &'a mut BoundMap) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Record the evaluated samples of an unsatisfiable check. The graph must
    /// have one vertex per constraint.
    #[must_use]
    pub fn with_conflict_graph(mut self, graph: &'a mut ConflictGraph) -> Self {
        self.conflict_graph = Some(graph);
        self
    }

    /// Collect deductions of a bounded unsatisfiable check.
    #[must_use]
    pub fn with_deductions(mut self, deductions: &'a mut Vec<Deduction>) -> Self {
        self.deductions = Some(deductions);
        self
    }

    /// Look for a point other than the last one found.
    #[must_use]
    pub fn next(mut self, next: bool) -> Self {
        self.next = next;
        self
    }

    /// Replay the last successful path before anything else.
    #[must_use]
    pub fn use_trace_first(mut self, use_trace_first: bool) -> Self {
        self.use_trace_first = use_trace_first;
        self
    }

    /// Reject full-dimensional samples outside the bounds.
    #[must_use]
    pub fn check_bounds(mut self, check_bounds: bool) -> Self {
        self.check_bounds = check_bounds;
        self
    }
}

/// A polynomial withheld by bound-aware elimination.
#[derive(Debug, Clone)]
struct DroppedPolynomial {
    level: usize,
    id: PolyId,
    parents: Parents,
}

/// Incremental CAD engine.
pub struct Cad {
    settings: CadSettings,
    variables: Vec<Var>,
    pool: PolyPool,
    levels: Vec<EliminationSet>,
    scheduled: Vec<Polynomial>,
    scheduled_vars: Vec<Var>,
    /// Normalized input polynomials handed to the levels.
    originals: FxHashSet<Polynomial>,
    tree: SampleTree,
    trace: Trace,
    dropped: Vec<DroppedPolynomial>,
    dropped_bounds: Option<BoundMap>,
    interrupt_flags: Vec<Arc<AtomicBool>>,
    interrupted: bool,
    stats: CadStats,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl fmt::Debug for Cad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cad")
            .field("variables", &self.variables)
            .field("level_sizes", &self.level_sizes())
            .field("nodes", &self.tree.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for Cad {
    fn default() -> Self {
        Self::new(CadSettings::default())
    }
}

/// Level of `var` in `variables`.
pub(crate) fn level_of(variables: &[Var], var: Var) -> Option<usize> {
    variables.iter().position(|&v| v == var)
}

impl Cad {
    /// An empty decomposition.
    #[must_use]
    pub fn new(settings: CadSettings) -> Self {
        Self {
            settings,
            variables: Vec::new(),
            pool: PolyPool::new(),
            levels: Vec::new(),
            scheduled: Vec::new(),
            scheduled_vars: Vec::new(),
            originals: FxHashSet::default(),
            tree: SampleTree::new(),
            trace: vec![None],
            dropped: Vec::new(),
            dropped_bounds: None,
            interrupt_flags: Vec::new(),
            interrupted: false,
            stats: CadStats::default(),
            diagnostics: Box::new(NullSink),
        }
    }

    /// Send diagnostic artifacts to `sink`.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    /// Current settings.
    #[inline]
    pub fn settings(&self) -> &CadSettings {
        &self.settings
    }

    /// Replace the settings. Queue orders are applied to existing levels.
    pub fn set_settings(&mut self, settings: CadSettings) -> CadResult<()> {
        settings.validate()?;
        for level in &mut self.levels {
            level.set_elimination_order(settings.elimination_order, &self.pool);
            level.set_lifting_order(settings.lifting_order, &self.pool);
        }
        self.settings = settings;
        Ok(())
    }

    /// Variables by level.
    #[inline]
    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    /// Number of variables.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    /// Level of a variable.
    pub fn level_of(&self, var: Var) -> Option<usize> {
        level_of(&self.variables, var)
    }

    /// Number of polynomials on every level.
    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(EliminationSet::len).collect()
    }

    /// The sample tree.
    #[inline]
    pub fn tree(&self) -> &SampleTree {
        &self.tree
    }

    /// The elimination sets by level.
    #[inline]
    pub fn levels(&self) -> &[EliminationSet] {
        &self.levels
    }

    /// The polynomial arena of the elimination sets.
    #[inline]
    pub fn pool(&self) -> &PolyPool {
        &self.pool
    }

    /// Work counters.
    #[inline]
    pub fn stats(&self) -> &CadStats {
        &self.stats
    }

    /// Reset the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = CadStats::default();
    }

    /// Abort checks once `flag` is set.
    pub fn add_interrupt_flag(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt_flags.push(flag);
    }

    /// Check whether the last check was aborted by an interrupt flag.
    #[inline]
    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    fn interrupt_requested(&self) -> bool {
        self.interrupt_flags
            .iter()
            .any(|f| f.load(AtomicOrdering::Relaxed))
    }

    /// Translate bounds on variables into bounds on levels.
    pub fn bounds_for(&self, bounds: &[(Var, ExactInterval)]) -> CadResult<BoundMap> {
        bounds
            .iter()
            .map(|(var, b)| {
                self.level_of(*var)
                    .map(|l| (l, b.clone()))
                    .ok_or(CadError::UnknownVariable(*var))
            })
            .collect()
    }

    /// Queue polynomials and variables for the next elimination.
    ///
    /// Variables given here come first, in order, on the new levels; other
    /// unknown variables of the polynomials follow in increasing order.
    /// Numbers and polynomials already present are ignored.
    pub fn schedule(&mut self, polynomials: &[Polynomial], variables: &[Var]) {
        for &v in variables {
            if !self.variables.contains(&v) && !self.scheduled_vars.contains(&v) {
                self.scheduled_vars.push(v);
            }
        }
        for p in polynomials {
            if p.is_constant() {
                continue;
            }
            let p = p.normalized();
            if !self.originals.contains(&p) && !self.scheduled.contains(&p) {
                self.scheduled.push(p);
            }
        }
    }

    /// Move scheduled variables and polynomials into the levels.
    ///
    /// New variables are prepended, so existing levels and the tree keep
    /// their meaning; the tree simply grows deeper.
    pub fn prepare_elimination(&mut self) {
        let mut new_vars = std::mem::take(&mut self.scheduled_vars);
        let mut implicit: Vec<Var> = self
            .scheduled
            .iter()
            .flat_map(Polynomial::vars)
            .filter(|v| !self.variables.contains(v) && !new_vars.contains(v))
            .collect();
        implicit.sort_unstable();
        implicit.dedup();
        new_vars.extend(implicit);

        if !new_vars.is_empty() {
            self.restore_dropped();
            let k = new_vars.len();
            let (eo, lo) = (self.settings.elimination_order, self.settings.lifting_order);
            let mut levels: Vec<EliminationSet> = (0..k).map(|_| EliminationSet::new(eo, lo)).collect();
            levels.append(&mut self.levels);
            self.levels = levels;
            new_vars.append(&mut self.variables);
            self.variables = new_vars;
            self.trace.extend(std::iter::repeat(None).take(k));
            debug!(added = k, variables = ?self.variables, "prepended variables");
        }

        for p in std::mem::take(&mut self.scheduled) {
            if !self.originals.insert(p.clone()) {
                continue;
            }
            let Some(level) = p
                .vars()
                .iter()
                .filter_map(|&v| level_of(&self.variables, v))
                .min()
            else {
                continue;
            };
            let id = self
                .pool
                .intern(UnivariatePolynomial::new(p, self.variables[level]));
            self.levels[level].insert(id, Parents::Original, false, &self.pool);
            debug!(level, "scheduled polynomial {:?}", self.pool[id].polynomial());
        }
    }

    /// Put polynomials withheld by bound-aware elimination back.
    fn restore_dropped(&mut self) {
        if self.dropped.is_empty() {
            return;
        }
        debug!(count = self.dropped.len(), "restoring polynomials dropped by bounds");
        for d in std::mem::take(&mut self.dropped) {
            self.levels[d.level].insert(d.id, d.parents, false, &self.pool);
        }
        for level in &mut self.levels {
            level.bounded = false;
        }
        self.dropped_bounds = None;
    }

    /// Check whether the decomposition is complete regardless of bounds:
    /// nothing is left to eliminate and every sample of the tree has been
    /// lifted with every polynomial of the level below it.
    pub fn is_complete(&self) -> bool {
        if !self.scheduled.is_empty() || !self.scheduled_vars.is_empty() || !self.dropped.is_empty() {
            return false;
        }
        let n = self.dimension();
        if self.levels.iter().any(|l| l.bounded) {
            return false;
        }
        if self.levels[..n.saturating_sub(1)]
            .iter()
            .any(EliminationSet::has_elimination_work)
        {
            return false;
        }
        (0..n).all(|depth| {
            let level = &self.levels[n - 1 - depth];
            self.tree.nodes_at_depth(depth).into_iter().all(|node| {
                !self.tree.children(node).is_empty()
                    && level
                        .sorted(&self.pool)
                        .iter()
                        .all(|id| self.tree.lifted(node).contains(id))
            })
        })
    }

    /// Decide whether `constraints` have a common real solution.
    ///
    /// Missing polynomials and variables are scheduled automatically. On
    /// success `point` receives the witness, one coordinate per level.
    pub fn check(
        &mut self,
        constraints: &[Constraint],
        point: &mut RealAlgebraicPoint,
        request: CheckRequest<'_>,
    ) -> CadResult<bool> {
        lifting::check(self, constraints, point, request)
    }

    /// Find a point satisfying `constraints`, if there is one.
    pub fn find_model(&mut self, constraints: &[Constraint]) -> CadResult<Option<RealAlgebraicPoint>> {
        let mut point = RealAlgebraicPoint::empty();
        if self.check(constraints, &mut point, CheckRequest::new())? {
            Ok(Some(point))
        } else {
            Ok(None)
        }
    }
}

impl fmt::Display for Cad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CAD over {:?}", self.variables)?;
        for (l, level) in self.levels.iter().enumerate() {
            let mark = if level.bounded { " (bounded)" } else { "" };
            writeln!(f, "level {} [x{}]{}:", l, self.variables[l], mark)?;
            for id in level.sorted(&self.pool) {
                writeln!(f, "  {}", self.pool[id].polynomial())?;
            }
        }
        writeln!(f, "sample tree:")?;
        write!(f, "{}", self.tree)
    }
}
