//! The search over the sample tree.
//!
//! A check runs in three phases:
//!
//! 1. replay the trace (the last successful path), deepest node first,
//! 2. revisit every node that still has unlifted polynomials or no children,
//! 3. alternate between lifting the levels with fresh polynomials and
//!    running further projection steps, until a point is found or nothing
//!    is left to project.
//!
//! A node is lifted one polynomial at a time, and only until a sample of the
//! preferred kind is available, so satisfiable problems usually touch a small
//! part of the decomposition.

use super::{Cad, CheckRequest};
use crate::bounds::{self, BoundMap, Deduction};
use crate::conflict_graph::ConflictGraph;
use crate::constraint::Constraint;
use crate::diagnostics::to_smtlib;
use crate::elimination_set::PolyId;
use crate::error::{CadError, CadResult};
use crate::sample_set::{construct_samples, SampleSet};
use crate::sample_tree::NodeId;
use crate::settings::LiftingStrategy;
use oxcad_math::algebraic::{nonzero_sign_at, real_roots, RealRoots};
use oxcad_math::{
    MathError, Polynomial, RealAlgebraicNumber, RealAlgebraicPoint, Sign, UnivariatePolynomial, Var,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, trace, warn};

/// State of one check.
struct Search<'c> {
    constraints: &'c [Constraint],
    strategy: LiftingStrategy,
    /// Active bounds, if any.
    bounds: Option<BoundMap>,
    /// Samples outside the bounds are not explored.
    prune: bool,
    check_bounds: bool,
    graph: Option<&'c mut ConflictGraph>,
    /// Nodes whose subtree was exhausted during this check.
    explored: FxHashSet<NodeId>,
    /// Leaf not to be accepted again.
    skip: Option<NodeId>,
    found: Option<NodeId>,
}

pub(super) fn check(
    cad: &mut Cad,
    constraints: &[Constraint],
    point: &mut RealAlgebraicPoint,
    request: CheckRequest<'_>,
) -> CadResult<bool> {
    cad.settings.validate()?;
    cad.stats.checks += 1;
    cad.interrupted = false;
    let CheckRequest {
        mut bounds,
        mut conflict_graph,
        mut deductions,
        next,
        use_trace_first,
        check_bounds,
    } = request;

    let before = cad.dimension();
    if let Some(b) = bounds.as_deref() {
        if let Some(&level) = b.keys().filter(|&&l| l >= before).min() {
            return Err(CadError::LevelOutOfRange {
                level,
                dimension: before,
            });
        }
    }

    let polynomials: Vec<Polynomial> = constraints.iter().map(|c| c.polynomial().clone()).collect();
    cad.schedule(&polynomials, &[]);
    cad.prepare_elimination();
    let n = cad.dimension();
    if let Some(b) = bounds.as_deref_mut() {
        bounds::shift_levels(b, n - before);
    }
    if let Some(graph) = conflict_graph.as_deref() {
        if graph.num_constraints() != constraints.len() {
            return Err(CadError::DimensionMismatch {
                expected: constraints.len(),
                found: graph.num_constraints(),
            });
        }
    }

    let active: Option<BoundMap> = bounds
        .as_deref()
        .filter(|b| bounds::is_active(b))
        .cloned();
    if !cad.dropped.is_empty() && cad.dropped_bounds != active {
        cad.restore_dropped();
    }

    let strategy = LiftingStrategy::derive(&cad.settings, constraints)?;
    if cad.diagnostics.enabled() {
        let script = to_smtlib(constraints);
        cad.diagnostics.emit("check", &script);
    }

    if cad.settings.pre_solve_by_bounds {
        if let Some(b) = &active {
            let domain = bounds::domain(b, &cad.variables);
            if let Some(i) = bounds::presolve(constraints, &domain) {
                info!(constraint = i, "unsatisfiable by interval evaluation over the bounds");
                if cad.settings.compute_conflict_graph {
                    if let Some(graph) = conflict_graph.as_mut() {
                        let mut row = vec![true; constraints.len()];
                        row[i] = false;
                        graph.add_sample(&row);
                    }
                }
                if cad.settings.number_of_deductions > 0 {
                    if let Some(out) = deductions.as_mut() {
                        out.push(Deduction::new(b, &cad.variables, vec![i]));
                    }
                }
                return Ok(false);
            }
        }
    }

    let mut search = Search {
        constraints,
        strategy,
        prune: cad.settings.early_lifting_pruning_by_bounds && active.is_some(),
        bounds: active,
        check_bounds,
        graph: conflict_graph.filter(|_| cad.settings.compute_conflict_graph),
        explored: FxHashSet::default(),
        skip: if next { cad.trace.get(n).copied().flatten() } else { None },
        found: None,
    };
    let satisfiable = cad.main_check(&mut search, use_trace_first)?;

    if cad.interrupted {
        info!("check interrupted");
        return Ok(false);
    }
    match search.found.filter(|_| satisfiable) {
        Some(leaf) => {
            let root = cad.tree.root();
            cad.trace = std::iter::once(Some(root))
                .chain(cad.tree.path(leaf).into_iter().map(Some))
                .collect();
            let mut coords = cad.tree.values_on_path(leaf);
            coords.reverse();
            if cad.settings.improve_bounds {
                if let Some(b) = bounds {
                    bounds::shrink_bounds(b, &coords);
                }
            }
            *point = RealAlgebraicPoint::new(coords);
            info!(point = %point, "satisfiable");
            Ok(true)
        }
        None => {
            if let (Some(b), Some(out)) = (&search.bounds, deductions.as_mut()) {
                if cad.settings.number_of_deductions > 0 {
                    out.push(Deduction::new(b, &cad.variables, (0..constraints.len()).collect()));
                }
            }
            if cad.settings.improve_bounds {
                if let Some(b) = bounds {
                    bounds::widen_bounds(b);
                }
            }
            info!(complete = cad.is_complete(), "unsatisfiable");
            Ok(false)
        }
    }
}

impl Cad {
    fn main_check(&mut self, search: &mut Search<'_>, use_trace_first: bool) -> CadResult<bool> {
        let n = self.dimension();

        if self.settings.warm_restart && use_trace_first {
            for depth in (0..=n).rev() {
                let Some(node) = self.trace.get(depth).copied().flatten() else {
                    continue;
                };
                if !self.tree.contains(node)
                    || self.tree.depth(node) != depth
                    || search.explored.contains(&node)
                    || !self.path_admissible(node, search)
                {
                    continue;
                }
                if self.lift_check(node, false, search)? {
                    return Ok(true);
                }
                if self.interrupted {
                    return Ok(false);
                }
            }
        }

        for node in self.tree.preorder() {
            if !self.tree.contains(node) || search.explored.contains(&node) {
                continue;
            }
            let depth = self.tree.depth(node);
            let childless = self.tree.children(node).is_empty();
            let needs_work = if depth < n {
                childless || self.has_pending(node, n - 1 - depth)
            } else {
                childless
            };
            if !needs_work || !self.path_admissible(node, search) {
                continue;
            }
            if self.lift_check(node, !childless, search)? {
                return Ok(true);
            }
            if self.interrupted {
                return Ok(false);
            }
        }

        let elimination_bounds = search.bounds.clone();
        while n > 0 {
            match (0..n).rev().find(|&l| !self.levels[l].empty_lifting_queue()) {
                Some(level) => {
                    let depth = n - 1 - level;
                    for node in self.tree.nodes_at_depth(depth) {
                        if !self.tree.contains(node) || !self.path_admissible(node, search) {
                            continue;
                        }
                        if self.lift_check(node, true, search)? {
                            return Ok(true);
                        }
                        if self.interrupted {
                            return Ok(false);
                        }
                    }
                    self.levels[level].clear_lifting_queue();
                    self.levels[level].set_lifting_positions_reset();
                }
                None => {
                    if self.eliminate(n - 1, elimination_bounds.as_ref())?.is_none() {
                        break;
                    }
                }
            }
        }
        Ok(false)
    }

    fn pending_polynomials(&self, node: NodeId, level: usize) -> Vec<PolyId> {
        let lifted = self.tree.lifted(node);
        self.levels[level]
            .sorted(&self.pool)
            .into_iter()
            .filter(|id| !lifted.contains(id))
            .collect()
    }

    fn has_pending(&self, node: NodeId, level: usize) -> bool {
        let lifted = self.tree.lifted(node);
        self.levels[level]
            .sorted(&self.pool)
            .iter()
            .any(|id| !lifted.contains(id))
    }

    fn admissible(&self, node: NodeId, level: usize, search: &Search<'_>) -> bool {
        let Some(value) = self.tree.value(node) else {
            return true;
        };
        if !search.strategy.filter.admits(value.is_root()) {
            return false;
        }
        !search.prune
            || search
                .bounds
                .as_ref()
                .and_then(|b| b.get(&level))
                .map_or(true, |b| value.is_in(b))
    }

    fn path_admissible(&self, node: NodeId, search: &Search<'_>) -> bool {
        let n = self.dimension();
        self.tree
            .path(node)
            .into_iter()
            .enumerate()
            .all(|(i, id)| self.admissible(id, n - 1 - i, search))
    }

    /// Assignment of the variables fixed along the path to `node`.
    fn assignment_of(&self, node: NodeId) -> FxHashMap<Var, RealAlgebraicNumber> {
        let n = self.dimension();
        self.tree
            .values_on_path(node)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (self.variables[n - 1 - i], v))
            .collect()
    }

    /// Search the subtree of `node`. With `only_new`, existing children are
    /// left alone and only samples from not yet lifted polynomials are
    /// explored.
    fn lift_check(&mut self, node: NodeId, only_new: bool, search: &mut Search<'_>) -> CadResult<bool> {
        let n = self.dimension();
        let depth = self.tree.depth(node);
        if depth >= n {
            return self.check_leaf(node, search);
        }
        let level = n - 1 - depth;
        let policy = search.strategy.policy;
        let mut samples = SampleSet::new(search.strategy.filter);

        if !only_new {
            let children = self.tree.children(node).to_vec();
            for child in children {
                if search.explored.contains(&child) || !self.admissible(child, level, search) {
                    continue;
                }
                if let Some(value) = self.tree.value(child) {
                    samples.insert(child, value);
                }
            }
        }

        let pending = self.pending_polynomials(node, level);
        if pending.is_empty() && self.tree.children(node).is_empty() {
            self.add_samples(node, level, &[], &mut samples, search);
        }
        let assignment = self.assignment_of(node);
        let mut pending = pending.into_iter();
        loop {
            while !samples.has_preferred(policy) {
                let Some(id) = pending.next() else {
                    break;
                };
                self.lift_polynomial(node, id, level, &assignment, &mut samples, search)?;
            }
            let Some(child) = samples.pop(policy) else {
                break;
            };
            trace!(depth = depth + 1, "lifting sample {:?}", self.tree.value(child));
            if self.lift_check(child, false, search)? {
                return Ok(true);
            }
            if self.interrupted {
                return Ok(false);
            }
        }
        search.explored.insert(node);
        Ok(false)
    }

    /// Add the roots of one polynomial below `node`.
    fn lift_polynomial(
        &mut self,
        node: NodeId,
        id: PolyId,
        level: usize,
        assignment: &FxHashMap<Var, RealAlgebraicNumber>,
        samples: &mut SampleSet,
        search: &Search<'_>,
    ) -> CadResult<()> {
        self.tree.mark_lifted(node, id);
        let var = self.variables[level];
        let (roots, resolved) = match real_roots(self.pool[id].polynomial(), var, assignment, None) {
            Ok(RealRoots::Roots(roots)) => (roots, true),
            Ok(RealRoots::Nullified) => (Vec::new(), false),
            Err(MathError::DegenerateProjection) => {
                warn!(level, "discarding degenerate projection {:?}", self.pool[id].polynomial());
                (Vec::new(), false)
            }
            Err(e) => return Err(e.into()),
        };
        self.add_samples(node, level, &roots, samples, search);
        if resolved {
            for root in &roots {
                if let Some(child) = self.tree.find_child(node, root) {
                    self.tree.mark_vanishing(child, id);
                }
            }
            self.tree.mark_resolved(node, id);
        }
        Ok(())
    }

    fn add_samples(
        &mut self,
        node: NodeId,
        level: usize,
        roots: &[RealAlgebraicNumber],
        samples: &mut SampleSet,
        search: &Search<'_>,
    ) {
        let bound = if search.prune {
            search.bounds.as_ref().and_then(|b| b.get(&level))
        } else {
            None
        };
        let current = self.tree.child_values(node);
        let construction = construct_samples(roots, &current, bound);
        let children = self.tree.children(node).to_vec();
        for (i, value) in construction.upgrades {
            if let Some(&child) = children.get(i) {
                samples.update(child, &value);
                self.tree.set_value(child, value);
            }
        }
        for sample in construction.samples {
            let child = self.tree.insert_child(node, sample.value.clone());
            self.stats.samples_constructed += 1;
            if sample.discarded {
                self.stats.pruned_samples += 1;
            } else {
                samples.insert(child, &sample.value);
            }
        }
    }

    /// Whether `p` vanishes at the point of `path` (one node per depth,
    /// root excluded), as far as the lifting records tell.
    fn known_vanishing(&self, p: &Polynomial, path: &[NodeId]) -> Option<bool> {
        let level = p
            .vars()
            .into_iter()
            .filter_map(|v| self.level_of(v))
            .min()?;
        let up = UnivariatePolynomial::new(p.normalized(), self.variables[level]);
        let id = self.levels[level].find(&up, &self.pool)?;
        let node = *path.get(self.dimension() - level - 1)?;
        self.tree.vanishes(node, id)
    }

    /// Evaluate the constraints at the point ending in `node`.
    fn check_leaf(&mut self, node: NodeId, search: &mut Search<'_>) -> CadResult<bool> {
        if self.interrupt_requested() {
            self.interrupted = true;
            return Ok(false);
        }
        search.explored.insert(node);
        if search.skip == Some(node) {
            return Ok(false);
        }
        self.stats.leaves_checked += 1;

        let mut coords = self.tree.values_on_path(node);
        coords.reverse();
        if coords.len() != self.dimension() {
            warn!(found = coords.len(), "ignoring incomplete sample");
            return Ok(false);
        }
        if search.check_bounds {
            if let Some(b) = &search.bounds {
                if !bounds::contains_point(b, &coords) {
                    return Ok(false);
                }
            }
        }
        let assignment: FxHashMap<Var, RealAlgebraicNumber> =
            self.variables.iter().copied().zip(coords).collect();
        let path = self.tree.path(node);

        let mut satisfied = Vec::with_capacity(search.constraints.len());
        let mut all = true;
        for c in search.constraints {
            let ok = match self.known_vanishing(c.polynomial(), &path) {
                Some(true) => c.admits(Sign::Zero),
                Some(false) => c.admits(nonzero_sign_at(c.polynomial(), &assignment)?),
                None => c.satisfied_by(&assignment)?,
            };
            satisfied.push(ok);
            if !ok {
                all = false;
                if search.graph.is_none() {
                    break;
                }
            }
        }
        if all {
            search.found = Some(node);
            return Ok(true);
        }
        if let Some(graph) = search.graph.as_deref_mut() {
            graph.add_sample(&satisfied);
        }
        Ok(false)
    }
}
