//! Candidate samples of one lifting step.
//!
//! [`construct_samples`] merges the roots of one polynomial into the values
//! already present at a tree level and adds one intermediate sample to every
//! open cell that does not have one yet. [`SampleSet`] orders the resulting
//! tree nodes for exploration according to a [`SamplePolicy`].

use crate::sample_tree::NodeId;
use crate::settings::{SampleFilter, SamplePolicy};
use oxcad_math::algebraic::number::RanValue;
use oxcad_math::{BoundType, ExactInterval, RealAlgebraicNumber};
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::debug;

/// A sample created by [`construct_samples`].
#[derive(Debug, Clone)]
pub struct NewSample {
    /// The value.
    pub value: RealAlgebraicNumber,
    /// The sample lies outside the active bound and must not be explored.
    pub discarded: bool,
}

/// Result of merging roots into a level.
#[derive(Debug, Clone, Default)]
pub struct SampleConstruction {
    /// Samples to add, in increasing order.
    pub samples: Vec<NewSample>,
    /// Existing samples (by position in the input) whose value gained root
    /// status or an exact representation.
    pub upgrades: Vec<(usize, RealAlgebraicNumber)>,
}

impl SampleConstruction {
    /// Number of new samples that may be explored.
    pub fn admissible(&self) -> usize {
        self.samples.iter().filter(|s| !s.discarded).count()
    }
}

/// Merge `roots` (increasing, tagged as roots) into `current` (the strictly
/// increasing values present at the level) and add the missing intermediate
/// samples.
///
/// Every open cell between two consecutive roots, and the two unbounded
/// cells at the ends, ends up with at least one non-root sample. When a
/// bound is given, intermediate samples are taken inside the bound whenever
/// the cell meets it; samples that cannot be are returned as discarded.
pub fn construct_samples(
    roots: &[RealAlgebraicNumber],
    current: &[RealAlgebraicNumber],
    bound: Option<&ExactInterval>,
) -> SampleConstruction {
    let mut result = SampleConstruction::default();

    // Merged view of the level: (value, index into current if existing).
    let mut merged: Vec<(RealAlgebraicNumber, Option<usize>)> = current
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, v)| (v, Some(i)))
        .collect();

    for root in roots {
        let pos = merged.partition_point(|(v, _)| v.cmp_value(root) == Ordering::Less);
        match merged.get_mut(pos) {
            Some((existing, origin)) if existing.cmp_value(root) == Ordering::Equal => {
                let upgrade_numeric = root.is_numeric() && !existing.is_numeric();
                if upgrade_numeric || !existing.is_root() {
                    let mut value = if upgrade_numeric { root.clone() } else { existing.clone() };
                    value.mark_root();
                    *existing = value.clone();
                    if let Some(i) = *origin {
                        result.upgrades.push((i, value));
                    }
                }
            }
            _ => {
                let mut value = root.clone();
                value.mark_root();
                merged.insert(pos, (value, None));
            }
        }
    }

    let fresh: Vec<RealAlgebraicNumber> = merged
        .iter()
        .filter(|(_, origin)| origin.is_none())
        .map(|(v, _)| v.clone())
        .collect();
    let mut samples: Vec<NewSample> = fresh
        .into_iter()
        .map(|value| {
            let discarded = bound.is_some_and(|b| !value.is_in(b));
            NewSample { value, discarded }
        })
        .collect();

    if merged.is_empty() {
        samples.push(sample_in_cell(None, None, bound));
    } else {
        // Walk the cells delimited by root entries.
        let mut lower: Option<&RealAlgebraicNumber> = None;
        let mut witnessed = false;
        for (value, _) in &merged {
            if value.is_root() {
                if !witnessed {
                    samples.push(sample_in_cell(lower, Some(value), bound));
                }
                lower = Some(value);
                witnessed = false;
            } else {
                witnessed = true;
            }
        }
        if !witnessed {
            samples.push(sample_in_cell(lower, None, bound));
        }
    }

    samples.sort_by(|a, b| a.value.cmp_value(&b.value));
    debug!(
        roots = roots.len(),
        new = samples.len(),
        upgraded = result.upgrades.len(),
        "constructed samples"
    );
    result.samples = samples;
    result
}

/// Lower end of the open cell above `value`.
fn cell_lower(value: Option<&RealAlgebraicNumber>) -> (BigRational, BoundType) {
    match value.map(RealAlgebraicNumber::value) {
        None => (BigRational::zero(), BoundType::Infinity),
        Some(RanValue::Numeric(v)) => (v.clone(), BoundType::Strict),
        Some(RanValue::Interval(i)) => (i.upper().clone(), BoundType::Weak),
    }
}

/// Upper end of the open cell below `value`.
fn cell_upper(value: Option<&RealAlgebraicNumber>) -> (BigRational, BoundType) {
    match value.map(RealAlgebraicNumber::value) {
        None => (BigRational::zero(), BoundType::Infinity),
        Some(RanValue::Numeric(v)) => (v.clone(), BoundType::Strict),
        Some(RanValue::Interval(i)) => (i.lower().clone(), BoundType::Weak),
    }
}

/// A rational interval inside the open cell `(lower, upper)`.
///
/// Isolating intervals of the ends are refined until the interval is
/// nonempty. `None` if the ends are not strictly ordered.
fn cell_interval(
    lower: Option<&RealAlgebraicNumber>,
    upper: Option<&RealAlgebraicNumber>,
) -> Option<ExactInterval> {
    let mut lo = lower.cloned();
    let mut hi = upper.cloned();
    loop {
        let (l, lt) = cell_lower(lo.as_ref());
        let (u, ut) = cell_upper(hi.as_ref());
        let cell = ExactInterval::new(l, lt, u, ut);
        if !cell.is_empty() {
            return Some(cell);
        }
        let refinable = |v: &Option<RealAlgebraicNumber>| v.as_ref().is_some_and(|v| !v.is_numeric());
        if !refinable(&lo) && !refinable(&hi) {
            return None;
        }
        if let Some(v) = lo.as_mut() {
            v.refine();
        }
        if let Some(v) = hi.as_mut() {
            v.refine();
        }
    }
}

fn sample_in_cell(
    lower: Option<&RealAlgebraicNumber>,
    upper: Option<&RealAlgebraicNumber>,
    bound: Option<&ExactInterval>,
) -> NewSample {
    let cell = cell_interval(lower, upper).unwrap_or_else(ExactInterval::unbounded);
    if let Some(bound) = bound {
        let inside = cell.intersect(bound);
        if !inside.is_empty() {
            return NewSample {
                value: RealAlgebraicNumber::from_rational(inside.sample()),
                discarded: false,
            };
        }
    }
    NewSample {
        value: RealAlgebraicNumber::from_rational(cell.sample()),
        discarded: bound.is_some(),
    }
}

const KINDS: usize = 4;

#[inline]
fn kind_of(value: &RealAlgebraicNumber) -> usize {
    (usize::from(value.is_numeric()) << 1) | usize::from(value.is_root())
}

#[inline]
fn is_numeric_kind(kind: usize) -> bool {
    kind & 2 != 0
}

#[inline]
fn is_root_kind(kind: usize) -> bool {
    kind & 1 != 0
}

/// Kinds in order of preference under a policy.
fn preference(policy: SamplePolicy) -> [usize; KINDS] {
    // kind = numeric << 1 | root
    match policy {
        SamplePolicy::InsertionOrder | SamplePolicy::PreferNumeric => [2, 3, 0, 1],
        SamplePolicy::PreferRoots => [3, 1, 2, 0],
        SamplePolicy::PreferNonRoots => [2, 0, 3, 1],
    }
}

/// Pending sample nodes of one lifting step.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    filter: SampleFilter,
    by_kind: [VecDeque<NodeId>; KINDS],
    in_order: VecDeque<NodeId>,
    kind: FxHashMap<NodeId, usize>,
    taken: FxHashSet<NodeId>,
}

impl SampleSet {
    /// An empty set that only accepts samples passing `filter`.
    pub fn new(filter: SampleFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Number of pending samples.
    pub fn len(&self) -> usize {
        self.kind.len()
    }

    /// Check whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// Check whether a node is pending.
    pub fn contains(&self, node: NodeId) -> bool {
        self.kind.contains_key(&node)
    }

    /// Add a node carrying `value`. Returns false if the filter rejects it or
    /// it was already added.
    pub fn insert(&mut self, node: NodeId, value: &RealAlgebraicNumber) -> bool {
        if !self.filter.admits(value.is_root()) || self.taken.contains(&node) || self.contains(node) {
            return false;
        }
        let kind = kind_of(value);
        self.kind.insert(node, kind);
        self.by_kind[kind].push_back(node);
        self.in_order.push_back(node);
        true
    }

    /// Reclassify a pending node after its value was upgraded.
    pub fn update(&mut self, node: NodeId, value: &RealAlgebraicNumber) {
        let Some(&old) = self.kind.get(&node) else {
            return;
        };
        if !self.filter.admits(value.is_root()) {
            self.kind.remove(&node);
            self.taken.insert(node);
            return;
        }
        let kind = kind_of(value);
        if kind != old {
            self.kind.insert(node, kind);
            self.by_kind[kind].push_back(node);
        }
    }

    /// Check whether a sample of the kind preferred by `policy` is pending.
    pub fn has_preferred(&self, policy: SamplePolicy) -> bool {
        match policy {
            SamplePolicy::InsertionOrder => !self.is_empty(),
            SamplePolicy::PreferNumeric => self.kind.values().any(|&k| is_numeric_kind(k)),
            SamplePolicy::PreferRoots => self.kind.values().any(|&k| is_root_kind(k)),
            SamplePolicy::PreferNonRoots => self.kind.values().any(|&k| !is_root_kind(k)),
        }
    }

    /// Remove and return the next sample under `policy`.
    pub fn pop(&mut self, policy: SamplePolicy) -> Option<NodeId> {
        let node = if policy == SamplePolicy::InsertionOrder {
            self.pop_in_order()
        } else {
            preference(policy)
                .into_iter()
                .find_map(|kind| self.pop_kind(kind))
        }?;
        self.kind.remove(&node);
        self.taken.insert(node);
        Some(node)
    }

    fn pop_in_order(&mut self) -> Option<NodeId> {
        while let Some(node) = self.in_order.pop_front() {
            if self.kind.contains_key(&node) {
                return Some(node);
            }
        }
        None
    }

    fn pop_kind(&mut self, kind: usize) -> Option<NodeId> {
        while let Some(node) = self.by_kind[kind].pop_front() {
            if self.kind.get(&node) == Some(&kind) {
                return Some(node);
            }
        }
        None
    }

    /// Drop stale queue entries.
    pub fn simplify(&mut self) {
        let kind = &self.kind;
        self.in_order.retain(|n| kind.contains_key(n));
        for (k, queue) in self.by_kind.iter_mut().enumerate() {
            queue.retain(|n| kind.get(n) == Some(&k));
        }
    }
}
