//! Elimination sets: the projection polynomials of one CAD level.
//!
//! Polynomials are interned in a [`PolyPool`] and addressed by [`PolyId`].
//! Each level records where its polynomials came from ([`Parents`]) so that
//! removing an input polynomial can cascade to everything derived from it.
//!
//! Three work queues drive the incremental algorithm:
//!
//! - the single elimination queue (coefficients and discriminants still to
//!   be computed),
//! - the paired elimination queue (resultants with siblings still to be
//!   computed),
//! - the lifting queue (polynomials not yet used for every sample of the
//!   level above).
//!
//! Queues are kept sorted under a [`PolynomialOrder`] completed by handle
//! order, so processing is deterministic across runs.

use crate::projection::{paired_projection, simplify, single_projection};
use crate::settings::{CadSettings, PolynomialOrder};
use oxcad_math::{UnivariatePolynomial, Var};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::ops::Index;
use tracing::trace;

/// Stable handle of an interned polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolyId(u32);

impl PolyId {
    /// Index into the pool.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hash-consing arena of polynomials with their main variable.
#[derive(Debug, Clone, Default)]
pub struct PolyPool {
    polys: Vec<UnivariatePolynomial>,
    index: FxHashMap<UnivariatePolynomial, PolyId>,
}

impl PolyPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of `p`, interning it if needed.
    pub fn intern(&mut self, p: UnivariatePolynomial) -> PolyId {
        if let Some(&id) = self.index.get(&p) {
            return id;
        }
        let id = PolyId(self.polys.len() as u32);
        self.polys.push(p.clone());
        self.index.insert(p, id);
        id
    }

    /// Handle of `p` if it was interned before.
    pub fn find(&self, p: &UnivariatePolynomial) -> Option<PolyId> {
        self.index.get(p).copied()
    }

    /// The polynomial behind a handle.
    #[inline]
    pub fn get(&self, id: PolyId) -> &UnivariatePolynomial {
        &self.polys[id.index()]
    }

    /// Number of interned polynomials.
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    /// Check whether nothing was interned.
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    fn compare(&self, order: PolynomialOrder, a: PolyId, b: PolyId) -> Ordering {
        order
            .compare(self.get(a), self.get(b))
            .then_with(|| a.cmp(&b))
    }
}

impl Index<PolyId> for PolyPool {
    type Output = UnivariatePolynomial;

    fn index(&self, id: PolyId) -> &UnivariatePolynomial {
        self.get(id)
    }
}

/// Provenance of a projection polynomial.
///
/// Parents live one level above the polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parents {
    /// An input polynomial.
    Original,
    /// Derived from one polynomial (coefficient, discriminant or copy).
    Single(PolyId),
    /// Resultant of two polynomials, smaller handle first.
    Pair(PolyId, PolyId),
}

impl Parents {
    /// Provenance of the resultant of `a` and `b`.
    pub fn pair(a: PolyId, b: PolyId) -> Self {
        if a <= b {
            Parents::Pair(a, b)
        } else {
            Parents::Pair(b, a)
        }
    }

    /// The parent handles.
    pub fn ids(&self) -> SmallVec<[PolyId; 2]> {
        match *self {
            Parents::Original => SmallVec::new(),
            Parents::Single(a) => smallvec::smallvec![a],
            Parents::Pair(a, b) => smallvec::smallvec![a, b],
        }
    }

    /// Check whether `id` is one of the parents.
    pub fn contains(&self, id: PolyId) -> bool {
        match *self {
            Parents::Original => false,
            Parents::Single(a) => a == id,
            Parents::Pair(a, b) => a == id || b == id,
        }
    }
}

/// Result of eliminating one polynomial into the next level.
#[derive(Debug, Clone, Default)]
pub struct EliminationOutcome {
    /// Polynomials newly added to the destination.
    pub inserted: Vec<PolyId>,
    /// Single projection candidates rejected by the caller's filter.
    pub dropped: Vec<(PolyId, Parents)>,
    /// Number of resultants computed.
    pub resultants: u64,
}

/// Projection polynomials of one level with provenance and work queues.
#[derive(Debug, Clone, Default)]
pub struct EliminationSet {
    polynomials: FxHashSet<PolyId>,
    parents: FxHashMap<PolyId, SmallVec<[Parents; 2]>>,
    children: FxHashMap<PolyId, FxHashSet<PolyId>>,
    single_queue: VecDeque<PolyId>,
    paired_queue: VecDeque<PolyId>,
    lifting_queue: VecDeque<PolyId>,
    lifting_queue_reset: VecDeque<PolyId>,
    /// Polynomials already paired with their siblings, in pairing order.
    paired: Vec<PolyId>,
    elimination_order: PolynomialOrder,
    lifting_order: PolynomialOrder,
    /// Set while bound-driven elimination has withheld polynomials from
    /// this level.
    pub bounded: bool,
}

impl EliminationSet {
    /// Create an empty set with the given queue orders.
    pub fn new(elimination_order: PolynomialOrder, lifting_order: PolynomialOrder) -> Self {
        Self {
            elimination_order,
            lifting_order,
            ..Self::default()
        }
    }

    /// Number of polynomials.
    pub fn len(&self) -> usize {
        self.polynomials.len()
    }

    /// Check whether the level has no polynomials.
    pub fn is_empty(&self) -> bool {
        self.polynomials.is_empty()
    }

    /// Check whether `id` belongs to the level.
    #[inline]
    pub fn contains(&self, id: PolyId) -> bool {
        self.polynomials.contains(&id)
    }

    /// The polynomials in lifting order.
    pub fn sorted(&self, pool: &PolyPool) -> Vec<PolyId> {
        let mut ids: Vec<PolyId> = self.polynomials.iter().copied().collect();
        ids.sort_by(|&a, &b| pool.compare(self.lifting_order, a, b));
        ids
    }

    /// Insert a polynomial with the given provenance.
    ///
    /// A polynomial already present only gains the provenance entry. New
    /// polynomials join the paired and lifting queues, and the single
    /// elimination queue unless `avoid_single` is set. Returns whether the
    /// polynomial is new.
    pub fn insert(&mut self, id: PolyId, parents: Parents, avoid_single: bool, pool: &PolyPool) -> bool {
        let entries = self.parents.entry(id).or_default();
        if !entries.contains(&parents) {
            entries.push(parents);
            for parent in parents.ids() {
                self.children.entry(parent).or_default().insert(id);
            }
        }
        if !self.polynomials.insert(id) {
            return false;
        }
        let (eo, lo) = (self.elimination_order, self.lifting_order);
        if !avoid_single {
            insert_sorted(&mut self.single_queue, id, |a, b| pool.compare(eo, a, b));
        }
        if !self.paired.contains(&id) {
            insert_sorted(&mut self.paired_queue, id, |a, b| pool.compare(eo, a, b));
        }
        insert_sorted(&mut self.lifting_queue, id, |a, b| pool.compare(lo, a, b));
        insert_sorted(&mut self.lifting_queue_reset, id, |a, b| pool.compare(lo, a, b));
        true
    }

    /// Insert several polynomials with the same provenance; returns the new
    /// ones.
    pub fn insert_all(
        &mut self,
        ids: impl IntoIterator<Item = PolyId>,
        parents: Parents,
        avoid_single: bool,
        pool: &PolyPool,
    ) -> Vec<PolyId> {
        ids.into_iter()
            .filter(|&id| self.insert(id, parents, avoid_single, pool))
            .collect()
    }

    /// Remove a polynomial with its provenance. Returns 1 if it was present.
    pub fn erase(&mut self, id: PolyId) -> usize {
        self.detach(id);
        if let Some(entries) = self.parents.remove(&id) {
            for parent in entries.iter().flat_map(Parents::ids) {
                if let Some(set) = self.children.get_mut(&parent) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
        }
        usize::from(self.polynomials.remove(&id))
    }

    /// Take a polynomial out of the set and its queues but keep its
    /// provenance, so removing a parent still reports it.
    pub(crate) fn retire(&mut self, id: PolyId) {
        self.detach(id);
        self.polynomials.remove(&id);
    }

    fn detach(&mut self, id: PolyId) {
        for queue in [
            &mut self.single_queue,
            &mut self.paired_queue,
            &mut self.lifting_queue,
            &mut self.lifting_queue_reset,
        ] {
            queue.retain(|&q| q != id);
        }
        self.paired.retain(|&q| q != id);
    }

    /// Drop the input-polynomial provenance of `id`.
    ///
    /// The polynomial is erased if nothing else derives it. Returns whether
    /// it was erased.
    pub fn remove_original(&mut self, id: PolyId) -> bool {
        let Some(entries) = self.parents.get_mut(&id) else {
            return false;
        };
        entries.retain(|p| *p != Parents::Original);
        if entries.is_empty() {
            self.erase(id);
            true
        } else {
            false
        }
    }

    /// Remove every polynomial that loses all of its provenance when
    /// `parent` disappears. Returns the removed polynomials, including ones
    /// already taken out of the set, so callers can cascade further.
    pub fn remove_by_parent(&mut self, parent: PolyId) -> Vec<PolyId> {
        let Some(children) = self.children.remove(&parent) else {
            return Vec::new();
        };
        let mut children: Vec<PolyId> = children.into_iter().collect();
        children.sort_unstable();
        let mut removed = Vec::new();
        for child in children {
            let Some(entries) = self.parents.get_mut(&child) else {
                continue;
            };
            let mut others: SmallVec<[PolyId; 2]> = SmallVec::new();
            entries.retain(|p| {
                if p.contains(parent) {
                    others.extend(p.ids().into_iter().filter(|&q| q != parent));
                    false
                } else {
                    true
                }
            });
            let orphaned = entries.is_empty();
            for other in others {
                let still_linked = self
                    .parents
                    .get(&child)
                    .is_some_and(|e| e.iter().any(|p| p.contains(other)));
                if !still_linked {
                    if let Some(set) = self.children.get_mut(&other) {
                        set.remove(&child);
                    }
                }
            }
            if orphaned {
                self.erase(child);
                removed.push(child);
            }
        }
        removed
    }

    /// Handle of `p` if it belongs to the level.
    pub fn find(&self, p: &UnivariatePolynomial, pool: &PolyPool) -> Option<PolyId> {
        pool.find(p).filter(|id| self.contains(*id))
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.polynomials.clear();
        self.parents.clear();
        self.children.clear();
        self.single_queue.clear();
        self.paired_queue.clear();
        self.lifting_queue.clear();
        self.lifting_queue_reset.clear();
        self.paired.clear();
        self.bounded = false;
    }

    /// Check whether `id` was derived from another polynomial.
    pub fn has_parents(&self, id: PolyId) -> bool {
        self.parents
            .get(&id)
            .is_some_and(|e| e.iter().any(|p| *p != Parents::Original))
    }

    /// Check whether `id` is an input polynomial of this level.
    pub fn is_original(&self, id: PolyId) -> bool {
        self.parents
            .get(&id)
            .is_some_and(|e| e.contains(&Parents::Original))
    }

    /// Provenance entries of `id`.
    pub fn parents_of(&self, id: PolyId) -> &[Parents] {
        self.parents.get(&id).map_or(&[], |e| e.as_slice())
    }

    /// Change the elimination order and resort the elimination queues.
    pub fn set_elimination_order(&mut self, order: PolynomialOrder, pool: &PolyPool) {
        self.elimination_order = order;
        for queue in [&mut self.single_queue, &mut self.paired_queue] {
            queue
                .make_contiguous()
                .sort_by(|&a, &b| pool.compare(order, a, b));
        }
    }

    /// Change the lifting order and resort the lifting queues.
    pub fn set_lifting_order(&mut self, order: PolynomialOrder, pool: &PolyPool) {
        self.lifting_order = order;
        for queue in [&mut self.lifting_queue, &mut self.lifting_queue_reset] {
            queue
                .make_contiguous()
                .sort_by(|&a, &b| pool.compare(order, a, b));
        }
    }

    /// Take the next polynomial awaiting single elimination.
    pub fn pop_next_single_elimination_position(&mut self) -> Option<PolyId> {
        self.single_queue.pop_front()
    }

    /// Take the next polynomial awaiting only paired elimination.
    pub fn pop_next_paired_elimination_position(&mut self) -> Option<PolyId> {
        self.paired_queue.pop_front()
    }

    /// Check whether no single elimination is pending.
    pub fn empty_single_elimination_queue(&self) -> bool {
        self.single_queue.is_empty()
    }

    /// Check whether no paired elimination is pending.
    pub fn empty_paired_elimination_queue(&self) -> bool {
        self.paired_queue.is_empty()
    }

    /// Check whether any elimination is pending.
    pub fn has_elimination_work(&self) -> bool {
        !self.single_queue.is_empty() || !self.paired_queue.is_empty()
    }

    /// Next polynomial awaiting lifting.
    pub fn next_lifting_position(&self) -> Option<PolyId> {
        self.lifting_queue.front().copied()
    }

    /// Drop the front of the lifting queue.
    pub fn pop_lifting_position(&mut self) -> Option<PolyId> {
        self.lifting_queue.pop_front()
    }

    /// Check whether no lifting is pending.
    pub fn empty_lifting_queue(&self) -> bool {
        self.lifting_queue.is_empty()
    }

    /// Check whether every polynomial is pending for lifting.
    pub fn full_lifting_queue(&self) -> bool {
        self.lifting_queue.len() == self.polynomials.len()
    }

    /// Polynomials pending for lifting, front first.
    pub fn lifting_positions(&self) -> impl Iterator<Item = PolyId> + '_ {
        self.lifting_queue.iter().copied()
    }

    /// Restore the lifting queue to the last saved state.
    pub fn reset_lifting_positions(&mut self) {
        self.lifting_queue = self.lifting_queue_reset.clone();
    }

    /// Put every polynomial back into the lifting queue.
    pub fn reset_lifting_positions_fully(&mut self, pool: &PolyPool) {
        self.lifting_queue = self.sorted(pool).into();
        self.lifting_queue_reset = self.lifting_queue.clone();
    }

    /// Save the current lifting queue as the reset state.
    pub fn set_lifting_positions_reset(&mut self) {
        self.lifting_queue_reset = self.lifting_queue.clone();
    }

    /// Mark every lifting position as consumed.
    pub fn clear_lifting_queue(&mut self) {
        self.lifting_queue.clear();
    }

    /// Eliminate `p` into `dest`, whose main variable is `var`.
    ///
    /// A polynomial without the main variable is copied to `dest` (numbers
    /// are discarded) and, with `remove_constants`, taken out of this set.
    /// Otherwise its single projection goes through `keep_single` and it is
    /// paired with every sibling paired before.
    pub fn eliminate_into(
        &mut self,
        p: PolyId,
        dest: &mut EliminationSet,
        var: Var,
        settings: &CadSettings,
        pool: &mut PolyPool,
        keep_single: &mut dyn FnMut(&UnivariatePolynomial) -> bool,
    ) -> EliminationOutcome {
        let mut out = EliminationOutcome::default();
        if self.move_constant(p, dest, var, settings, pool, &mut out) {
            return out;
        }
        let up = pool[p].clone();
        for poly in single_projection(&up) {
            for f in simplify(&poly, var, settings) {
                if let Some(id) = dest.find(&f, pool) {
                    dest.insert(id, Parents::Single(p), false, pool);
                    continue;
                }
                let keep = keep_single(&f);
                let id = pool.intern(f);
                if !keep {
                    out.dropped.push((id, Parents::Single(p)));
                } else if dest.insert(id, Parents::Single(p), false, pool) {
                    out.inserted.push(id);
                }
            }
        }
        self.pair_into(p, dest, var, settings, pool, &mut out);
        out
    }

    /// Pair `p` with its siblings without computing its single projection.
    pub fn eliminate_paired_into(
        &mut self,
        p: PolyId,
        dest: &mut EliminationSet,
        var: Var,
        settings: &CadSettings,
        pool: &mut PolyPool,
    ) -> EliminationOutcome {
        let mut out = EliminationOutcome::default();
        if !self.move_constant(p, dest, var, settings, pool, &mut out) {
            self.pair_into(p, dest, var, settings, pool, &mut out);
        }
        out
    }

    fn move_constant(
        &mut self,
        p: PolyId,
        dest: &mut EliminationSet,
        var: Var,
        settings: &CadSettings,
        pool: &mut PolyPool,
        out: &mut EliminationOutcome,
    ) -> bool {
        let up = &pool[p];
        if !up.is_constant() {
            return false;
        }
        let moved = (!up.is_numeric()).then(|| up.switch_main_var(var));
        if let Some(moved) = moved {
            let moved = pool.intern(moved);
            trace!("copying {:?} to the next level", pool[moved]);
            if dest.insert(moved, Parents::Single(p), false, pool) {
                out.inserted.push(moved);
            }
        }
        if settings.remove_constants {
            self.retire(p);
        }
        true
    }

    fn pair_into(
        &mut self,
        p: PolyId,
        dest: &mut EliminationSet,
        var: Var,
        settings: &CadSettings,
        pool: &mut PolyPool,
        out: &mut EliminationOutcome,
    ) {
        self.paired_queue.retain(|&q| q != p);
        if self.paired.contains(&p) {
            return;
        }
        let partners: Vec<PolyId> = self
            .paired
            .iter()
            .copied()
            .filter(|q| self.polynomials.contains(q))
            .collect();
        let up = pool[p].clone();
        for q in partners {
            let r = paired_projection(&up, &pool[q]);
            out.resultants += 1;
            let parents = Parents::pair(p, q);
            for f in simplify(&r, var, settings) {
                let id = pool.intern(f);
                if dest.insert(id, parents, false, pool) {
                    out.inserted.push(id);
                }
            }
        }
        self.paired.push(p);
    }

    /// Check the queue invariants: no duplicates, and only members queued.
    pub fn check_invariants(&self) -> bool {
        [
            &self.single_queue,
            &self.paired_queue,
            &self.lifting_queue,
            &self.lifting_queue_reset,
        ]
        .iter()
        .all(|queue| {
            let mut seen = FxHashSet::default();
            queue
                .iter()
                .all(|id| seen.insert(*id) && self.polynomials.contains(id))
        })
    }
}

fn insert_sorted(queue: &mut VecDeque<PolyId>, id: PolyId, cmp: impl Fn(PolyId, PolyId) -> Ordering) {
    if queue.contains(&id) {
        return;
    }
    let pos = queue.partition_point(|&q| cmp(q, id) == Ordering::Less);
    queue.insert(pos, id);
}
