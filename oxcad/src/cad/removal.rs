//! Removing input polynomials and unused variables.

use super::Cad;
use crate::elimination_set::PolyId;
use oxcad_math::{Polynomial, UnivariatePolynomial};
use rustc_hash::FxHashSet;
use tracing::debug;

impl Cad {
    /// Remove an input polynomial together with every projection polynomial
    /// that only it produced.
    ///
    /// Samples created from removed polynomials stay in the tree; every level
    /// left without polynomials has its samples collapsed into one per cell
    /// above. Returns false if `p` was never scheduled.
    pub fn remove_polynomial(&mut self, p: &Polynomial) -> bool {
        if p.is_constant() {
            return false;
        }
        let p = p.normalized();
        if let Some(pos) = self.scheduled.iter().position(|q| *q == p) {
            self.scheduled.remove(pos);
            return true;
        }
        if !self.originals.remove(&p) {
            return false;
        }
        let Some(level) = p
            .vars()
            .iter()
            .filter_map(|&v| self.level_of(v))
            .min()
        else {
            return true;
        };
        let up = UnivariatePolynomial::new(p, self.variables[level]);
        let Some(id) = self.levels[level].find(&up, &self.pool) else {
            return true;
        };
        if !self.levels[level].is_original(id) {
            return true;
        }

        let mut removed: FxHashSet<PolyId> = FxHashSet::default();
        if self.levels[level].remove_original(id) {
            removed.insert(id);
            let mut frontier = vec![id];
            for l in level + 1..self.dimension() {
                let mut next = Vec::new();
                for &parent in &frontier {
                    next.extend(self.levels[l].remove_by_parent(parent));
                }
                if next.is_empty() {
                    break;
                }
                removed.extend(next.iter().copied());
                frontier = next;
            }
        }
        debug!(level, removed = removed.len(), "removed polynomial");
        if removed.is_empty() {
            return true;
        }

        self.tree.forget_lifted(&removed);
        self.dropped.retain(|d| {
            !removed.contains(&d.id) && !d.parents.ids().iter().any(|q| removed.contains(q))
        });
        if self.dropped.is_empty() {
            self.dropped_bounds = None;
        }
        self.collapse_empty_levels();
        if self.settings.trim_variables {
            self.trim_variables();
        }
        true
    }

    /// Merge the samples of every empty level and follow the leftmost path
    /// with the trace.
    fn collapse_empty_levels(&mut self) {
        let n = self.dimension();
        for level in 0..n {
            if self.levels[level].is_empty() && !self.levels[level].bounded {
                self.tree.merge_children_at_depth(n - level);
            }
        }
        self.reset_trace();
    }

    fn reset_trace(&mut self) {
        let n = self.dimension();
        let mut trace: Vec<_> = self.tree.leftmost_path().into_iter().map(Some).collect();
        trace.resize(n + 1, None);
        self.trace = trace;
    }

    /// Drop the variables whose level is empty and which no polynomial on
    /// an earlier level mentions.
    fn trim_variables(&mut self) {
        while let Some(level) = (0..self.dimension()).rev().find(|&l| self.is_unused_level(l)) {
            let n = self.dimension();
            let var = self.variables.remove(level);
            self.levels.remove(level);
            self.tree.remove_depth(n - level);
            for d in &mut self.dropped {
                if d.level > level {
                    d.level -= 1;
                }
            }
            debug!(var, level, "trimmed variable");
        }
        self.reset_trace();
    }

    fn is_unused_level(&self, level: usize) -> bool {
        let set = &self.levels[level];
        if !set.is_empty() || set.bounded || self.dropped.iter().any(|d| d.level == level) {
            return false;
        }
        let var = self.variables[level];
        let mentioned_below = self.levels[..level]
            .iter()
            .flat_map(|l| l.sorted(&self.pool))
            .chain(self.dropped.iter().filter(|d| d.level < level).map(|d| d.id))
            .any(|id| self.pool[id].polynomial().vars().contains(&var));
        !mentioned_below && !self.scheduled.iter().any(|q| q.vars().contains(&var))
    }
}
