//! Constraint/sample incidence recorded during an unsatisfiable check.
//!
//! Every evaluated full-dimensional sample violates at least one constraint
//! when the check fails. A set of constraints that together cover all
//! samples is an infeasible subset of the input, which upstream solvers use
//! as an unsat core. The cover is computed greedily by vertex degree.

use std::fmt;

/// Which constraints each evaluated sample satisfied.
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    num_constraints: usize,
    /// `satisfied[s][c]` for sample s and constraint c.
    satisfied: Vec<Vec<bool>>,
    /// Samples not yet covered by a removed constraint vertex.
    remaining: Vec<bool>,
    removed: Vec<bool>,
}

impl ConflictGraph {
    /// A graph over `num_constraints` constraint vertices without samples.
    #[must_use]
    pub fn new(num_constraints: usize) -> Self {
        Self {
            num_constraints,
            satisfied: Vec::new(),
            remaining: Vec::new(),
            removed: vec![false; num_constraints],
        }
    }

    /// Number of constraint vertices.
    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    /// Number of recorded samples.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.satisfied.len()
    }

    /// Record a sample with its per-constraint outcome.
    pub fn add_sample(&mut self, satisfied: &[bool]) {
        debug_assert_eq!(satisfied.len(), self.num_constraints);
        let mut row = satisfied.to_vec();
        row.resize(self.num_constraints, false);
        self.satisfied.push(row);
        self.remaining.push(true);
    }

    /// Number of remaining samples violating constraint `c`.
    pub fn degree(&self, c: usize) -> usize {
        if self.removed.get(c).copied().unwrap_or(true) {
            return 0;
        }
        self.satisfied
            .iter()
            .zip(&self.remaining)
            .filter(|(row, &live)| live && !row[c])
            .count()
    }

    /// Constraint violated by the most remaining samples. Ties go to the
    /// lowest index. `None` if no constraint covers a remaining sample.
    pub fn max_degree_constraint(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for c in 0..self.num_constraints {
            let d = self.degree(c);
            if d > 0 && best.map_or(true, |(_, bd)| d > bd) {
                best = Some((c, d));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Remove constraint `c` and every sample it violates.
    pub fn remove_constraint_vertex(&mut self, c: usize) {
        if c >= self.num_constraints {
            return;
        }
        for (row, live) in self.satisfied.iter().zip(self.remaining.iter_mut()) {
            if !row[c] {
                *live = false;
            }
        }
        self.removed[c] = true;
    }

    /// Check whether some sample is not yet covered.
    pub fn has_remaining_samples(&self) -> bool {
        self.remaining.iter().any(|&live| live)
    }

    /// Check whether some recorded sample satisfies both `a` and `b`.
    pub fn jointly_satisfied(&self, a: usize, b: usize) -> bool {
        if a >= self.num_constraints || b >= self.num_constraints {
            return false;
        }
        self.satisfied.iter().any(|row| row[a] && row[b])
    }

    /// Greedy cover of all samples by constraints, sorted by index.
    ///
    /// Samples satisfying every constraint cannot be covered and are
    /// ignored.
    pub fn infeasible_subset(&self) -> Vec<usize> {
        let mut graph = self.clone();
        let mut subset = Vec::new();
        while graph.has_remaining_samples() {
            let Some(c) = graph.max_degree_constraint() else {
                break;
            };
            graph.remove_constraint_vertex(c);
            subset.push(c);
        }
        subset.sort_unstable();
        subset
    }
}

impl fmt::Display for ConflictGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "conflict graph: {} constraints, {} samples",
            self.num_constraints,
            self.num_samples()
        )?;
        for (s, row) in self.satisfied.iter().enumerate() {
            let bits: String = row.iter().map(|&b| if b { '1' } else { '0' }).collect();
            let mark = if self.remaining[s] { "" } else { " (covered)" };
            writeln!(f, "  s{}: {}{}", s, bits, mark)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ConflictGraph {
        let mut g = ConflictGraph::new(3);
        g.add_sample(&[true, false, true]);
        g.add_sample(&[false, true, true]);
        g.add_sample(&[true, false, false]);
        g
    }

    #[test]
    fn test_degrees() {
        let g = graph();
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(2), 1);
        assert_eq!(g.degree(7), 0);
        assert_eq!(g.max_degree_constraint(), Some(1));
    }

    #[test]
    fn test_remove_vertex() {
        let mut g = graph();
        g.remove_constraint_vertex(1);
        assert!(g.has_remaining_samples());
        assert_eq!(g.degree(1), 0);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(2), 0);
        g.remove_constraint_vertex(0);
        assert!(!g.has_remaining_samples());
        assert_eq!(g.max_degree_constraint(), None);
    }

    #[test]
    fn test_joint_satisfaction() {
        let g = graph();
        assert!(g.jointly_satisfied(0, 2));
        assert!(g.jointly_satisfied(1, 2));
        assert!(!g.jointly_satisfied(0, 1));
    }

    #[test]
    fn test_infeasible_subset() {
        assert_eq!(graph().infeasible_subset(), vec![0, 1]);
        assert!(ConflictGraph::new(2).infeasible_subset().is_empty());

        let mut g = ConflictGraph::new(2);
        g.add_sample(&[true, true]);
        assert_eq!(g.infeasible_subset(), Vec::<usize>::new());
    }
}
