//! Projection steps of the decomposition.

use super::{level_of, Cad, CheckRequest, DroppedPolynomial};
use crate::bounds::{self, BoundMap};
use crate::constraint::Constraint;
use crate::elimination_set::Parents;
use crate::error::CadResult;
use crate::settings::CadSettings;
use oxcad_math::{Polynomial, RealAlgebraicPoint, UnivariatePolynomial, Var};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

/// Outcome of testing whether a polynomial vanishes inside a box.
pub(crate) struct BoxTest {
    pub(crate) vanishes: bool,
    sub: Cad,
    /// Parent level of every level of `sub`.
    level_map: Vec<usize>,
}

/// Decide whether `p` has a zero inside the box given by `bounds`, using a
/// nested decomposition over the variables of `p`.
pub(crate) fn vanishes_in_box(
    settings: &CadSettings,
    variables: &[Var],
    bounds: &BoundMap,
    p: &Polynomial,
) -> CadResult<BoxTest> {
    let mut level_map: Vec<usize> = p
        .vars()
        .into_iter()
        .filter_map(|v| level_of(variables, v))
        .collect();
    level_map.sort_unstable();
    let sub_vars: Vec<Var> = level_map.iter().map(|&l| variables[l]).collect();
    let mut sub_bounds: BoundMap = level_map
        .iter()
        .enumerate()
        .filter_map(|(i, l)| bounds.get(l).map(|b| (i, b.clone())))
        .collect();

    let mut sub = Cad::new(settings.for_box_test());
    sub.schedule(std::slice::from_ref(p), &sub_vars);
    sub.prepare_elimination();
    let mut point = RealAlgebraicPoint::empty();
    let vanishes = sub.check(
        &[Constraint::eq(p.clone())],
        &mut point,
        CheckRequest::new().with_bounds(&mut sub_bounds).use_trace_first(false),
    )?;
    trace!(vanishes, "box test for {:?}", p);
    Ok(BoxTest {
        vanishes,
        sub,
        level_map,
    })
}

impl Cad {
    /// Run one projection step below `target`.
    ///
    /// The deepest level above `target` with pending work is eliminated into
    /// the next level. Returns that next level, or `None` if no level above
    /// `target` has work. With `bounds` and bound-aware elimination enabled,
    /// coefficient and discriminant factors without a zero inside the box
    /// are withheld until the bounds change.
    pub fn eliminate(&mut self, target: usize, bounds: Option<&BoundMap>) -> CadResult<Option<usize>> {
        let n = self.dimension();
        let target = target.min(n.saturating_sub(1));
        let Some(level) = (0..target)
            .rev()
            .find(|&l| self.levels[l].has_elimination_work())
        else {
            return Ok(None);
        };

        let use_bounds = self.settings.simplify_elimination_by_bounds
            && bounds.is_some_and(bounds::is_active);
        let known_dropped: FxHashSet<UnivariatePolynomial> = self
            .dropped
            .iter()
            .map(|d| self.pool[d.id].clone())
            .collect();
        let dest_var = self.variables[level + 1];
        let mut box_tests: Vec<BoxTest> = Vec::new();
        let mut sub_calls = 0u64;

        let (upper, lower) = self.levels.split_at_mut(level + 1);
        let (src, dest) = (&mut upper[level], &mut lower[0]);
        let outcome = if let Some(p) = src.pop_next_single_elimination_position() {
            let settings = &self.settings;
            let variables = &self.variables;
            let mut keep = |f: &UnivariatePolynomial| -> bool {
                let Some(bounds) = bounds.filter(|_| use_bounds) else {
                    return true;
                };
                if known_dropped.contains(f) {
                    return false;
                }
                let bounded = f.polynomial().vars().into_iter().any(|v| {
                    level_of(variables, v)
                        .and_then(|l| bounds.get(&l))
                        .is_some_and(|b| !b.is_unbounded())
                });
                if !bounded {
                    return true;
                }
                sub_calls += 1;
                match vanishes_in_box(settings, variables, bounds, f.polynomial()) {
                    Ok(test) if test.vanishes => {
                        box_tests.push(test);
                        true
                    }
                    Ok(_) => false,
                    Err(e) => {
                        warn!(error = %e, "box test failed, keeping polynomial");
                        true
                    }
                }
            };
            src.eliminate_into(p, dest, dest_var, settings, &mut self.pool, &mut keep)
        } else if let Some(p) = src.pop_next_paired_elimination_position() {
            src.eliminate_paired_into(p, dest, dest_var, &self.settings, &mut self.pool)
        } else {
            return Ok(None);
        };

        self.stats.eliminations += 1;
        self.stats.resultants += outcome.resultants;
        self.stats.sub_cad_calls += sub_calls;
        debug!(
            from = level,
            inserted = outcome.inserted.len(),
            dropped = outcome.dropped.len(),
            "elimination step"
        );
        if !outcome.dropped.is_empty() {
            for (id, parents) in outcome.dropped {
                self.dropped.push(DroppedPolynomial {
                    level: level + 1,
                    id,
                    parents,
                });
            }
            self.levels[level + 1].bounded = true;
            self.dropped_bounds = bounds.cloned();
        }
        for test in box_tests {
            self.recuperate(&test);
        }
        Ok(Some(level + 1))
    }

    /// Eliminate until no level has pending work.
    pub fn complete_elimination(&mut self) -> CadResult<()> {
        self.prepare_elimination();
        let n = self.dimension();
        while self.eliminate(n.saturating_sub(1), None)?.is_some() {}
        Ok(())
    }

    /// Take over projection polynomials computed by a box test.
    ///
    /// Only done when the nested levels sit on consecutive levels here, and
    /// only for polynomials whose every parent is present on the level above.
    fn recuperate(&mut self, test: &BoxTest) {
        let map = &test.level_map;
        if map.windows(2).any(|w| w[1] != w[0] + 1) {
            return;
        }
        let mut taken = 0usize;
        for (i, sub_level) in test.sub.levels.iter().enumerate().skip(1) {
            let level = map[i];
            for sub_id in sub_level.sorted(&test.sub.pool) {
                let up = &test.sub.pool[sub_id];
                if up.main_var() != self.variables[level] {
                    continue;
                }
                let mapped: Vec<Parents> = sub_level
                    .parents_of(sub_id)
                    .iter()
                    .filter_map(|parents| {
                        let find = |id| {
                            self.pool
                                .find(&test.sub.pool[id])
                                .filter(|pid| self.levels[level - 1].contains(*pid))
                        };
                        match *parents {
                            Parents::Original => None,
                            Parents::Single(a) => find(a).map(Parents::Single),
                            Parents::Pair(a, b) => Some(Parents::pair(find(a)?, find(b)?)),
                        }
                    })
                    .collect();
                if mapped.is_empty() {
                    continue;
                }
                let id = self.pool.intern(up.clone());
                for parents in mapped {
                    if self.levels[level].insert(id, parents, false, &self.pool) {
                        taken += 1;
                    }
                }
            }
        }
        if taken > 0 {
            debug!(taken, "recuperated projection polynomials from box test");
        }
    }
}
