//! Sign of a polynomial at a real algebraic point.
//!
//! Rational coordinates are substituted first. With a single irrational
//! coordinate α (root of m) the sign of q(α) follows from gcd(q, m) and
//! Sturm counts on the isolating interval. With several irrational
//! coordinates the value q(α_1, ..., α_k) is a root of
//!
//! ```text
//! R(t) = res_{x_k}( ... res_{x_1}(t - q, m_1(x_1)) ..., m_k(x_k))
//! ```
//!
//! so it is either zero or larger in magnitude than a root bound of R(t)/t^j.
//! Interval evaluation over a shrinking box then decides the sign.
//!
//! Before any resultant is built, q is reduced modulo the monic defining
//! polynomial of every irrational coordinate, which keeps its value at the
//! point and often removes coordinates altogether. A few rounds of interval
//! refinement then settle most nonzero signs without R(t).

use super::number::{RanValue, RealAlgebraicNumber};
use crate::error::{MathError, MathResult};
use crate::interval::ExactInterval;
use crate::polynomial::resultant::resultant;
use crate::polynomial::{Polynomial, Var};
use crate::rational::midpoint;
use crate::sign::Sign;
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::FxHashMap;

/// Substitute the rational coordinates of `assignment` into `p`.
///
/// Returns the partially evaluated polynomial and the irrational
/// coordinates it still depends on. Fails if a variable of `p` other than
/// those in `keep` is unassigned.
pub(crate) fn substitute_numeric(
    p: &Polynomial,
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
    keep: Option<Var>,
) -> MathResult<(Polynomial, Vec<Var>)> {
    let mut numeric: FxHashMap<Var, BigRational> = FxHashMap::default();
    let mut algebraic = Vec::new();
    for var in p.vars() {
        if Some(var) == keep {
            continue;
        }
        let value = assignment.get(&var).ok_or(MathError::MissingVariable(var))?;
        match value.value() {
            RanValue::Numeric(v) => {
                numeric.insert(var, v.clone());
            }
            RanValue::Interval(_) => algebraic.push(var),
        }
    }
    Ok((p.eval_partial(&numeric), algebraic))
}

/// Interval refinement rounds tried before falling back to resultants.
const REFINEMENT_ROUNDS: usize = 12;

/// Monic defining polynomials of the irrational coordinates among `vars`,
/// lowest degree first.
pub(crate) fn defining_moduli(
    vars: &[Var],
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
) -> Vec<(Var, Polynomial)> {
    let mut moduli: Vec<(Var, Polynomial)> = vars
        .iter()
        .filter_map(|&v| {
            let interval = assignment.get(&v)?.isolating_interval()?;
            Some((v, interval.polynomial().monic().to_polynomial(v)))
        })
        .collect();
    moduli.sort_by_key(|(v, m)| (m.degree(*v), *v));
    moduli
}

/// Remainder of `p` modulo every monic univariate modulus.
///
/// The value of `p` at any point whose coordinates are roots of the moduli
/// is unchanged, and the degree in each modulus variable drops below the
/// modulus degree.
pub(crate) fn reduce_modulo(p: &Polynomial, moduli: &[(Var, Polynomial)]) -> Polynomial {
    let mut r = p.clone();
    for (var, m) in moduli {
        if r.degree(*var) >= m.degree(*var) {
            r = r.pseudo_remainder(m, *var);
        }
    }
    r
}

/// Sign of `p` at the point given by `assignment`.
///
/// Every variable of `p` must be assigned.
pub fn sign_at(p: &Polynomial, assignment: &FxHashMap<Var, RealAlgebraicNumber>) -> MathResult<Sign> {
    let (q, algebraic) = substitute_numeric(p, assignment, None)?;
    let q = reduce_modulo(&q, &defining_moduli(&algebraic, assignment));
    if q.is_constant() {
        return Ok(Sign::of(&q.constant_value()));
    }
    let algebraic: Vec<Var> = algebraic.into_iter().filter(|&v| q.has_var(v)).collect();
    match algebraic.as_slice() {
        [var] => sign_univariate(&q, *var, &assignment[var]),
        _ => sign_multivariate(&q, &algebraic, assignment),
    }
}

/// Sign of `p` at a point where it is known not to vanish.
///
/// Only interval refinement is used, so the answer is wrong (and the call
/// may not terminate) if `p` does vanish there.
pub fn nonzero_sign_at(
    p: &Polynomial,
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
) -> MathResult<Sign> {
    let (q, algebraic) = substitute_numeric(p, assignment, None)?;
    if q.is_constant() {
        return Ok(Sign::of(&q.constant_value()));
    }
    let mut point: Vec<(Var, RealAlgebraicNumber)> = algebraic
        .into_iter()
        .filter(|&v| q.has_var(v))
        .map(|v| (v, assignment[&v].clone()))
        .collect();
    loop {
        if let Some(s) = ExactInterval::evaluate(&q, &box_of(&point)).sign() {
            return Ok(s);
        }
        if point.iter().all(|(_, a)| a.is_numeric()) {
            return Ok(exact_sign(&q, &point));
        }
        for (_, a) in point.iter_mut() {
            a.refine();
        }
    }
}

fn sign_univariate(q: &Polynomial, var: Var, alpha: &RealAlgebraicNumber) -> MathResult<Sign> {
    let qd = q.to_dense(var).ok_or(MathError::NotUnivariate(var))?;
    let mut alpha = alpha.clone();
    if let Some(i) = alpha.isolating_interval() {
        let common = qd.gcd(i.polynomial());
        if i.count_roots_of(&common) > 0 {
            return Ok(Sign::Zero);
        }
    }
    loop {
        match alpha.value() {
            RanValue::Numeric(v) => return Ok(qd.sign_at(v)),
            RanValue::Interval(i) => {
                if i.count_roots_of(&qd) == 0 {
                    return Ok(qd.sign_at(&midpoint(i.lower(), i.upper())));
                }
            }
        }
        alpha.refine();
    }
}

fn sign_multivariate(
    q: &Polynomial,
    algebraic: &[Var],
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
) -> MathResult<Sign> {
    let mut point: Vec<(Var, RealAlgebraicNumber)> = algebraic
        .iter()
        .map(|&v| (v, assignment[&v].clone()))
        .collect();

    for _ in 0..REFINEMENT_ROUNDS {
        if let Some(s) = ExactInterval::evaluate(q, &box_of(&point)).sign() {
            return Ok(s);
        }
        if point.iter().all(|(_, a)| a.is_numeric()) {
            return Ok(exact_sign(q, &point));
        }
        for (_, a) in point.iter_mut() {
            a.refine();
        }
    }

    // Refinement may have hit exact rational coordinates.
    let numeric: FxHashMap<Var, BigRational> = point
        .iter()
        .filter_map(|(v, a)| a.numeric_value().map(|x| (*v, x.clone())))
        .collect();
    let q = q.eval_partial(&numeric);
    point.retain(|(v, a)| !a.is_numeric() && q.has_var(*v));
    if q.is_constant() {
        return Ok(Sign::of(&q.constant_value()));
    }
    if let [(var, alpha)] = point.as_slice() {
        return sign_univariate(&q, *var, alpha);
    }

    let refined: FxHashMap<Var, RealAlgebraicNumber> = point.iter().cloned().collect();
    let vars: Vec<Var> = point.iter().map(|(v, _)| *v).collect();
    let moduli = defining_moduli(&vars, &refined);
    let t = vars.iter().copied().max().unwrap_or(0) + 1;
    let mut r = Polynomial::from_var(t).sub(&q);
    for (i, (var, m)) in moduli.iter().enumerate() {
        r = reduce_modulo(&r, &moduli[i..]);
        if r.has_var(*var) {
            r = resultant(&r, m, *var).normalized();
        }
    }
    let rt = r.to_dense(t).ok_or(MathError::NotUnivariate(t))?;

    // Nonzero values of q at the point are bounded away from zero.
    let zero_bound = if rt.coeffs().first().is_some_and(|c| c.is_zero()) {
        let mut s = rt;
        while s.coeffs().first().is_some_and(|c| c.is_zero()) {
            s = s.deflate();
        }
        if s.is_constant() {
            return Ok(Sign::Zero);
        }
        Some(s.nonzero_root_lower_bound())
    } else {
        None
    };

    loop {
        let value = ExactInterval::evaluate(&q, &box_of(&point));
        if let Some(s) = value.sign() {
            return Ok(s);
        }
        if let Some(delta) = &zero_bound {
            if value.is_subset_of(&ExactInterval::open(-delta.clone(), delta.clone())) {
                return Ok(Sign::Zero);
            }
        }
        if point.iter().all(|(_, a)| a.is_numeric()) {
            return Ok(exact_sign(&q, &point));
        }
        for (_, a) in point.iter_mut() {
            a.refine();
        }
    }
}

fn box_of(point: &[(Var, RealAlgebraicNumber)]) -> FxHashMap<Var, ExactInterval> {
    point.iter().map(|(v, a)| (*v, a.interval())).collect()
}

fn exact_sign(q: &Polynomial, point: &[(Var, RealAlgebraicNumber)]) -> Sign {
    let values: FxHashMap<Var, BigRational> = point
        .iter()
        .filter_map(|(v, a)| a.numeric_value().map(|x| (*v, x.clone())))
        .collect();
    Sign::of(&q.eval_partial(&values).constant_value())
}
