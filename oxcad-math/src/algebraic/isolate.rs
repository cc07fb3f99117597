//! Real roots of a polynomial under a partial algebraic assignment.
//!
//! Given p(x_1, ..., x_k, y) and values α_1, ..., α_k, the roots of
//! p(α, y) are found by:
//!
//! 1. substituting the rational coordinates,
//! 2. dropping leading coefficients that vanish at α (if all vanish the
//!    polynomial is nullified),
//! 3. eliminating the irrational coordinates with resultants against their
//!    defining polynomials, which yields a univariate polynomial whose roots
//!    include those of p(α, y),
//! 4. isolating the roots of that polynomial and keeping the ones where
//!    p(α, y) actually vanishes.
//!
//! ## References
//!
//! - "Algorithms in Real Algebraic Geometry" (Basu et al., 2006), §10.2
//! - Z3's `math/polynomial/algebraic_numbers.cpp` (`isolate_roots`)

use super::evaluate::{sign_at, substitute_numeric};
use super::number::RealAlgebraicNumber;
use crate::error::{MathError, MathResult};
use crate::interval::ExactInterval;
use crate::polynomial::resultant::resultant;
use crate::polynomial::root_isolation::{isolate_real_roots, IsolatedRoot};
use crate::polynomial::{DensePolynomial, Monomial, Polynomial, Var};
use crate::sign::Sign;
use num_rational::BigRational;
use rustc_hash::FxHashMap;

/// Outcome of root isolation at a point.
#[derive(Debug, Clone)]
pub enum RealRoots {
    /// The real roots in increasing order, each tagged as a root.
    Roots(Vec<RealAlgebraicNumber>),
    /// The polynomial vanishes identically at the point.
    Nullified,
}

impl RealRoots {
    /// The roots, empty for a nullified polynomial.
    pub fn into_roots(self) -> Vec<RealAlgebraicNumber> {
        match self {
            RealRoots::Roots(r) => r,
            RealRoots::Nullified => Vec::new(),
        }
    }
}

/// Real roots of `p` in `var` with every other variable of `p` fixed by
/// `assignment`, optionally restricted to `bound`.
pub fn real_roots(
    p: &Polynomial,
    var: Var,
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
    bound: Option<&ExactInterval>,
) -> MathResult<RealRoots> {
    let (q, _) = substitute_numeric(p, assignment, Some(var))?;

    let coeffs = q.coefficients(var);
    let mut degree = None;
    for (k, c) in coeffs.iter().enumerate().rev() {
        if !c.is_zero() && sign_at(c, assignment)? != Sign::Zero {
            degree = Some(k);
            break;
        }
    }
    let Some(degree) = degree else {
        return Ok(RealRoots::Nullified);
    };
    if degree == 0 {
        return Ok(RealRoots::Roots(Vec::new()));
    }
    let q = Polynomial::from_coefficients(var, &coeffs[..=degree]);

    let algebraic: Vec<Var> = q.vars().into_iter().filter(|&v| v != var).collect();
    let candidates = if algebraic.is_empty() {
        q.to_dense(var).ok_or(MathError::NotUnivariate(var))?
    } else {
        eliminate(&q, var, &algebraic, assignment)?
    };

    let mut extended = assignment.clone();
    let mut roots = Vec::new();
    for isolated in isolate_real_roots(&candidates) {
        let mut root = match isolated {
            IsolatedRoot::Exact(v) => RealAlgebraicNumber::from_rational(v),
            IsolatedRoot::Interval { lower, upper } => {
                RealAlgebraicNumber::from_isolating(&candidates, lower, upper)?
            }
        };
        if bound.is_some_and(|b| !root.is_in(b)) {
            continue;
        }
        if !algebraic.is_empty() && !vanishes_at(&q, var, &root, &mut extended)? {
            continue;
        }
        root.mark_root();
        roots.push(root);
    }
    Ok(RealRoots::Roots(roots))
}

/// Check whether `q(α, var)` vanishes at the candidate `root`.
///
/// Every root of `q(α, var)` is a candidate and the isolating interval of
/// `root` holds no other candidate, so a sign change of `q(α, var)` across
/// that interval proves the root. Only roots of even multiplicity need the
/// exact sign at the candidate.
fn vanishes_at(
    q: &Polynomial,
    var: Var,
    root: &RealAlgebraicNumber,
    extended: &mut FxHashMap<Var, RealAlgebraicNumber>,
) -> MathResult<bool> {
    if let Some(interval) = root.isolating_interval() {
        let ends = [interval.lower().clone(), interval.upper().clone()];
        let mut signs = [Sign::Zero; 2];
        for (sign, end) in signs.iter_mut().zip(ends) {
            extended.insert(var, RealAlgebraicNumber::from_rational(end));
            *sign = sign_at(q, extended)?;
        }
        if signs[0] != Sign::Zero && signs[0] == -signs[1] {
            return Ok(true);
        }
    }
    extended.insert(var, root.clone());
    Ok(sign_at(q, extended)? == Sign::Zero)
}

/// Univariate polynomial in `var` vanishing at every root of `q(α, var)`.
fn eliminate(
    q: &Polynomial,
    var: Var,
    algebraic: &[Var],
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
) -> MathResult<DensePolynomial> {
    if let Some(r) = eliminate_in_order(q, var, algebraic.iter().copied(), assignment)? {
        return Ok(r);
    }
    if let Some(r) = eliminate_in_order(q, var, algebraic.iter().rev().copied(), assignment)? {
        return Ok(r);
    }
    Err(MathError::DegenerateProjection)
}

fn eliminate_in_order(
    q: &Polynomial,
    var: Var,
    order: impl Iterator<Item = Var>,
    assignment: &FxHashMap<Var, RealAlgebraicNumber>,
) -> MathResult<Option<DensePolynomial>> {
    let mut r = q.clone();
    for v in order {
        if !r.has_var(v) {
            continue;
        }
        let value = assignment.get(&v).ok_or(MathError::MissingVariable(v))?;
        let Some(interval) = value.isolating_interval() else {
            continue;
        };
        let mut m = interval.polynomial().clone();
        let common = common_factor_in(&r, v, &m);
        if !common.is_constant() {
            // r vanishes identically once v is fixed
            if interval.count_roots_of(&common) > 0 {
                return Ok(None);
            }
            if let Some(reduced) = m.div_exact(&common) {
                m = reduced;
            }
        }
        r = resultant(&r, &m.to_polynomial(v), v);
        if r.is_zero() {
            return Ok(None);
        }
    }
    r.to_dense(var)
        .map(Some)
        .ok_or(MathError::NotUnivariate(var))
}

/// Gcd of `m(v)` with every coefficient of `r` viewed as a polynomial in all
/// variables except `v`.
fn common_factor_in(r: &Polynomial, v: Var, m: &DensePolynomial) -> DensePolynomial {
    let mut groups: FxHashMap<Monomial, Vec<BigRational>> = FxHashMap::default();
    for term in r.terms() {
        let (power, rest) = term.monomial.split_var(v);
        let coeffs = groups.entry(rest).or_default();
        if coeffs.len() <= power as usize {
            coeffs.resize(power as usize + 1, BigRational::default());
        }
        coeffs[power as usize] = term.coeff.clone();
    }
    let mut g = m.clone();
    for coeffs in groups.into_values() {
        g = g.gcd(&DensePolynomial::new(coeffs));
        if g.is_constant() {
            break;
        }
    }
    g
}
