//! Sparse multivariate polynomials over the rationals.
//!
//! Polynomials are kept in a canonical form: terms sorted by descending
//! graded-lexicographic monomial order, like terms combined and zero
//! coefficients removed. Two polynomials are equal iff their term lists are
//! equal, which lets them serve as hash keys for the elimination sets.
//!
//! Most CAD operations view a polynomial as univariate in one variable with
//! polynomial coefficients (see [`Polynomial::coefficients`] and
//! [`Polynomial::pseudo_remainder`]).
//!
//! ## References
//!
//! - Cohen: "A Course in Computational Algebraic Number Theory" (1993), §3.3
//! - Z3's `math/polynomial/polynomial.cpp`

use crate::error::{MathError, MathResult};
use crate::rational::{pow_uint, rational_content};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

pub mod dense;
pub mod factorization;
pub mod gcd;
pub mod resultant;
pub mod root_isolation;

pub use dense::DensePolynomial;

/// Variable identifier for polynomials.
pub type Var = u32;

/// Null variable constant (indicates no variable).
pub const NULL_VAR: Var = u32::MAX;

/// Power of a variable (variable, exponent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarPower {
    /// The variable identifier.
    pub var: Var,
    /// The exponent (power) of the variable.
    pub power: u32,
}

impl VarPower {
    /// Create a new variable power.
    #[inline]
    pub fn new(var: Var, power: u32) -> Self {
        Self { var, power }
    }
}

/// A monomial is a product of variables with exponents.
/// Represented as a sorted list of (variable, power) pairs.
/// The unit monomial (1) is represented as an empty list.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Monomial {
    vars: SmallVec<[VarPower; 4]>,
    total_degree: u32,
}

impl Monomial {
    /// Create the unit monomial (1).
    #[inline]
    pub fn unit() -> Self {
        Self {
            vars: SmallVec::new(),
            total_degree: 0,
        }
    }

    /// Create a monomial from a single variable with power 1.
    #[inline]
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// Create a monomial from a single variable with a given power.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        if power == 0 {
            return Self::unit();
        }
        let mut vars = SmallVec::new();
        vars.push(VarPower::new(var, power));
        Self {
            vars,
            total_degree: power,
        }
    }

    /// Create a monomial from a list of (variable, power) pairs.
    /// The input doesn't need to be sorted or normalized.
    pub fn from_powers(powers: impl IntoIterator<Item = (Var, u32)>) -> Self {
        let mut var_powers: FxHashMap<Var, u32> = FxHashMap::default();
        for (var, power) in powers {
            if power > 0 {
                *var_powers.entry(var).or_insert(0) += power;
            }
        }
        let mut vars: SmallVec<[VarPower; 4]> = var_powers
            .into_iter()
            .map(|(v, p)| VarPower::new(v, p))
            .collect();
        vars.sort_by_key(|vp| vp.var);
        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Self { vars, total_degree }
    }

    /// Returns true if this is the unit monomial.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns the total degree of the monomial.
    #[inline]
    pub fn total_degree(&self) -> u32 {
        self.total_degree
    }

    /// Returns the variable-power pairs.
    #[inline]
    pub fn vars(&self) -> &[VarPower] {
        &self.vars
    }

    /// Returns the degree of a specific variable in this monomial.
    pub fn degree(&self, var: Var) -> u32 {
        self.vars
            .iter()
            .find(|vp| vp.var == var)
            .map(|vp| vp.power)
            .unwrap_or(0)
    }

    /// Returns the maximum variable in this monomial, or NULL_VAR if unit.
    pub fn max_var(&self) -> Var {
        self.vars.last().map(|vp| vp.var).unwrap_or(NULL_VAR)
    }

    /// Multiply two monomials.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        if self.is_unit() {
            return other.clone();
        }
        if other.is_unit() {
            return self.clone();
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut i = 0;
        let mut j = 0;
        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => {
                    vars.push(self.vars[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    vars.push(other.vars[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    vars.push(VarPower::new(
                        self.vars[i].var,
                        self.vars[i].power + other.vars[j].power,
                    ));
                    i += 1;
                    j += 1;
                }
            }
        }
        vars.extend_from_slice(&self.vars[i..]);
        vars.extend_from_slice(&other.vars[j..]);

        Monomial {
            vars,
            total_degree: self.total_degree + other.total_degree,
        }
    }

    /// Check if other divides self. Returns the quotient if it does.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        if other.is_unit() {
            return Some(self.clone());
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut j = 0;
        for vp in &self.vars {
            if j < other.vars.len() && other.vars[j].var == vp.var {
                if vp.power < other.vars[j].power {
                    return None;
                }
                let rest = vp.power - other.vars[j].power;
                if rest > 0 {
                    vars.push(VarPower::new(vp.var, rest));
                }
                j += 1;
            } else if j < other.vars.len() && other.vars[j].var < vp.var {
                return None;
            } else {
                vars.push(*vp);
            }
        }
        if j < other.vars.len() {
            return None;
        }

        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Some(Monomial { vars, total_degree })
    }

    /// Split off `var`: returns its exponent and the monomial without it.
    pub fn split_var(&self, var: Var) -> (u32, Monomial) {
        let power = self.degree(var);
        if power == 0 {
            return (0, self.clone());
        }
        let vars: SmallVec<[VarPower; 4]> =
            self.vars.iter().copied().filter(|vp| vp.var != var).collect();
        (
            power,
            Monomial {
                vars,
                total_degree: self.total_degree - power,
            },
        )
    }

    /// Lexicographic comparison of monomials.
    pub fn lex_cmp(&self, other: &Monomial) -> Ordering {
        let mut i = 0;
        let mut j = 0;
        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => return Ordering::Greater,
                Ordering::Greater => return Ordering::Less,
                Ordering::Equal => match self.vars[i].power.cmp(&other.vars[j].power) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    ord => return ord,
                },
            }
        }
        if i < self.vars.len() {
            Ordering::Greater
        } else if j < other.vars.len() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    /// Graded lexicographic comparison (total degree first, then lex).
    pub fn grlex_cmp(&self, other: &Monomial) -> Ordering {
        match self.total_degree.cmp(&other.total_degree) {
            Ordering::Equal => self.lex_cmp(other),
            ord => ord,
        }
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unit() {
            return write!(f, "1");
        }
        for (i, vp) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            if vp.power == 1 {
                write!(f, "x{}", vp.var)?;
            } else {
                write!(f, "x{}^{}", vp.var, vp.power)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A term is a coefficient multiplied by a monomial.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The coefficient of the term.
    pub coeff: BigRational,
    /// The monomial part of the term.
    pub monomial: Monomial,
}

impl Term {
    /// Create a new term.
    #[inline]
    pub fn new(coeff: BigRational, monomial: Monomial) -> Self {
        Self { coeff, monomial }
    }

    /// Create a constant term.
    #[inline]
    pub fn constant(c: BigRational) -> Self {
        Self::new(c, Monomial::unit())
    }

    /// Check if this term is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.monomial.is_unit() {
            write!(f, "{}", self.coeff)
        } else if self.coeff.is_one() {
            write!(f, "{:?}", self.monomial)
        } else if self.coeff == -BigRational::one() {
            write!(f, "-{:?}", self.monomial)
        } else {
            write!(f, "{}*{:?}", self.coeff, self.monomial)
        }
    }
}

/// A multivariate polynomial over rationals.
/// Represented as a sum of terms in descending graded-lex order.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Polynomial {
    terms: Vec<Term>,
}

impl Polynomial {
    /// Create the zero polynomial.
    #[inline]
    pub fn zero() -> Self {
        Self { terms: Vec::new() }
    }

    /// Create the one polynomial.
    #[inline]
    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    /// Create a constant polynomial.
    pub fn constant(c: BigRational) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Self {
                terms: vec![Term::constant(c)],
            }
        }
    }

    /// Create a constant polynomial from an integer.
    pub fn from_int(c: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(c)))
    }

    /// Create a polynomial from a single variable.
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// Create a polynomial x^k.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        Self {
            terms: vec![Term::new(
                BigRational::one(),
                Monomial::from_var_power(var, power),
            )],
        }
    }

    /// Create a polynomial from terms. Normalizes and combines like terms.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut poly = Self {
            terms: terms.into_iter().filter(|t| !t.is_zero()).collect(),
        };
        poly.normalize();
        poly
    }

    /// Create a polynomial from integer coefficients.
    ///
    /// Each entry is `(coefficient, [(var, power), ...])`.
    pub fn from_coeffs_int(coeffs: &[(i64, &[(Var, u32)])]) -> Self {
        Self::from_terms(coeffs.iter().map(|(c, powers)| {
            Term::new(
                BigRational::from_integer(BigInt::from(*c)),
                Monomial::from_powers(powers.iter().copied()),
            )
        }))
    }

    /// Create a univariate polynomial from coefficients.
    /// `coeffs[i]` is the coefficient of x^i.
    pub fn univariate(var: Var, coeffs: &[BigRational]) -> Self {
        Self::from_terms(
            coeffs
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_zero())
                .map(|(i, c)| Term::new(c.clone(), Monomial::from_var_power(var, i as u32))),
        )
    }

    /// Build `sum coeffs[k] * var^k` from polynomial coefficients.
    pub fn from_coefficients(var: Var, coeffs: &[Polynomial]) -> Self {
        let mut terms = Vec::new();
        for (k, c) in coeffs.iter().enumerate() {
            let shift = Monomial::from_var_power(var, k as u32);
            terms.extend(
                c.terms
                    .iter()
                    .map(|t| Term::new(t.coeff.clone(), t.monomial.mul(&shift))),
            );
        }
        Self::from_terms(terms)
    }

    /// Check if the polynomial is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Check if the polynomial contains no variable (zero included).
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty() || (self.terms.len() == 1 && self.terms[0].monomial.is_unit())
    }

    /// Value of a constant polynomial, zero otherwise.
    pub fn constant_value(&self) -> BigRational {
        if self.is_constant() {
            self.constant_term()
        } else {
            BigRational::zero()
        }
    }

    /// Check if the polynomial is one.
    pub fn is_one(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].monomial.is_unit() && self.terms[0].coeff.is_one()
    }

    /// Get the number of terms.
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Get the terms.
    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Get the total degree of the polynomial.
    pub fn total_degree(&self) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.total_degree())
            .max()
            .unwrap_or(0)
    }

    /// Get the degree with respect to a specific variable.
    pub fn degree(&self, var: Var) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.degree(var))
            .max()
            .unwrap_or(0)
    }

    /// Check whether `var` occurs in the polynomial.
    pub fn has_var(&self, var: Var) -> bool {
        self.terms.iter().any(|t| t.monomial.degree(var) > 0)
    }

    /// Get the maximum variable in the polynomial, or NULL_VAR if constant.
    pub fn max_var(&self) -> Var {
        self.terms
            .iter()
            .map(|t| t.monomial.max_var())
            .filter(|&v| v != NULL_VAR)
            .max()
            .unwrap_or(NULL_VAR)
    }

    /// Get all variables in the polynomial, sorted.
    pub fn vars(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = self
            .terms
            .iter()
            .flat_map(|t| t.monomial.vars().iter().map(|vp| vp.var))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// The single variable of a univariate polynomial.
    pub fn univariate_var(&self) -> Option<Var> {
        match self.vars().as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Get the leading coefficient (rational coefficient of the leading term).
    pub fn leading_coeff(&self) -> BigRational {
        self.terms
            .first()
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the constant term.
    pub fn constant_term(&self) -> BigRational {
        self.terms
            .iter()
            .find(|t| t.monomial.is_unit())
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the coefficient polynomial for x^k.
    /// For polynomial p(y_1, ..., y_n, x), returns coefficient of x^k.
    pub fn coeff(&self, var: Var, k: u32) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().filter_map(|t| {
            let (power, rest) = t.monomial.split_var(var);
            (power == k).then(|| Term::new(t.coeff.clone(), rest))
        }))
    }

    /// All coefficients with respect to `var`; index `k` holds the
    /// coefficient of `var^k`.
    pub fn coefficients(&self, var: Var) -> Vec<Polynomial> {
        let degree = self.degree(var) as usize;
        let mut buckets: Vec<Vec<Term>> = vec![Vec::new(); degree + 1];
        for t in &self.terms {
            let (power, rest) = t.monomial.split_var(var);
            buckets[power as usize].push(Term::new(t.coeff.clone(), rest));
        }
        buckets.into_iter().map(Polynomial::from_terms).collect()
    }

    /// Get the leading coefficient with respect to variable x.
    pub fn leading_coeff_wrt(&self, var: Var) -> Polynomial {
        self.coeff(var, self.degree(var))
    }

    fn normalize(&mut self) {
        if self.terms.is_empty() {
            return;
        }
        self.terms
            .sort_by(|a, b| b.monomial.grlex_cmp(&a.monomial));

        let mut merged: Vec<Term> = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            match merged.last_mut() {
                Some(last) if last.monomial == term.monomial => last.coeff += term.coeff,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| !t.coeff.is_zero());
        self.terms = merged;
    }

    /// Negate the polynomial.
    pub fn neg(&self) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(-t.coeff.clone(), t.monomial.clone()))
                .collect(),
        }
    }

    /// Add two polynomials.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        Polynomial::from_terms(self.terms.iter().chain(other.terms.iter()).cloned())
    }

    /// Subtract two polynomials.
    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, c: &BigRational) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(&t.coeff * c, t.monomial.clone()))
                .collect(),
        }
    }

    /// Multiply two polynomials.
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }
        let mut acc: FxHashMap<Monomial, BigRational> = FxHashMap::default();
        for a in &self.terms {
            for b in &other.terms {
                *acc.entry(a.monomial.mul(&b.monomial))
                    .or_insert_with(BigRational::zero) += &a.coeff * &b.coeff;
            }
        }
        Polynomial::from_terms(acc.into_iter().map(|(m, c)| Term::new(c, m)))
    }

    /// Multiply by a monomial `var^power`.
    pub fn mul_var_power(&self, var: Var, power: u32) -> Polynomial {
        if power == 0 {
            return self.clone();
        }
        let shift = Monomial::from_var_power(var, power);
        Polynomial::from_terms(
            self.terms
                .iter()
                .map(|t| Term::new(t.coeff.clone(), t.monomial.mul(&shift))),
        )
    }

    /// Raise to a non-negative power.
    pub fn pow(&self, n: u32) -> Polynomial {
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Formal derivative with respect to `var`.
    pub fn derivative(&self, var: Var) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().filter_map(|t| {
            let (power, rest) = t.monomial.split_var(var);
            (power > 0).then(|| {
                Term::new(
                    &t.coeff * BigRational::from_integer(BigInt::from(power)),
                    rest.mul(&Monomial::from_var_power(var, power - 1)),
                )
            })
        }))
    }

    /// Substitute a rational value for `var`.
    pub fn eval_at(&self, var: Var, value: &BigRational) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().map(|t| {
            let (power, rest) = t.monomial.split_var(var);
            Term::new(&t.coeff * pow_uint(value, power), rest)
        }))
    }

    /// Substitute every variable present in `assignment`.
    pub fn eval_partial(&self, assignment: &FxHashMap<Var, BigRational>) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().map(|t| {
            let mut coeff = t.coeff.clone();
            let mut rest = Vec::new();
            for vp in t.monomial.vars() {
                match assignment.get(&vp.var) {
                    Some(v) => coeff *= pow_uint(v, vp.power),
                    None => rest.push((vp.var, vp.power)),
                }
            }
            Term::new(coeff, Monomial::from_powers(rest))
        }))
    }

    /// Evaluate at a full rational assignment.
    pub fn eval(&self, assignment: &FxHashMap<Var, BigRational>) -> MathResult<BigRational> {
        let mut sum = BigRational::zero();
        for t in &self.terms {
            let mut value = t.coeff.clone();
            for vp in t.monomial.vars() {
                let x = assignment
                    .get(&vp.var)
                    .ok_or(MathError::MissingVariable(vp.var))?;
                value *= pow_uint(x, vp.power);
            }
            sum += value;
        }
        Ok(sum)
    }

    /// Substitute a polynomial for `var`.
    pub fn substitute(&self, var: Var, value: &Polynomial) -> Polynomial {
        let coeffs = self.coefficients(var);
        // Horner scheme from the top coefficient down.
        let mut acc = Polynomial::zero();
        for c in coeffs.iter().rev() {
            acc = acc.mul(value).add(c);
        }
        acc
    }

    /// Exact division. Returns `None` if `divisor` does not divide `self`.
    pub fn div_exact(&self, divisor: &Polynomial) -> Option<Polynomial> {
        if divisor.is_zero() {
            return None;
        }
        if divisor.is_constant() {
            return Some(self.scale(&divisor.constant_value().recip()));
        }
        let lead = &divisor.terms[0];
        let mut remainder = self.clone();
        let mut quotient = Vec::new();
        while let Some(top) = remainder.terms.first() {
            let mono = top.monomial.div(&lead.monomial)?;
            let factor = Term::new(&top.coeff / &lead.coeff, mono);
            let step = Polynomial {
                terms: vec![factor.clone()],
            };
            remainder = remainder.sub(&step.mul(divisor));
            quotient.push(factor);
        }
        Some(Polynomial::from_terms(quotient))
    }

    /// Pseudo-remainder of `self` by `divisor` viewed as polynomials in `var`.
    ///
    /// Satisfies `lc(divisor)^(deg(self) - deg(divisor) + 1) * self = q * divisor + r`
    /// with `deg(r) < deg(divisor)`.
    pub fn pseudo_remainder(&self, divisor: &Polynomial, var: Var) -> Polynomial {
        debug_assert!(!divisor.is_zero(), "pseudo-remainder by zero");
        let db = divisor.degree(var);
        let da = self.degree(var);
        if self.is_zero() || da < db {
            return self.clone();
        }
        let lc_b = divisor.leading_coeff_wrt(var);
        let mut remaining = da - db + 1;
        let mut r = self.clone();
        while !r.is_zero() && r.degree(var) >= db && remaining > 0 {
            let dr = r.degree(var);
            let lc_r = r.leading_coeff_wrt(var);
            let shifted = lc_r.mul_var_power(var, dr - db).mul(divisor);
            r = r.mul(&lc_b).sub(&shifted);
            remaining -= 1;
        }
        if remaining > 0 && !r.is_zero() {
            r = r.mul(&lc_b.pow(remaining));
        }
        r
    }

    /// Positive rational content: dividing by it yields coprime integer
    /// coefficients.
    pub fn content(&self) -> BigRational {
        rational_content(self.terms.iter().map(|t| &t.coeff))
    }

    /// Primitive part: integer coefficients with gcd one, sign preserved.
    pub fn primitive(&self) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }
        let c = self.content();
        self.scale(&c.recip())
    }

    /// Canonical associate: primitive with a positive leading coefficient.
    ///
    /// Two polynomials with the same zero set up to a rational factor map
    /// to the same canonical form; constants map to one.
    pub fn normalized(&self) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }
        if self.is_constant() {
            return Polynomial::one();
        }
        let p = self.primitive();
        if p.leading_coeff().is_negative() {
            p.neg()
        } else {
            p
        }
    }

    /// Dense rational coefficients if the polynomial only involves `var`.
    pub fn to_dense(&self, var: Var) -> Option<DensePolynomial> {
        let degree = self.degree(var) as usize;
        let mut coeffs = vec![BigRational::zero(); degree + 1];
        for t in &self.terms {
            let (power, rest) = t.monomial.split_var(var);
            if !rest.is_unit() {
                return None;
            }
            coeffs[power as usize] = t.coeff.clone();
        }
        Some(DensePolynomial::new(coeffs))
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{:?}", term)?;
            } else if term.coeff.is_negative() {
                write!(
                    f,
                    " - {:?}",
                    Term::new(-term.coeff.clone(), term.monomial.clone())
                )?;
            } else {
                write!(f, " + {:?}", term)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::ops::Add for Polynomial {
    type Output = Polynomial;

    fn add(self, other: Polynomial) -> Polynomial {
        Polynomial::add(&self, &other)
    }
}

impl std::ops::Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, other: Polynomial) -> Polynomial {
        Polynomial::sub(&self, &other)
    }
}

impl std::ops::Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, other: Polynomial) -> Polynomial {
        Polynomial::mul(&self, &other)
    }
}

impl std::ops::Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial::neg(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::{frac, rat};

    fn x() -> Polynomial {
        Polynomial::from_var(0)
    }

    fn y() -> Polynomial {
        Polynomial::from_var(1)
    }

    #[test]
    fn test_canonical_equality() {
        let a = x().add(&y());
        let b = y().add(&x());
        assert_eq!(a, b);
        assert!(x().sub(&x()).is_zero());
    }

    #[test]
    fn test_operators_match_methods() {
        let a = x().mul(&y()).add(&x().neg());
        let b = x() * y() + -x();
        assert_eq!(a, b);
        assert_eq!(b.clone() - a.clone(), Polynomial::zero());
        assert_eq!(x().sub(&y()), x() - y());
    }

    #[test]
    fn test_coefficients_wrt_var() {
        // x^2*y + 3*x - y
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2), (1, 1)]), (3, &[(0, 1)]), (-1, &[(1, 1)])]);
        let c = p.coefficients(0);
        assert_eq!(c.len(), 3);
        assert_eq!(c[0], y().neg());
        assert_eq!(c[1], Polynomial::from_int(3));
        assert_eq!(c[2], y());
        assert_eq!(Polynomial::from_coefficients(0, &c), p);
    }

    #[test]
    fn test_derivative_and_eval() {
        // x^3 - 2x
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 3)]), (-2, &[(0, 1)])]);
        let d = p.derivative(0);
        assert_eq!(d, Polynomial::from_coeffs_int(&[(3, &[(0, 2)]), (-2, &[])]));
        let mut a = FxHashMap::default();
        a.insert(0, frac(1, 2));
        assert_eq!(p.eval(&a).unwrap(), frac(1, 8) - rat(1));
    }

    #[test]
    fn test_eval_missing_variable() {
        let mut a = FxHashMap::default();
        a.insert(0, rat(1));
        assert_eq!(
            x().mul(&y()).eval(&a),
            Err(MathError::MissingVariable(1))
        );
    }

    #[test]
    fn test_div_exact() {
        let a = x().add(&y());
        let b = x().sub(&y());
        let prod = a.mul(&b);
        assert_eq!(prod.div_exact(&a), Some(b.clone()));
        assert_eq!(prod.add(&Polynomial::one()).div_exact(&a), None);
    }

    #[test]
    fn test_pseudo_remainder() {
        // prem(x^2 + y^2 - 1, y*x - 2, x) = y^2 * (x^2+y^2-1) mod (y x - 2)
        let a = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let b = Polynomial::from_coeffs_int(&[(1, &[(0, 1), (1, 1)]), (-2, &[])]);
        let r = a.pseudo_remainder(&b, 0);
        assert_eq!(r.degree(0), 0);
        // At x = 2/y: y^2 * (4/y^2 + y^2 - 1) = 4 + y^4 - y^2
        let expected = Polynomial::from_coeffs_int(&[(1, &[(1, 4)]), (-1, &[(1, 2)]), (4, &[])]);
        assert_eq!(r, expected);
    }

    #[test]
    fn test_normalized() {
        let p = Polynomial::from_coeffs_int(&[(-4, &[(0, 2)]), (6, &[])]);
        let n = p.normalized();
        assert_eq!(n, Polynomial::from_coeffs_int(&[(2, &[(0, 2)]), (-3, &[])]));
        assert!(Polynomial::from_int(-7).normalized().is_one());
    }

    #[test]
    fn test_substitute() {
        // (x + 1)^2 with x := y - 1 gives y^2
        let p = x().add(&Polynomial::one()).pow(2);
        let q = p.substitute(0, &y().sub(&Polynomial::one()));
        assert_eq!(q, y().pow(2));
    }
}
