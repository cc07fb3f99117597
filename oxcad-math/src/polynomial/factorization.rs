//! Squarefree factorization.
//!
//! Splits a polynomial into pairwise coprime squarefree factors with
//! multiplicities. Contents with respect to each variable are split off and
//! factored recursively; a polynomial that is primitive in all of its
//! variables is decomposed with Yun's algorithm in its largest variable.
//!
//! ## References
//!
//! - Yun: "On square-free decomposition algorithms" (1976)
//! - Geddes, Czapor, Labahn: "Algorithms for Computer Algebra" (1992), §8.2

use super::gcd::{content_wrt, gcd};
use super::{Polynomial, Var};

/// Squarefree decomposition `p = c * prod f_i^{e_i}`.
///
/// Factors are normalized, non-constant, pairwise coprime and listed with
/// their multiplicity. Constants (including zero) have no factors.
pub fn factorize(p: &Polynomial) -> Vec<(Polynomial, u32)> {
    let mut out: Vec<(Polynomial, u32)> = Vec::new();
    collect_factors(p, &mut out);
    out
}

/// Distinct squarefree factors of `p`, multiplicities dropped.
pub fn square_free_factors(p: &Polynomial) -> Vec<Polynomial> {
    factorize(p).into_iter().map(|(f, _)| f).collect()
}

fn collect_factors(p: &Polynomial, out: &mut Vec<(Polynomial, u32)>) {
    if p.is_constant() {
        return;
    }
    let vars = p.vars();
    for &var in &vars {
        let content = content_wrt(p, var);
        if !content.is_constant() {
            collect_factors(&content, out);
            let rest = divide(p, &content);
            collect_factors(&rest, out);
            return;
        }
    }
    yun(p, p.max_var(), out);
}

fn yun(p: &Polynomial, var: Var, out: &mut Vec<(Polynomial, u32)>) {
    let dp = p.derivative(var);
    let g = gcd(p, &dp);
    let mut w = divide(p, &g);
    let mut y = divide(&dp, &g);
    let mut z = y.sub(&w.derivative(var));
    let mut multiplicity = 1;
    while w.has_var(var) {
        let factor = gcd(&w, &z);
        if !factor.is_constant() {
            push_factor(out, factor.normalized(), multiplicity);
        }
        w = divide(&w, &factor);
        y = divide(&z, &factor);
        z = y.sub(&w.derivative(var));
        multiplicity += 1;
    }
}

fn divide(num: &Polynomial, den: &Polynomial) -> Polynomial {
    let quotient = num.div_exact(den);
    debug_assert!(quotient.is_some(), "gcd does not divide {}", num);
    quotient.unwrap_or_else(|| num.clone())
}

fn push_factor(out: &mut Vec<(Polynomial, u32)>, factor: Polynomial, multiplicity: u32) {
    match out.iter_mut().find(|(f, _)| *f == factor) {
        Some((_, e)) => *e += multiplicity,
        None => out.push((factor, multiplicity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Polynomial {
        Polynomial::from_var(0)
    }

    fn y() -> Polynomial {
        Polynomial::from_var(1)
    }

    fn product(factors: &[(Polynomial, u32)]) -> Polynomial {
        factors
            .iter()
            .fold(Polynomial::one(), |acc, (f, e)| acc.mul(&f.pow(*e)))
    }

    #[test]
    fn test_factorize_univariate_multiplicities() {
        // (x - 1)^2 (x + 2)
        let p = x()
            .sub(&Polynomial::one())
            .pow(2)
            .mul(&x().add(&Polynomial::from_int(2)));
        let factors = factorize(&p);
        assert_eq!(factors.len(), 2);
        assert!(factors.contains(&(x().sub(&Polynomial::one()), 2)));
        assert!(factors.contains(&(x().add(&Polynomial::from_int(2)), 1)));
        assert_eq!(product(&factors), p);
    }

    #[test]
    fn test_factorize_splits_content() {
        // (y^2 - 1) (x - y)
        let p = y().pow(2).sub(&Polynomial::one()).mul(&x().sub(&y()));
        let factors = square_free_factors(&p);
        assert_eq!(factors.len(), 2);
        assert!(factors.contains(&y().pow(2).sub(&Polynomial::one())));
        assert!(factors.contains(&x().sub(&y()).normalized()));
    }

    #[test]
    fn test_factorize_constant() {
        assert!(factorize(&Polynomial::from_int(6)).is_empty());
        assert!(factorize(&Polynomial::zero()).is_empty());
    }

    #[test]
    fn test_factorize_keeps_scalar_out() {
        // 4 (x + 1)^3 has the single factor x + 1
        let p = x().add(&Polynomial::one()).pow(3).scale(&crate::rational::rat(4));
        let factors = factorize(&p);
        assert_eq!(factors, vec![(x().add(&Polynomial::one()), 3)]);
    }
}
