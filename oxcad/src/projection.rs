//! Projection operator.
//!
//! A polynomial p of degree d in its main variable x contributes
//!
//! - the leading coefficients of its reducta, down to the first one that is
//!   a nonzero number (below that the degree in x can no longer drop),
//! - the discriminants of those reducta,
//!
//! and every pair (p, q) contributes res_x(p, q). Results are reduced to
//! canonical squarefree factors before they enter the next level.
//!
//! ## References
//!
//! - Collins: "Quantifier elimination for real closed fields by cylindrical
//!   algebraic decomposition" (1975)
//! - McCallum: "An improved projection operation for cylindrical algebraic
//!   decomposition" (1988)

use crate::settings::CadSettings;
use oxcad_math::polynomial::factorization::square_free_factors;
use oxcad_math::polynomial::root_isolation::count_real_roots;
use oxcad_math::{Polynomial, UnivariatePolynomial, Var};

/// The polynomial without its leading term in the main variable.
pub fn reductum(p: &UnivariatePolynomial) -> UnivariatePolynomial {
    let coeffs = p.coefficients();
    let rest = &coeffs[..coeffs.len().saturating_sub(1)];
    UnivariatePolynomial::new(Polynomial::from_coefficients(p.main_var(), rest), p.main_var())
}

/// Projection polynomials contributed by `p` alone.
pub fn single_projection(p: &UnivariatePolynomial) -> Vec<Polynomial> {
    let mut out = Vec::new();
    let mut r = p.clone();
    while !r.is_zero() {
        if r.degree() >= 2 {
            out.push(r.discriminant());
        }
        let lc = r.leading_coefficient();
        let numeric = lc.is_constant();
        out.push(lc);
        if numeric || r.degree() == 0 {
            break;
        }
        r = reductum(&r);
    }
    out
}

/// Projection polynomial contributed by the pair `(p, q)`.
pub fn paired_projection(p: &UnivariatePolynomial, q: &UnivariatePolynomial) -> Polynomial {
    p.resultant(q)
}

/// Canonical factors of a projection polynomial, viewed in `var`.
///
/// Numbers vanish nowhere or everywhere and are dropped. With root counting
/// enabled, univariate factors in `var` without real roots are dropped too.
pub fn simplify(poly: &Polynomial, var: Var, settings: &CadSettings) -> Vec<UnivariatePolynomial> {
    if poly.is_constant() {
        return Vec::new();
    }
    let factors = if settings.simplify_by_factorization {
        square_free_factors(poly)
    } else {
        vec![poly.normalized()]
    };
    factors
        .into_iter()
        .filter(|f| !f.is_constant())
        .filter(|f| {
            !settings.simplify_by_rootcounting
                || f.univariate_var() != Some(var)
                || f.to_dense(var).map_or(true, |d| count_real_roots(&d) > 0)
        })
        .map(|f| UnivariatePolynomial::new(f, var))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(coeffs: &[(i64, &[(u32, u32)])], var: u32) -> UnivariatePolynomial {
        UnivariatePolynomial::new(Polynomial::from_coeffs_int(coeffs), var)
    }

    #[test]
    fn test_reductum() {
        // y x^2 + x - 3 in x
        let p = up(&[(1, &[(0, 2), (1, 1)]), (1, &[(0, 1)]), (-3, &[])], 0);
        let r = reductum(&p);
        assert_eq!(r.polynomial(), &Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-3, &[])]));
    }

    #[test]
    fn test_single_projection_stops_at_numeric_coefficient() {
        // x^2 + y^2 - 1 in x: discriminant and the leading coefficient 1
        let p = up(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])], 0);
        let out = single_projection(&p);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Polynomial::from_coeffs_int(&[(-4, &[(1, 2)]), (4, &[])]));
        assert!(out[1].is_one());
    }

    #[test]
    fn test_single_projection_walks_reducta() {
        // y x + 1 in x: leading coefficient y, then the constant 1
        let p = up(&[(1, &[(0, 1), (1, 1)]), (1, &[])], 0);
        let out = single_projection(&p);
        assert_eq!(out, vec![Polynomial::from_var(1), Polynomial::one()]);
    }

    #[test]
    fn test_simplify() {
        let settings = CadSettings::base();
        // -4 y^2 + 4 becomes the single squarefree factor y^2 - 1
        let d = Polynomial::from_coeffs_int(&[(-4, &[(1, 2)]), (4, &[])]);
        let out = simplify(&d, 1, &settings);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].polynomial(), &Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (-1, &[])]));
        assert!(simplify(&Polynomial::from_int(7), 1, &settings).is_empty());

        // y^2 + 1 has no real roots
        let counting = CadSettings {
            simplify_by_rootcounting: true,
            ..CadSettings::base()
        };
        let q = Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (1, &[])]);
        assert!(simplify(&q, 1, &counting).is_empty());
        assert_eq!(simplify(&q, 1, &settings).len(), 1);
    }
}
