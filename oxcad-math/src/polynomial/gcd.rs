//! Multivariate polynomial GCD over the rationals.
//!
//! ## Algorithm
//!
//! Recursive primitive polynomial remainder sequences: both inputs are viewed
//! as univariate in their largest variable, contents (gcds of coefficients in
//! the remaining variables) are computed recursively, and the gcd of the
//! primitive parts is the primitive part of the last nonzero pseudo-remainder.
//!
//! ## References
//!
//! - Knuth: "The Art of Computer Programming, Vol. 2", §4.6.1
//! - Geddes, Czapor, Labahn: "Algorithms for Computer Algebra" (1992), ch. 7

use super::{Polynomial, Var};

/// Greatest common divisor, normalized (primitive, positive leading
/// coefficient). `gcd(0, 0) = 0`, and the gcd with a nonzero constant is one.
pub fn gcd(a: &Polynomial, b: &Polynomial) -> Polynomial {
    if a.is_zero() {
        return b.normalized();
    }
    if b.is_zero() {
        return a.normalized();
    }
    if a.is_constant() || b.is_constant() {
        return Polynomial::one();
    }

    let var = a.max_var().max(b.max_var());
    if !a.has_var(var) {
        return gcd(a, &content_wrt(b, var));
    }
    if !b.has_var(var) {
        return gcd(&content_wrt(a, var), b);
    }

    let ca = content_wrt(a, var);
    let cb = content_wrt(b, var);
    let content = gcd(&ca, &cb);

    let mut p = primitive_with(a, &ca);
    let mut q = primitive_with(b, &cb);
    if p.degree(var) < q.degree(var) {
        std::mem::swap(&mut p, &mut q);
    }
    while !q.is_zero() {
        let r = p.pseudo_remainder(&q, var);
        p = q;
        q = if r.is_zero() {
            r
        } else {
            primitive_part_wrt(&r, var)
        };
    }

    let g = if p.has_var(var) {
        primitive_part_wrt(&p, var)
    } else {
        Polynomial::one()
    };
    g.mul(&content).normalized()
}

/// Gcd of all coefficients of `p` viewed as univariate in `var`.
pub fn content_wrt(p: &Polynomial, var: Var) -> Polynomial {
    let mut acc = Polynomial::zero();
    for c in p.coefficients(var) {
        if c.is_zero() {
            continue;
        }
        acc = gcd(&acc, &c);
        if acc.is_one() {
            break;
        }
    }
    acc
}

/// `p` divided by its content with respect to `var`.
pub fn primitive_part_wrt(p: &Polynomial, var: Var) -> Polynomial {
    primitive_with(p, &content_wrt(p, var))
}

fn primitive_with(p: &Polynomial, content: &Polynomial) -> Polynomial {
    if content.is_zero() {
        return p.clone();
    }
    p.div_exact(content).unwrap_or_else(|| p.clone())
}

/// Squarefree part: `p / gcd(p, dp/dx_1, ..., dp/dx_n)`, normalized.
pub fn square_free_part(p: &Polynomial) -> Polynomial {
    if p.is_constant() {
        return p.normalized();
    }
    let mut g = p.clone();
    for var in p.vars() {
        g = gcd(&g, &p.derivative(var));
        if g.is_one() {
            return p.normalized();
        }
    }
    p.div_exact(&g)
        .map(|q| q.normalized())
        .unwrap_or_else(|| p.normalized())
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

    #[test]
    fn test_gcd_univariate() {
        // gcd((x-1)(x+1), (x-1)(x+2)) = x - 1
        let one = Polynomial::one();
        let a = x().sub(&one).mul(&x().add(&one));
        let b = x().sub(&one).mul(&x().add(&Polynomial::from_int(2)));
        assert_eq!(gcd(&a, &b), x().sub(&one));
    }

    #[test]
    fn test_gcd_multivariate() {
        // gcd((x + y)(x - y), (x + y)^2 y) = x + y
        let s = x().add(&y());
        let a = s.mul(&x().sub(&y()));
        let b = s.pow(2).mul(&y());
        assert_eq!(gcd(&a, &b), s);
    }

    #[test]
    fn test_gcd_coprime() {
        let a = x().pow(2).add(&y().pow(2)).sub(&Polynomial::one());
        let b = x().sub(&Polynomial::from_int(2));
        assert!(gcd(&a, &b).is_one());
    }

    #[test]
    fn test_content_wrt() {
        // (y^2 - 1) x + (y - 1) has content y - 1 in x
        let one = Polynomial::one();
        let p = y().pow(2).sub(&one).mul(&x()).add(&y().sub(&one));
        assert_eq!(content_wrt(&p, 0), y().sub(&one));
    }

    #[test]
    fn test_square_free_part() {
        // (x - y)^2 (x + 1)
        let p = x().sub(&y()).pow(2).mul(&x().add(&Polynomial::one()));
        let expected = x().sub(&y()).mul(&x().add(&Polynomial::one())).normalized();
        assert_eq!(square_free_part(&p), expected);
    }
}
