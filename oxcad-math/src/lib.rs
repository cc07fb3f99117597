//! OxCAD Math - Exact Arithmetic for Cylindrical Algebraic Decomposition
//!
//! This crate provides the exact number and polynomial layer consumed by the
//! `oxcad` decision procedure:
//! - Sparse multivariate [`polynomial::Polynomial`] over `BigRational` with
//!   pseudo-remainders, subresultant resultants, discriminants, gcd and
//!   squarefree factorization
//! - Dense univariate polynomials with Sturm-sequence root isolation
//! - [`interval::ExactInterval`] with open, closed and infinite bounds plus
//!   interval evaluation of polynomials over a box
//! - [`algebraic::RealAlgebraicNumber`] (numeric or isolating-interval roots),
//!   sign evaluation at algebraic points and real root isolation under a
//!   partial algebraic assignment
//!
//! # Examples
//!
//! ```
//! use oxcad_math::polynomial::Polynomial;
//! use oxcad_math::algebraic::{real_roots, RealRoots};
//! use rustc_hash::FxHashMap;
//!
//! // x^2 - 2
//! let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-2, &[])]);
//! let roots = real_roots(&p, 0, &FxHashMap::default(), None).unwrap();
//! match roots {
//!     RealRoots::Roots(r) => assert_eq!(r.len(), 2),
//!     RealRoots::Nullified => unreachable!(),
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod algebraic;
pub mod error;
pub mod interval;
pub mod polynomial;
pub mod rational;
pub mod sign;
pub mod univariate;

pub use algebraic::{RealAlgebraicNumber, RealAlgebraicPoint, RealRoots};
pub use error::{MathError, MathResult};
pub use interval::{BoundType, ExactInterval};
pub use polynomial::{Monomial, Polynomial, Term, Var, NULL_VAR};
pub use sign::Sign;
pub use univariate::UnivariatePolynomial;
