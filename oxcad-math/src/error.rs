//! Error types for the exact arithmetic layer.

use crate::polynomial::Var;
use thiserror::Error;

/// Errors raised by polynomial, interval and algebraic number operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// A nonzero polynomial was required.
    #[error("polynomial is zero")]
    ZeroPolynomial,

    /// The interval does not contain exactly one root of the polynomial.
    #[error("interval ({lower}, {upper}) does not isolate a single root")]
    NonIsolatingInterval {
        /// Lower endpoint as text.
        lower: String,
        /// Upper endpoint as text.
        upper: String,
    },

    /// A univariate polynomial was expected.
    #[error("polynomial is not univariate in x{0}")]
    NotUnivariate(Var),

    /// An evaluation assignment did not cover a variable of the polynomial.
    #[error("no value assigned to variable x{0}")]
    MissingVariable(Var),

    /// Eliminating algebraic coordinates collapsed to the zero polynomial in
    /// every elimination order tried.
    #[error("projection of algebraic coordinates degenerated to zero")]
    DegenerateProjection,
}

/// Result type for math operations.
pub type MathResult<T> = Result<T, MathError>;
