//! Error types for the CAD engine.
//!
//! Search exhaustion, vanishing polynomials and interruption are regular
//! outcomes of [`crate::Cad::check`] and never surface here.

use oxcad_math::{MathError, Var};
use thiserror::Error;

/// Errors raised by the CAD engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadError {
    /// A variable the decomposition does not track.
    #[error("variable x{0} is not part of the decomposition")]
    UnknownVariable(Var),

    /// A bound was given for a level the decomposition does not have.
    #[error("bound on level {level} but the decomposition has {dimension} levels")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Number of levels.
        dimension: usize,
    },

    /// A point does not have one coordinate per variable.
    #[error("expected a point of dimension {expected}, found {found}")]
    DimensionMismatch {
        /// Number of variables.
        expected: usize,
        /// Dimension of the point.
        found: usize,
    },

    /// Settings that cannot be combined.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Failure in the arithmetic layer.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type for CAD operations.
pub type CadResult<T> = Result<T, CadError>;
