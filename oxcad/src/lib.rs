//! OxCAD - Incremental Cylindrical Algebraic Decomposition
//!
//! This crate decides satisfiability of conjunctions of polynomial sign
//! constraints over the reals. It is meant to run inside an SMT solver's
//! nonlinear real arithmetic theory: polynomials and variables can be added
//! and removed between checks, and work done by earlier checks is reused.
//!
//! # Features
//!
//! - Lazy projection with per-level elimination sets and provenance
//! - Lazy lifting over a sample tree with configurable sample preference
//! - Warm restart from the last satisfying path
//! - Interval bounds for pruning samples and projection polynomials
//! - Conflict graphs for infeasible subsets and bound deductions
//! - SMT-LIB2 diagnostic dumps of checked constraint sets
//!
//! # Examples
//!
//! ```
//! use oxcad::{Cad, CadSettings, Constraint};
//! use oxcad_math::Polynomial;
//!
//! // x^2 + y^2 - 1 < 0 and x - y = 0
//! let circle = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
//! let line = Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
//!
//! let mut cad = Cad::new(CadSettings::default());
//! let model = cad
//!     .find_model(&[Constraint::less(circle), Constraint::eq(line)])
//!     .unwrap();
//! assert!(model.is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bounds;
pub mod cad;
pub mod conflict_graph;
pub mod constraint;
pub mod diagnostics;
pub mod elimination_set;
pub mod error;
pub mod projection;
pub mod sample_set;
pub mod sample_tree;
pub mod settings;

pub use bounds::{BoundMap, Deduction};
pub use cad::{Cad, CadStats, CheckRequest};
pub use conflict_graph::ConflictGraph;
pub use constraint::Constraint;
pub use diagnostics::{DiagnosticSink, DirectorySink, MemorySink, NullSink};
pub use error::{CadError, CadResult};
pub use settings::{CadPreset, CadSettings, PolynomialOrder, SampleFilter, SamplePolicy};

pub use oxcad_math::{ExactInterval, Polynomial, RealAlgebraicNumber, RealAlgebraicPoint, Sign, Var};
