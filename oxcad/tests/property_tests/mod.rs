//! Property-based tests for oxcad
//!
//! This module contains property tests for:
//! - Soundness of satisfiable and unsatisfiable answers
//! - Structural invariants of the sample tree and elimination sets
//!   across incremental checks

mod check_properties;
mod structure_properties;
