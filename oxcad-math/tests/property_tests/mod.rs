//! Property-based tests for oxcad-math
//!
//! This module contains property tests for:
//! - Polynomial arithmetic, gcd and resultants
//! - Root isolation and real algebraic numbers
//! - Exact interval arithmetic

mod interval_properties;
mod polynomial_properties;
mod root_properties;
