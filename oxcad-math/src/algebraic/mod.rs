//! Real Algebraic Numbers.
//!
//! Numbers represented exactly or by isolating intervals, sign evaluation
//! of polynomials at algebraic points and real root isolation under a
//! partial algebraic assignment. These are the primitives the CAD lifting
//! phase is built on.

pub mod evaluate;
pub mod isolate;
pub mod number;
pub mod point;

pub use evaluate::{nonzero_sign_at, sign_at};
pub use isolate::{real_roots, RealRoots};
pub use number::{IsolatingInterval, RanValue, RealAlgebraicNumber};
pub use point::RealAlgebraicPoint;
