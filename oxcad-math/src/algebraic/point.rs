//! Points with real algebraic coordinates.

use super::number::RealAlgebraicNumber;
use crate::polynomial::Var;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Index;

/// A point in R^n given by real algebraic coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealAlgebraicPoint {
    coords: Vec<RealAlgebraicNumber>,
}

impl RealAlgebraicPoint {
    /// Create a point from its coordinates.
    pub fn new(coords: Vec<RealAlgebraicNumber>) -> Self {
        Self { coords }
    }

    /// The zero-dimensional point.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of coordinates.
    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Check whether the point has no coordinates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The point extended by one trailing coordinate.
    #[must_use]
    pub fn conjoin(&self, value: RealAlgebraicNumber) -> Self {
        let mut coords = self.coords.clone();
        coords.push(value);
        Self { coords }
    }

    /// Coordinate `i`, if present.
    pub fn get(&self, i: usize) -> Option<&RealAlgebraicNumber> {
        self.coords.get(i)
    }

    /// Iterate over the coordinates.
    pub fn iter(&self) -> std::slice::Iter<'_, RealAlgebraicNumber> {
        self.coords.iter()
    }

    /// Assignment mapping `vars[i]` to coordinate `i`.
    ///
    /// Extra variables or extra coordinates are ignored.
    pub fn to_assignment(&self, vars: &[Var]) -> FxHashMap<Var, RealAlgebraicNumber> {
        vars.iter()
            .copied()
            .zip(self.coords.iter().cloned())
            .collect()
    }
}

impl Index<usize> for RealAlgebraicPoint {
    type Output = RealAlgebraicNumber;

    fn index(&self, i: usize) -> &RealAlgebraicNumber {
        &self.coords[i]
    }
}

impl FromIterator<RealAlgebraicNumber> for RealAlgebraicPoint {
    fn from_iter<I: IntoIterator<Item = RealAlgebraicNumber>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for RealAlgebraicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::rat;

    #[test]
    fn test_conjoin_and_assignment() {
        let p = RealAlgebraicPoint::empty()
            .conjoin(RealAlgebraicNumber::from_rational(rat(1)))
            .conjoin(RealAlgebraicNumber::from_rational(rat(-2)));
        assert_eq!(p.dim(), 2);
        assert_eq!(p[1].numeric_value(), Some(&rat(-2)));
        let a = p.to_assignment(&[7, 3]);
        assert_eq!(a[&3].numeric_value(), Some(&rat(-2)));
        assert_eq!(p.to_string(), "(1, -2)");
    }
}
