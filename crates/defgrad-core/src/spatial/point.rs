//! Point type for positions in image (index) or world (physical) space.

use nalgebra::Point as NaPoint;
use super::Vector;
use std::fmt;

/// A point in D-dimensional space.
///
/// The same type is used for continuous image indices and for world
/// coordinates; which space a point lives in is a property of where it came
/// from, not of the type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// Create a point at the origin.
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Create a point from integer index coordinates.
    pub fn from_index(index: [usize; D]) -> Self {
        Self::new(index.map(|i| i as f64))
    }

    /// Copy of this point with one coordinate shifted by `delta`.
    pub fn offset_along(&self, axis: usize, delta: f64) -> Self {
        let mut shifted = *self;
        shifted[axis] += delta;
        shifted
    }

    /// Coordinates as a plain array.
    pub fn to_array(&self) -> [f64; D] {
        std::array::from_fn(|i| self.0.coords[i])
    }

}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}

impl<const D: usize> std::ops::Sub for Point<D> {
    type Output = Vector<D>;

    fn sub(self, other: Self) -> Self::Output {
        Vector(self.0.coords - other.0.coords)
    }
}

impl<const D: usize> std::ops::Add<Vector<D>> for Point<D> {
    type Output = Self;

    fn add(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 + vector.0)
    }
}

impl<const D: usize> fmt::Display for Point<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for i in 0..D {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", self[i])?;
        }
        write!(f, ")")
    }
}
