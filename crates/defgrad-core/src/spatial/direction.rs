//! Direction cosine matrix describing image axis orientation.

use nalgebra::SMatrix;
use super::Vector;

/// Direction matrix of an image.
///
/// Column `i` is the world-space direction of image axis `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Identity orientation (image axes aligned with world axes).
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Build a direction matrix from its axis columns.
    pub fn from_columns(columns: [Vector<D>; D]) -> Self {
        let cols = columns.map(|c| c.0);
        Self(SMatrix::from_columns(&cols))
    }

    /// Try to compute the inverse of the direction matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}
