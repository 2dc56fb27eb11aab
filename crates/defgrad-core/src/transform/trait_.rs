//! Transform trait for spatial coordinate transformations.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use crate::spatial::Point;
use super::{points_to_tensor, tensor_values};

/// Spatial transformation from one world space into another.
///
/// Implementations are read-only once built; the same transform may be
/// evaluated any number of times with identical results.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `D` - The spatial dimensionality
pub trait Transform<B: Backend, const D: usize> {
    /// Apply the transform to a batch of world points.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[Batch, D]`
    ///
    /// # Returns
    /// Tensor of shape `[Batch, D]` containing the transformed points
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Analytic Jacobian `∂T(x)/∂x` at a world point.
    ///
    /// Entry `(r, c)` is the derivative of output component `r` with respect
    /// to input component `c`.
    fn jacobian(&self, point: &Point<D>, device: &B::Device) -> SMatrix<f64, D, D>;

    /// Apply the transform to a single world point.
    fn transform_point(&self, point: &Point<D>, device: &B::Device) -> Point<D> {
        let transformed = self.transform_points(points_to_tensor(&[*point], device));
        let values = tensor_values(transformed);
        let mut out = Point::origin();
        for i in 0..D {
            out[i] = values[i];
        }
        out
    }
}
