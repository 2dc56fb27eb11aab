//! Pure translation.

use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use crate::spatial::Point;
use super::trait_::Transform;

/// `T(x) = x + t`. Its deformation gradient is the identity everywhere.
#[derive(Module, Debug)]
pub struct TranslationTransform<B: Backend, const D: usize> {
    offset: Param<Tensor<B, 1>>,
}

impl<B: Backend, const D: usize> TranslationTransform<B, D> {
    /// `offset` is `[D]`.
    pub fn new(offset: Tensor<B, 1>) -> Self {
        Self { offset: Param::from_tensor(offset) }
    }
}

impl<B: Backend, const D: usize> Transform<B, D> for TranslationTransform<B, D> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        points + self.offset.val().reshape([1, D])
    }

    fn jacobian(&self, _point: &Point<D>, _device: &B::Device) -> SMatrix<f64, D, D> {
        SMatrix::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_is_shifted() {
        let device = Default::default();
        let transform = TranslationTransform::<TestBackend, 3>::new(Tensor::from_floats([1.0, 2.0, 3.0], &device));
        let points = Tensor::<TestBackend, 2>::from_floats([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], &device);
        let moved: Vec<f32> = transform.transform_points(points).into_data().to_vec().unwrap();
        assert_eq!(moved, vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_jacobian_ignores_offset() {
        let device = Default::default();
        let transform = TranslationTransform::<TestBackend, 3>::new(Tensor::from_floats([5.0, -2.0, 7.0], &device));
        assert_eq!(transform.jacobian(&Point::new([1.0, 2.0, 3.0]), &device), SMatrix::<f64, 3, 3>::identity());
        assert_eq!(transform.transform_point(&Point::new([1.0, 2.0, 3.0]), &device), Point::new([6.0, 0.0, 10.0]));
    }
}
