//! General affine map about a center.

use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use crate::spatial::Point;
use super::trait_::Transform;
use super::{apply_centered_linear, tensor_matrix};

/// `T(x) = A (x - c) + c + t`.
///
/// The Jacobian is `A` everywhere, so the deformation gradient of an affine
/// map is constant over the whole field.
#[derive(Module, Debug)]
pub struct AffineTransform<B: Backend, const D: usize> {
    linear: Param<Tensor<B, 2>>,
    offset: Param<Tensor<B, 1>>,
    center: Tensor<B, 1>,
}

impl<B: Backend, const D: usize> AffineTransform<B, D> {
    /// `linear` is `[D, D]` row-major; `offset` and `center` are `[D]`.
    pub fn new(linear: Tensor<B, 2>, offset: Tensor<B, 1>, center: Tensor<B, 1>) -> Self {
        Self {
            linear: Param::from_tensor(linear),
            offset: Param::from_tensor(offset),
            center,
        }
    }

    pub fn linear(&self) -> SMatrix<f64, D, D> {
        tensor_matrix(self.linear.val())
    }
}

impl<B: Backend, const D: usize> Transform<B, D> for AffineTransform<B, D> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        apply_centered_linear::<B, D>(points, self.linear.val(), self.center.clone(), self.offset.val())
    }

    fn jacobian(&self, _point: &Point<D>, _device: &B::Device) -> SMatrix<f64, D, D> {
        self.linear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_eye_without_offset_moves_nothing() {
        let device = Default::default();
        let transform = AffineTransform::<TestBackend, 3>::new(
            Tensor::eye(3, &device),
            Tensor::zeros([3], &device),
            Tensor::from_floats([7.0, 7.0, 7.0], &device),
        );
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0, 3.0], [-4.0, 0.5, 6.0]], &device);
        let moved: Vec<f32> = transform.transform_points(points).into_data().to_vec().unwrap();
        assert_eq!(moved, vec![1.0, 2.0, 3.0, -4.0, 0.5, 6.0]);
    }

    #[test]
    fn test_shear_about_center() {
        let device = Default::default();
        // x' = x + 0.5 (y - 10), shifted by one along x.
        let linear = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.5], [0.0, 1.0]], &device);
        let transform = AffineTransform::<TestBackend, 2>::new(
            linear,
            Tensor::from_floats([1.0, 0.0], &device),
            Tensor::from_floats([10.0, 10.0], &device),
        );

        let moved = transform.transform_point(&Point::new([10.0, 12.0]), &device);
        assert!((moved[0] - 12.0).abs() < 1e-6);
        assert!((moved[1] - 12.0).abs() < 1e-6);

        let jac = transform.jacobian(&Point::new([-3.0, 8.0]), &device);
        assert_eq!(jac, SMatrix::<f64, 2, 2>::new(1.0, 0.5, 0.0, 1.0));
    }
}
