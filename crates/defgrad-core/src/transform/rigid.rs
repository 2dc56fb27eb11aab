//! Euler-angle rigid motion about a center.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{Matrix3, Rotation3};

use crate::spatial::Point;
use super::trait_::Transform;
use super::{apply_centered_linear, matrix_tensor, vector_tensor};

/// `T(x) = R (x - c) + c + t` with `R = Rz(γ) · Ry(β) · Rx(α)`.
///
/// Angles are in radians, ordered `(α, β, γ)` about x, y and z.
#[derive(Debug, Clone)]
pub struct RigidTransform<B: Backend> {
    rotation: Matrix3<f64>,
    rotation_tensor: Tensor<B, 2>,
    translation: Tensor<B, 1>,
    center: Tensor<B, 1>,
}

impl<B: Backend> RigidTransform<B> {
    pub fn new(angles: [f64; 3], translation: [f64; 3], center: [f64; 3], device: &B::Device) -> Self {
        let [alpha, beta, gamma] = angles;
        let rotation = Rotation3::from_euler_angles(alpha, beta, gamma).into_inner();
        Self {
            rotation,
            rotation_tensor: matrix_tensor(&rotation, device),
            translation: vector_tensor(&translation, device),
            center: vector_tensor(&center, device),
        }
    }
}

impl<B: Backend> Transform<B, 3> for RigidTransform<B> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        apply_centered_linear::<B, 3>(
            points,
            self.rotation_tensor.clone(),
            self.center.clone(),
            self.translation.clone(),
        )
    }

    fn jacobian(&self, _point: &Point<3>, _device: &B::Device) -> Matrix3<f64> {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use std::f64::consts::FRAC_PI_2;

    type TestBackend = NdArray<f32>;

    fn close(a: &Point<3>, b: [f64; 3]) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-5)
    }

    #[test]
    fn test_quarter_turn_about_z_then_shift() {
        let device = Default::default();
        let transform = RigidTransform::<TestBackend>::new([0.0, 0.0, FRAC_PI_2], [1.0, 2.0, 3.0], [0.0; 3], &device);
        let moved = transform.transform_point(&Point::new([1.0, 0.0, 0.0]), &device);
        assert!(close(&moved, [1.0, 3.0, 3.0]), "{moved:?}");
    }

    #[test]
    fn test_center_is_fixed_without_translation() {
        let device = Default::default();
        let center = [4.0, -1.0, 2.5];
        let transform = RigidTransform::<TestBackend>::new([0.4, 0.1, -0.9], [0.0; 3], center, &device);
        let moved = transform.transform_point(&Point::new(center), &device);
        assert!(close(&moved, center), "{moved:?}");
    }

    #[test]
    fn test_x_rotation_applies_before_z() {
        let device = Default::default();
        // Rx(90) takes y to z; Rz(90) then leaves z alone.
        let transform = RigidTransform::<TestBackend>::new([FRAC_PI_2, 0.0, FRAC_PI_2], [0.0; 3], [0.0; 3], &device);
        let moved = transform.transform_point(&Point::new([0.0, 1.0, 0.0]), &device);
        assert!(close(&moved, [0.0, 0.0, 1.0]), "{moved:?}");
    }

    #[test]
    fn test_jacobian_is_orthonormal() {
        let device = Default::default();
        let transform = RigidTransform::<TestBackend>::new([0.3, -0.2, 0.7], [0.0; 3], [5.0; 3], &device);
        let jac = transform.jacobian(&Point::new([1.0, 2.0, 3.0]), &device);
        assert!((jac.determinant() - 1.0).abs() < 1e-12);
        assert!((jac * jac.transpose() - Matrix3::identity()).abs().max() < 1e-12);
    }
}
