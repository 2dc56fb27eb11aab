//! Unit-quaternion rigid motion about a center.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{Matrix3, Quaternion, UnitQuaternion};

use crate::spatial::Point;
use super::trait_::Transform;
use super::{apply_centered_linear, matrix_tensor, vector_tensor};

/// `T(x) = R (x - c) + c + t` where `R` comes from a versor.
///
/// The quaternion is given as `(x, y, z, w)` and normalized on construction,
/// so any non-zero quaternion describes a proper rotation.
#[derive(Debug, Clone)]
pub struct VersorRigid3DTransform<B: Backend> {
    rotation: Matrix3<f64>,
    rotation_tensor: Tensor<B, 2>,
    translation: Tensor<B, 1>,
    center: Tensor<B, 1>,
}

impl<B: Backend> VersorRigid3DTransform<B> {
    pub fn new(quaternion: [f64; 4], translation: [f64; 3], center: [f64; 3], device: &B::Device) -> Self {
        let [x, y, z, w] = quaternion;
        let versor = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
        let rotation = versor.to_rotation_matrix().into_inner();
        Self {
            rotation,
            rotation_tensor: matrix_tensor(&rotation, device),
            translation: vector_tensor(&translation, device),
            center: vector_tensor(&center, device),
        }
    }
}

impl<B: Backend> Transform<B, 3> for VersorRigid3DTransform<B> {
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
    use std::f64::consts::FRAC_PI_4;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_half_angle_about_x() {
        let device = Default::default();
        // sin/cos of 45 degrees encodes a 90 degree turn: y goes to z.
        let quaternion = [FRAC_PI_4.sin(), 0.0, 0.0, FRAC_PI_4.cos()];
        let transform = VersorRigid3DTransform::<TestBackend>::new(quaternion, [0.0; 3], [0.0; 3], &device);

        let moved = transform.transform_point(&Point::new([0.0, 1.0, 0.0]), &device);
        assert!(moved[0].abs() < 1e-5 && moved[1].abs() < 1e-5);
        assert!((moved[2] - 1.0).abs() < 1e-5);

        let jac = transform.jacobian(&Point::origin(), &device);
        assert!((jac[(2, 1)] - 1.0).abs() < 1e-12);
        assert!((jac[(1, 2)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_quaternion_is_normalized() {
        let device = Default::default();
        let transform = VersorRigid3DTransform::<TestBackend>::new([0.0, 0.0, 0.0, 3.0], [1.0, 0.0, 0.0], [0.0; 3], &device);
        assert!((transform.jacobian(&Point::origin(), &device) - Matrix3::identity()).abs().max() < 1e-12);

        let moved = transform.transform_point(&Point::new([2.0, 2.0, 2.0]), &device);
        assert!((moved[0] - 3.0).abs() < 1e-5);
    }
}
