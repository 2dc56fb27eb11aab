//! Cubic B-spline free-form deformation.
//!
//! Control points sit on a regular lattice starting at `origin` with spacing
//! `physical_size / (grid_size - 1)`. The displacement at a point is the tensor
//! product of cubic B-spline weights over the surrounding 4x4x4 control points;
//! lattice indices outside the grid are clamped to its border.

use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use nalgebra::{Matrix3, Vector3};

use crate::spatial::Point;
use crate::tensor::{float_tensor, tensor_values};
use super::trait_::Transform;

/// Free-form deformation `T(x) = x + Σ β(u) c` over a 3D control lattice.
#[derive(Module, Debug)]
pub struct BSplineTransform<B: Backend> {
    grid_size: [usize; 3],
    physical_size: [f64; 3],
    /// World position of control point (0, 0, 0)
    origin: [f64; 3],
    /// Control point displacements `[num_control_points, 3]`, x fastest
    coefficients: Param<Tensor<B, 2>>,
    control_point_spacing: [f64; 3],
}

impl<B: Backend> BSplineTransform<B> {
    /// `grid_size` counts control points per axis (at least two);
    /// `coefficients` holds one displacement row per control point.
    pub fn new(
        grid_size: [usize; 3],
        physical_size: [f64; 3],
        origin: [f64; 3],
        coefficients: Tensor<B, 2>,
    ) -> Self {
        let control_point_spacing: [f64; 3] =
            std::array::from_fn(|i| physical_size[i] / (grid_size[i].max(2) - 1) as f64);

        Self {
            grid_size,
            physical_size,
            origin,
            coefficients: Param::from_tensor(coefficients),
            control_point_spacing,
        }
    }

    pub fn grid_size(&self) -> [usize; 3] {
        self.grid_size
    }

    pub fn physical_size(&self) -> [f64; 3] {
        self.physical_size
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Distance between neighbouring control points.
    pub fn control_point_spacing(&self) -> [f64; 3] {
        self.control_point_spacing
    }

    pub fn coefficients(&self) -> Tensor<B, 2> {
        self.coefficients.val()
    }

    /// Uniform cubic weights for a fractional offset `u` in `[0, 1)`.
    fn basis_weights(u: Tensor<B, 1>) -> [Tensor<B, 1>; 4] {
        let one_minus_u = u.clone().neg().add_scalar(1.0);
        let b0 = one_minus_u.powf_scalar(3.0) / 6.0;

        let u2 = u.clone().powf_scalar(2.0);
        let u3 = u.clone().powf_scalar(3.0);
        let b1 = (u3.clone().mul_scalar(3.0) - u2.clone().mul_scalar(6.0)).add_scalar(4.0) / 6.0;
        let b2 = (u3.clone().mul_scalar(-3.0) + u2.mul_scalar(3.0) + u.mul_scalar(3.0)).add_scalar(1.0) / 6.0;
        let b3 = u3 / 6.0;

        [b0, b1, b2, b3]
    }

    /// Basis values stacked as `[Batch, 4]`.
    fn stacked_weights(u: Tensor<B, 1>) -> Tensor<B, 2> {
        let [b0, b1, b2, b3] = Self::basis_weights(u);
        Tensor::cat(
            vec![
                b0.unsqueeze_dim::<2>(1),
                b1.unsqueeze_dim::<2>(1),
                b2.unsqueeze_dim::<2>(1),
                b3.unsqueeze_dim::<2>(1),
            ],
            1,
        )
    }

    fn clamp_index(&self, axis: usize, index: i64) -> usize {
        index.clamp(0, self.grid_size[axis] as i64 - 1) as usize
    }
}

fn basis(u: f64) -> [f64; 4] {
    let v = 1.0 - u;
    [
        v * v * v / 6.0,
        (3.0 * u * u * u - 6.0 * u * u + 4.0) / 6.0,
        (-3.0 * u * u * u + 3.0 * u * u + 3.0 * u + 1.0) / 6.0,
        u * u * u / 6.0,
    ]
}

fn basis_derivative(u: f64) -> [f64; 4] {
    let v = 1.0 - u;
    [
        -0.5 * v * v,
        1.5 * u * u - 2.0 * u,
        -1.5 * u * u + u + 0.5,
        0.5 * u * u,
    ]
}

impl<B: Backend> Transform<B, 3> for BSplineTransform<B> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let batch_size = points.shape().dims[0];

        let origin_tensor = float_tensor::<B, 2>(self.origin.to_vec(), [1, 3], &device);
        let spacing_tensor = float_tensor::<B, 2>(self.control_point_spacing.to_vec(), [1, 3], &device);

        let grid_coords = (points.clone() - origin_tensor) / spacing_tensor; // [Batch, 3]
        let grid_indices_float = grid_coords.clone().floor();
        let u_vec = grid_coords - grid_indices_float.clone();
        let base_index = grid_indices_float.int() - 1; // [Batch, 3]

        let ux = u_vec.clone().slice([0..batch_size, 0..1]).squeeze(1);
        let uy = u_vec.clone().slice([0..batch_size, 1..2]).squeeze(1);
        let uz = u_vec.slice([0..batch_size, 2..3]).squeeze(1);

        let bx = Self::stacked_weights(ux); // [Batch, 4]
        let by = Self::stacked_weights(uy);
        let bz = Self::stacked_weights(uz);

        // W[b, i, j, k] = Bx[b, i] * By[b, j] * Bz[b, k]
        let weights = bx.unsqueeze_dim::<3>(2).unsqueeze_dim::<4>(3)
            * by.unsqueeze_dim::<3>(1).unsqueeze_dim::<4>(3)
            * bz.unsqueeze_dim::<3>(1).unsqueeze_dim::<4>(1);
        let weights = weights.reshape([batch_size, 64, 1]);

        let nx = self.grid_size[0] as i32;
        let ny = self.grid_size[1] as i32;
        let nz = self.grid_size[2] as i32;

        let range = Tensor::<B, 1, Int>::from_ints([0, 1, 2, 3], &device);
        let i_idx = range.clone().reshape([1, 4, 1, 1]);
        let j_idx = range.clone().reshape([1, 1, 4, 1]);
        let k_idx = range.reshape([1, 1, 1, 4]);

        let base_x = base_index.clone().slice([0..batch_size, 0..1]).unsqueeze_dim::<3>(2).unsqueeze_dim::<4>(3);
        let base_y = base_index.clone().slice([0..batch_size, 1..2]).unsqueeze_dim::<3>(2).unsqueeze_dim::<4>(3);
        let base_z = base_index.slice([0..batch_size, 2..3]).unsqueeze_dim::<3>(2).unsqueeze_dim::<4>(3);

        // Adding zeros broadcasts each offset over the full 4x4x4 stencil.
        let zeros = Tensor::<B, 4, Int>::zeros([1, 4, 4, 4], &device);
        let idx_x = (base_x + i_idx + zeros.clone()).reshape([batch_size, 64]).clamp(0, nx - 1);
        let idx_y = (base_y + j_idx + zeros.clone()).reshape([batch_size, 64]).clamp(0, ny - 1);
        let idx_z = (base_z + k_idx + zeros).reshape([batch_size, 64]).clamp(0, nz - 1);

        let flat_indices = idx_z * (nx * ny) + idx_y * nx + idx_x;
        let gather_indices = flat_indices.reshape([batch_size * 64]);

        let coeffs = self.coefficients.val().select(0, gather_indices).reshape([batch_size, 64, 3]);
        let displacement = (coeffs * weights).sum_dim(1).squeeze(1);

        points + displacement
    }

    fn jacobian(&self, point: &Point<3>, _device: &B::Device) -> Matrix3<f64> {
        let coefficients = tensor_values(self.coefficients.val());

        let mut base = [0i64; 3];
        let mut values = [[0.0; 4]; 3];
        let mut slopes = [[0.0; 4]; 3];
        for axis in 0..3 {
            let u = (point[axis] - self.origin[axis]) / self.control_point_spacing[axis];
            let cell = u.floor();
            base[axis] = cell as i64 - 1;
            values[axis] = basis(u - cell);
            slopes[axis] = basis_derivative(u - cell).map(|d| d / self.control_point_spacing[axis]);
        }

        let (nx, ny) = (self.grid_size[0], self.grid_size[1]);
        let mut jac = Matrix3::identity();
        for i in 0..4 {
            let x = self.clamp_index(0, base[0] + i as i64);
            for j in 0..4 {
                let y = self.clamp_index(1, base[1] + j as i64);
                for k in 0..4 {
                    let z = self.clamp_index(2, base[2] + k as i64);
                    let flat = z * nx * ny + y * nx + x;
                    let coeff = Vector3::new(
                        coefficients[flat * 3],
                        coefficients[flat * 3 + 1],
                        coefficients[flat * 3 + 2],
                    );
                    let gradient = Vector3::new(
                        slopes[0][i] * values[1][j] * values[2][k],
                        values[0][i] * slopes[1][j] * values[2][k],
                        values[0][i] * values[1][j] * slopes[2][k],
                    );
                    jac += coeff * gradient.transpose();
                }
            }
        }
        jac
    }
}
