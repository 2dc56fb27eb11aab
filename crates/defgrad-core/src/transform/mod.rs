//! Spatial transforms.
//!
//! Every transform maps batches of world points through `burn` tensors and
//! reports its analytic Jacobian on the CPU. [`TransformKind`] closes the set
//! of families so a transform read from a file can be held by value.

pub mod trait_;
pub mod translation;
pub mod scale;
pub mod affine;
pub mod rigid;
pub mod versor;
pub mod bspline;
pub mod chained;
pub mod kind;
pub mod descriptor;

pub use trait_::Transform;
pub use translation::TranslationTransform;
pub use scale::ScaleTransform;
pub use affine::AffineTransform;
pub use rigid::RigidTransform;
pub use versor::VersorRigid3DTransform;
pub use bspline::BSplineTransform;
pub use chained::ChainedTransform;
pub use kind::TransformKind;
pub use descriptor::{DescriptorError, TransformDescriptor};

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use crate::spatial::Point;
pub(crate) use crate::tensor::tensor_values;
use crate::tensor::float_tensor;

/// Read a `[D, D]` tensor back as a matrix.
pub(crate) fn tensor_matrix<B: Backend, const D: usize>(tensor: Tensor<B, 2>) -> SMatrix<f64, D, D> {
    SMatrix::from_row_slice(&tensor_values(tensor))
}

/// Pack points into a `[N, D]` tensor.
pub(crate) fn points_to_tensor<B: Backend, const D: usize>(points: &[Point<D>], device: &B::Device) -> Tensor<B, 2> {
    let flat = points.iter().flat_map(|point| point.to_array()).collect();
    float_tensor(flat, [points.len(), D], device)
}

/// Build a 1D tensor from `f64` values.
pub(crate) fn vector_tensor<B: Backend>(values: &[f64], device: &B::Device) -> Tensor<B, 1> {
    float_tensor(values.to_vec(), [values.len()], device)
}

/// Upload a matrix as a row-major `[D, D]` tensor.
pub(crate) fn matrix_tensor<B: Backend, const D: usize>(matrix: &SMatrix<f64, D, D>, device: &B::Device) -> Tensor<B, 2> {
    let mut flat = Vec::with_capacity(D * D);
    for r in 0..D {
        for c in 0..D {
            flat.push(matrix[(r, c)]);
        }
    }
    float_tensor(flat, [D, D], device)
}

/// Map row-vector points through `y = A (x - c) + c + t`.
pub(crate) fn apply_centered_linear<B: Backend, const D: usize>(
    points: Tensor<B, 2>,
    matrix: Tensor<B, 2>,
    center: Tensor<B, 1>,
    offset: Tensor<B, 1>,
) -> Tensor<B, 2> {
    let c = center.reshape([1, D]);
    (points - c.clone()).matmul(matrix.transpose()) + c + offset.reshape([1, D])
}
