//! Axis-aligned scaling about a center.

use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{SMatrix, SVector};

use crate::spatial::Point;
use super::tensor_values;
use super::trait_::Transform;

/// `T(x) = diag(s) (x - c) + c`.
#[derive(Module, Debug)]
pub struct ScaleTransform<B: Backend, const D: usize> {
    factors: Param<Tensor<B, 1>>,
    center: Tensor<B, 1>,
}

impl<B: Backend, const D: usize> ScaleTransform<B, D> {
    /// `factors` and `center` are both `[D]`.
    pub fn new(factors: Tensor<B, 1>, center: Tensor<B, 1>) -> Self {
        Self {
            factors: Param::from_tensor(factors),
            center,
        }
    }

    /// The same factor on every axis, about the world origin.
    pub fn isotropic(factor: f64, device: &B::Device) -> Self {
        Self::new(Tensor::full([D], factor, device), Tensor::zeros([D], device))
    }

    pub fn factors(&self) -> SVector<f64, D> {
        SVector::from_iterator(tensor_values(self.factors.val()))
    }
}

impl<B: Backend, const D: usize> Transform<B, D> for ScaleTransform<B, D> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let c = self.center.clone().reshape([1, D]);
        (points - c.clone()) * self.factors.val().reshape([1, D]) + c
    }

    fn jacobian(&self, _point: &Point<D>, _device: &B::Device) -> SMatrix<f64, D, D> {
        SMatrix::from_diagonal(&self.factors())
    }
}
