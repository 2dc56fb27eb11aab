//! Composition of two transforms.
//!
//! `T(x) = T2(T1(x))`; by the chain rule its Jacobian is `J2(T1(x)) · J1(x)`.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use crate::spatial::Point;
use super::trait_::Transform;

/// `second` applied to the output of `first`.
#[derive(Debug, Clone)]
pub struct ChainedTransform<B: Backend, T1, T2, const D: usize> {
    pub first: T1,
    pub second: T2,
    backend: PhantomData<B>,
}

impl<B: Backend, T1, T2, const D: usize> ChainedTransform<B, T1, T2, D> {
    pub fn new(first: T1, second: T2) -> Self {
        Self { first, second, backend: PhantomData }
    }
}

impl<B: Backend, T1, T2, const D: usize> Transform<B, D> for ChainedTransform<B, T1, T2, D>
where
    T1: Transform<B, D>,
    T2: Transform<B, D>,
{
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        self.second.transform_points(self.first.transform_points(points))
    }

    fn jacobian(&self, point: &Point<D>, device: &B::Device) -> SMatrix<f64, D, D> {
        let inner = self.first.jacobian(point, device);
        let intermediate = self.first.transform_point(point, device);
        self.second.jacobian(&intermediate, device) * inner
    }
}
