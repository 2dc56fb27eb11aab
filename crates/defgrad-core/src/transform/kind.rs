//! Closed set of 3D transform families.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::Matrix3;

use crate::spatial::Point;
use super::{
    AffineTransform, BSplineTransform, ChainedTransform, RigidTransform, ScaleTransform,
    Transform, TranslationTransform, VersorRigid3DTransform,
};

/// A 3D transform of any supported family, held by value.
#[derive(Debug, Clone)]
pub enum TransformKind<B: Backend> {
    Translation(TranslationTransform<B, 3>),
    Scale(ScaleTransform<B, 3>),
    Affine(AffineTransform<B, 3>),
    Rigid(RigidTransform<B>),
    Versor(VersorRigid3DTransform<B>),
    BSpline(BSplineTransform<B>),
    Chained(Box<ChainedTransform<B, TransformKind<B>, TransformKind<B>, 3>>),
}

impl<B: Backend> TransformKind<B> {
    /// Compose `self` followed by `next`.
    pub fn then(self, next: TransformKind<B>) -> Self {
        Self::Chained(Box::new(ChainedTransform::new(self, next)))
    }

    /// Family name, as written in transform descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translation(_) => "translation",
            Self::Scale(_) => "scale",
            Self::Affine(_) => "affine",
            Self::Rigid(_) => "rigid",
            Self::Versor(_) => "versor",
            Self::BSpline(_) => "bspline",
            Self::Chained(_) => "chain",
        }
    }
}

impl<B: Backend> Transform<B, 3> for TransformKind<B> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Self::Translation(t) => t.transform_points(points),
            Self::Scale(t) => t.transform_points(points),
            Self::Affine(t) => t.transform_points(points),
            Self::Rigid(t) => t.transform_points(points),
            Self::Versor(t) => t.transform_points(points),
            Self::BSpline(t) => t.transform_points(points),
            Self::Chained(t) => t.transform_points(points),
        }
    }

    fn jacobian(&self, point: &Point<3>, device: &B::Device) -> Matrix3<f64> {
        match self {
            Self::Translation(t) => t.jacobian(point, device),
            Self::Scale(t) => t.jacobian(point, device),
            Self::Affine(t) => t.jacobian(point, device),
            Self::Rigid(t) => t.jacobian(point, device),
            Self::Versor(t) => t.jacobian(point, device),
            Self::BSpline(t) => t.jacobian(point, device),
            Self::Chained(t) => t.jacobian(point, device),
        }
    }
}
