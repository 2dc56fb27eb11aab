//! Serializable description of a 3D transform.
//!
//! Descriptors are tagged by `"type"`:
//!
//! ```json
//! { "type": "chain", "transforms": [
//!     { "type": "rigid", "rotation": [0.0, 0.0, 0.1], "translation": [1.0, 0.0, 0.0] },
//!     { "type": "scale", "factors": [2.0, 1.0, 1.0] }
//! ] }
//! ```
//!
//! Optional vectors (`translation`, `center`, `origin`) default to zero.

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tensor::float_tensor;

use super::{
    vector_tensor, AffineTransform, BSplineTransform, RigidTransform, ScaleTransform,
    TransformKind, TranslationTransform, VersorRigid3DTransform,
};

/// Errors raised while turning a descriptor into a transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("chain descriptor contains no transforms")]
    EmptyChain,

    #[error("{family} descriptor contains a non-finite value in `{field}`")]
    NonFinite { family: &'static str, field: &'static str },

    #[error("bspline grid size must be at least 2 along every axis, got {0:?}")]
    GridTooSmall([usize; 3]),

    #[error("bspline physical size must be positive along every axis, got {0:?}")]
    InvalidPhysicalSize([f64; 3]),

    #[error("bspline expects {expected} coefficients for its grid, got {actual}")]
    CoefficientCount { expected: usize, actual: usize },

    #[error("versor quaternion has zero length")]
    ZeroQuaternion,
}

/// Description of a 3D transform, as stored in transformation files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformDescriptor {
    Translation {
        offset: [f64; 3],
    },
    Scale {
        factors: [f64; 3],
        #[serde(default)]
        center: [f64; 3],
    },
    Affine {
        /// Row-major linear part.
        matrix: [[f64; 3]; 3],
        #[serde(default)]
        translation: [f64; 3],
        #[serde(default)]
        center: [f64; 3],
    },
    Rigid {
        /// Euler angles in radians about x, y and z.
        rotation: [f64; 3],
        #[serde(default)]
        translation: [f64; 3],
        #[serde(default)]
        center: [f64; 3],
    },
    Versor {
        /// Quaternion `(x, y, z, w)`; normalized on use.
        quaternion: [f64; 4],
        #[serde(default)]
        translation: [f64; 3],
        #[serde(default)]
        center: [f64; 3],
    },
    #[serde(rename = "bspline")]
    BSpline {
        grid_size: [usize; 3],
        physical_size: [f64; 3],
        #[serde(default)]
        origin: [f64; 3],
        /// One displacement per control point, x fastest.
        coefficients: Vec<[f64; 3]>,
    },
    Chain {
        transforms: Vec<TransformDescriptor>,
    },
}

fn ensure_finite(family: &'static str, field: &'static str, values: &[f64]) -> Result<(), DescriptorError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DescriptorError::NonFinite { family, field })
    }
}

impl TransformDescriptor {
    /// Build the transform this descriptor describes.
    pub fn build<B: Backend>(&self, device: &B::Device) -> Result<TransformKind<B>, DescriptorError> {
        let kind = match self {
            Self::Translation { offset } => {
                ensure_finite("translation", "offset", offset)?;
                TransformKind::Translation(TranslationTransform::new(vector_tensor(offset, device)))
            }
            Self::Scale { factors, center } => {
                ensure_finite("scale", "factors", factors)?;
                ensure_finite("scale", "center", center)?;
                TransformKind::Scale(ScaleTransform::new(
                    vector_tensor(factors, device),
                    vector_tensor(center, device),
                ))
            }
            Self::Affine { matrix, translation, center } => {
                let flat: Vec<f64> = matrix.iter().flatten().copied().collect();
                ensure_finite("affine", "matrix", &flat)?;
                ensure_finite("affine", "translation", translation)?;
                ensure_finite("affine", "center", center)?;
                let matrix = float_tensor(flat, [3, 3], device);
                TransformKind::Affine(AffineTransform::new(
                    matrix,
                    vector_tensor(translation, device),
                    vector_tensor(center, device),
                ))
            }
            Self::Rigid { rotation, translation, center } => {
                ensure_finite("rigid", "rotation", rotation)?;
                ensure_finite("rigid", "translation", translation)?;
                ensure_finite("rigid", "center", center)?;
                TransformKind::Rigid(RigidTransform::new(*rotation, *translation, *center, device))
            }
            Self::Versor { quaternion, translation, center } => {
                ensure_finite("versor", "quaternion", quaternion)?;
                ensure_finite("versor", "translation", translation)?;
                ensure_finite("versor", "center", center)?;
                if quaternion.iter().map(|q| q * q).sum::<f64>() < 1e-24 {
                    return Err(DescriptorError::ZeroQuaternion);
                }
                TransformKind::Versor(VersorRigid3DTransform::new(*quaternion, *translation, *center, device))
            }
            Self::BSpline { grid_size, physical_size, origin, coefficients } => {
                if grid_size.iter().any(|&n| n < 2) {
                    return Err(DescriptorError::GridTooSmall(*grid_size));
                }
                if physical_size.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
                    return Err(DescriptorError::InvalidPhysicalSize(*physical_size));
                }
                ensure_finite("bspline", "origin", origin)?;
                let expected: usize = grid_size.iter().product();
                if coefficients.len() != expected {
                    return Err(DescriptorError::CoefficientCount { expected, actual: coefficients.len() });
                }
                let flat: Vec<f64> = coefficients.iter().flatten().copied().collect();
                ensure_finite("bspline", "coefficients", &flat)?;
                let coefficients = float_tensor(flat, [expected, 3], device);
                TransformKind::BSpline(BSplineTransform::new(*grid_size, *physical_size, *origin, coefficients))
            }
            Self::Chain { transforms } => {
                let mut parts = transforms.iter();
                let first = parts.next().ok_or(DescriptorError::EmptyChain)?.build(device)?;
                parts.try_fold(first, |acc, next| Ok::<_, DescriptorError>(acc.then(next.build(device)?)))?
            }
        };
        Ok(kind)
    }
}
