//! Spatial types, image geometry and spatial transforms.
//!
//! World coordinates are `f64` on the CPU; batches of points travel through
//! `burn` tensors of shape `[N, D]`.

pub mod image;
pub mod spatial;
pub mod tensor;
pub mod transform;

pub use image::ImageGeometry;
pub use spatial::{Direction, Point, Spacing, Vector};
pub use transform::{Transform, TransformDescriptor, TransformKind};
