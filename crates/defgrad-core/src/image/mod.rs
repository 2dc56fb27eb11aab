//! Image geometry.
//!
//! The deformation gradient pipeline never reads intensities, so an image is
//! represented by its sampling geometry alone: extent, frame count, origin,
//! spacing and direction.

pub mod geometry;

pub use geometry::ImageGeometry;
