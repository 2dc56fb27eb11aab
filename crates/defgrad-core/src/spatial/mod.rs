//! Spatial types for points, vectors, spacing, and direction matrices.
//!
//! All types are thin wrappers over nalgebra's statically sized types and
//! use `f64` throughout; tensors handed to a backend are converted at the
//! boundary.

pub mod point;
pub mod vector;
pub mod spacing;
pub mod direction;

pub use point::Point;
pub use vector::Vector;
pub use spacing::Spacing;
pub use direction::Direction;

pub type Point3 = Point<3>;
pub type Vector3 = Vector<3>;
pub type Spacing3 = Spacing<3>;
pub type Direction3 = Direction<3>;
