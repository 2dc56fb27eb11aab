//! File formats for deformation gradient estimation: NIfTI image geometry and
//! scalar volumes, and JSON transform descriptors.

pub mod nifti_io;
pub mod transform_io;

pub use nifti_io::{read_nifti_geometry, read_volume, write_volume, ScalarVolume};
pub use transform_io::{read_transform, read_transform_descriptor, write_transform_descriptor};
