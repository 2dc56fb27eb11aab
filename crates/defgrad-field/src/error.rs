//! Error types for deformation gradient estimation.
//!
//! Sampling errors name the output cell `(x, y, z)` and the sub-offset
//! `(i, j, k)` inside it, so a failed run can be traced back to the exact
//! sample that caused it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for field estimation and persistence.
#[derive(Error, Debug)]
pub enum FieldError {
    /// A configuration value is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The world-space step between the two samples along an axis was zero or non-finite.
    #[error("Degenerate sampling at cell {cell:?}, sub-offset {sub_offset:?}: world step along axis {axis} is {step}")]
    DegenerateSampling {
        cell: [usize; 3],
        sub_offset: [usize; 3],
        axis: usize,
        step: f64,
    },

    /// Inversion was requested for a non-invertible sample tensor.
    #[error("Singular tensor at cell {cell:?}, sub-offset {sub_offset:?} (determinant {determinant:e})")]
    SingularTensor {
        cell: [usize; 3],
        sub_offset: [usize; 3],
        determinant: f64,
    },

    /// A component volume could not be written.
    #[error("Failed to write component {component} to {}: {reason}", .path.display())]
    Persistence {
        component: String,
        path: PathBuf,
        reason: String,
    },

    /// The run was cancelled before the cell was evaluated.
    #[error("Cancelled at cell {cell:?}")]
    Cancelled { cell: [usize; 3] },

    /// Transformed samples could not be read back from the tensor backend.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }

    /// Create a persistence error for one component.
    pub fn persistence(component: impl Into<String>, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Persistence {
            component: component.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FieldError::invalid_parameter("stride must be positive");
        assert!(matches!(err, FieldError::InvalidParameter(_)));
    }

    #[test]
    fn test_error_display() {
        let err = FieldError::invalid_parameter("stride must be positive, got 0");
        assert_eq!(err.to_string(), "Invalid parameter: stride must be positive, got 0");

        let err = FieldError::persistence("f12", "/tmp/out_f12.nii", "disk full");
        assert_eq!(err.to_string(), "Failed to write component f12 to /tmp/out_f12.nii: disk full");
    }

    #[test]
    fn test_sampling_errors_name_the_cell() {
        let err = FieldError::DegenerateSampling {
            cell: [1, 2, 3],
            sub_offset: [0, 1, 0],
            axis: 2,
            step: 0.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("[1, 2, 3]"));
        assert!(msg.contains("[0, 1, 0]"));
        assert!(msg.contains("axis 2"));
    }
}
