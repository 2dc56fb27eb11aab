//! Tensor aggregation over the sub-samples of one cell.

use nalgebra::Matrix3;

use crate::error::{FieldError, Result};

/// Determinants below this magnitude are treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Invert a sample tensor, failing for singular or non-finite input.
pub fn invert_tensor(tensor: &Matrix3<f64>, cell: [usize; 3], sub_offset: [usize; 3]) -> Result<Matrix3<f64>> {
    let determinant = tensor.determinant();
    if !determinant.is_finite() || determinant.abs() < SINGULAR_DETERMINANT {
        return Err(FieldError::SingularTensor { cell, sub_offset, determinant });
    }
    tensor
        .try_inverse()
        .ok_or(FieldError::SingularTensor { cell, sub_offset, determinant })
}

/// Accumulates the sub-sample tensors of one cell.
///
/// Keeps the running sum of the (optionally inverted) tensors that make up
/// the cell value, plus the raw, never-inverted samples the diagnostic probe
/// reports.
#[derive(Debug, Clone)]
pub struct TensorAccumulator {
    cell: [usize; 3],
    invert: bool,
    sum: Matrix3<f64>,
    raw_sum: Matrix3<f64>,
    last_raw: Option<Matrix3<f64>>,
}

impl TensorAccumulator {
    /// Start accumulating for `cell`.
    pub fn new(cell: [usize; 3], invert: bool) -> Self {
        Self {
            cell,
            invert,
            sum: Matrix3::zeros(),
            raw_sum: Matrix3::zeros(),
            last_raw: None,
        }
    }

    /// Add the sample taken at `sub_offset`.
    pub fn push(&mut self, sample: Matrix3<f64>, sub_offset: [usize; 3]) -> Result<()> {
        let contribution = if self.invert {
            invert_tensor(&sample, self.cell, sub_offset)?
        } else {
            sample
        };
        self.sum += contribution;
        self.raw_sum += sample;
        self.last_raw = Some(sample);
        Ok(())
    }

    /// Component-wise mean over `sub_samples` pushed samples.
    pub fn finish(self, sub_samples: usize) -> CellTensor {
        let divisor = sub_samples.max(1) as f64;
        CellTensor {
            value: self.sum / divisor,
            raw_mean: self.raw_sum / divisor,
            last_raw: self.last_raw.unwrap_or_else(Matrix3::zeros),
        }
    }
}

/// Final tensor of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTensor {
    /// Mean of the (optionally inverted) samples; this is the field value.
    pub value: Matrix3<f64>,
    /// Mean of the samples before inversion.
    pub raw_mean: Matrix3<f64>,
    /// The last sample pushed, before inversion.
    pub last_raw: Matrix3<f64>,
}
