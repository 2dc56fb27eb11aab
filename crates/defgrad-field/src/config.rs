//! Run configuration.

use crate::error::{FieldError, Result};

/// Output file extensions the default NIfTI sink understands.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["nii", "nii.gz"];

/// Which sample the diagnostic probe reports at the probe cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeSample {
    /// The last sub-offset visited at the probe cell, before inversion,
    /// against the analytic Jacobian at that sub-offset.
    #[default]
    LastSubSample,
    /// The non-inverted mean over all sub-offsets, against the analytic
    /// Jacobian at the cell's sub-grid center.
    CellMean,
}

/// Region of interest request, in source image indices.
///
/// Axes are ordered `x, y, z, t`. Starts are inclusive, ends exclusive;
/// unset bounds default to the full extent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoiRequest {
    pub start: [Option<i64>; 4],
    pub end: [Option<i64>; 4],
}

impl RoiRequest {
    /// The whole image.
    pub fn full() -> Self {
        Self::default()
    }

    /// Restrict `axis` (0 = x, 1 = y, 2 = z, 3 = t) to `[start, end)`.
    pub fn with_axis(mut self, axis: usize, start: i64, end: i64) -> Self {
        self.start[axis] = Some(start);
        self.end[axis] = Some(end);
        self
    }
}

/// Configuration of a deformation gradient run.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Sub-sampling factor per axis; each output cell covers `stride³` source voxels.
    pub stride: i64,
    /// Invert every sample tensor before averaging.
    pub invert: bool,
    /// Region of the source image to process.
    pub roi: RoiRequest,
    /// Sample reported by the diagnostic probe.
    pub probe: ProbeSample,
    /// Output file extension, without the leading dot.
    pub extension: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            stride: 1,
            invert: false,
            roi: RoiRequest::full(),
            probe: ProbeSample::LastSubSample,
            extension: "nii".to_string(),
        }
    }
}

impl FieldConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stride.
    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }

    /// Enable or disable per-sample inversion.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Set the region of interest.
    pub fn with_roi(mut self, roi: RoiRequest) -> Self {
        self.roi = roi;
        self
    }

    /// Set the probe sample.
    pub fn with_probe(mut self, probe: ProbeSample) -> Self {
        self.probe = probe;
        self
    }

    /// Set the output file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Validated stride as an unsigned factor.
    pub fn stride_factor(&self) -> Result<usize> {
        if self.stride <= 0 {
            return Err(FieldError::invalid_parameter(format!(
                "stride must be positive, got {}",
                self.stride
            )));
        }
        usize::try_from(self.stride)
            .map_err(|_| FieldError::invalid_parameter(format!("stride {} is too large", self.stride)))
    }

    /// Check every setting that does not depend on the source image.
    pub fn validate(&self) -> Result<()> {
        self.stride_factor()?;
        if !SUPPORTED_EXTENSIONS.contains(&self.extension.as_str()) {
            return Err(FieldError::invalid_parameter(format!(
                "unsupported output extension '{}', expected one of {:?}",
                self.extension, SUPPORTED_EXTENSIONS
            )));
        }
        Ok(())
    }
}
