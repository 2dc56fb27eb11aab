//! Output grid planning.
//!
//! The output grid has `floor(extent / stride)` cells along each spatial
//! axis; cell `(x, y, z)` covers source voxels `[x·s, x·s + s)` and so on.
//! Frames pass through unchanged.

use defgrad_core::image::ImageGeometry;
use defgrad_core::spatial::Point;

use crate::config::RoiRequest;
use crate::error::{FieldError, Result};
use crate::roi::Roi;

/// Output grid derived from a (possibly cropped) source image and a stride.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGrid {
    source: ImageGeometry<3>,
    stride: usize,
    geometry: ImageGeometry<3>,
}

impl OutputGrid {
    /// Plan the output grid for `source` restricted to `roi`.
    ///
    /// A non-positive stride fails before anything else is looked at. A stride
    /// larger than an axis yields zero cells along it.
    pub fn plan(source: &ImageGeometry<3>, roi: &RoiRequest, stride: i64) -> Result<Self> {
        if stride <= 0 {
            return Err(FieldError::invalid_parameter(format!("stride must be positive, got {stride}")));
        }
        let stride = usize::try_from(stride)
            .map_err(|_| FieldError::invalid_parameter(format!("stride {stride} is too large")))?;

        let source = Roi::resolve(roi, source)?.crop(source)?;
        let extent = source.extent();
        let dims = extent.map(|n| n / stride);

        // First cell's sub-grid center, in source indices.
        let half = (stride as f64 - 1.0) / 2.0;
        let origin = source.index_to_world(&Point::new([half; 3]));

        let geometry = ImageGeometry::new(dims, origin, source.spacing().coarsened(stride), *source.direction())
            .with_frames(source.frames());

        tracing::debug!(?extent, ?dims, stride, frames = source.frames(), "Planned output grid");
        Ok(Self { source, stride, geometry })
    }

    /// The source geometry samples are taken from (already cropped).
    pub fn source(&self) -> &ImageGeometry<3> {
        &self.source
    }

    /// Placement of the output volumes.
    pub fn geometry(&self) -> &ImageGeometry<3> {
        &self.geometry
    }

    /// Sub-sampling factor per axis.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of cells `(xMax, yMax, zMax)`.
    pub fn dims(&self) -> [usize; 3] {
        self.geometry.extent()
    }

    /// Number of frames `tMax`.
    pub fn frames(&self) -> usize {
        self.geometry.frames()
    }

    /// Samples averaged per cell, `stride³`.
    pub fn sub_samples(&self) -> usize {
        self.stride * self.stride * self.stride
    }

    /// Cells in one frame.
    pub fn cell_count(&self) -> usize {
        self.geometry.voxel_count()
    }

    /// Whether the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0 || self.frames() == 0
    }

    /// The cell nearest the volume center, `floor(dims / 2)`.
    pub fn probe_cell(&self) -> Option<[usize; 3]> {
        if self.cell_count() == 0 {
            return None;
        }
        Some(self.dims().map(|n| n / 2))
    }

    /// Source index of sub-offset `(i, j, k)` in cell `(x, y, z)`.
    pub fn sample_index(&self, cell: [usize; 3], sub_offset: [usize; 3]) -> [usize; 3] {
        std::array::from_fn(|axis| cell[axis] * self.stride + sub_offset[axis])
    }
}
