//! Sampling geometry of a (possibly time-resolved) image.
//!
//! # Coordinate Systems
//! * **Index Space**: continuous voxel coordinates, `(0, 0, 0)` is the
//!   center of the first voxel.
//! * **World Space**: physical coordinates, related to index space by
//!   `world = origin + Direction * (index ⊙ spacing)`.

use std::ops::Range;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::spatial::{Direction, Point, Spacing, Vector};
use crate::tensor::float_tensor;

/// Extent and physical placement of an image grid.
///
/// `extent[0]` is the number of voxels along x (the fastest varying axis),
/// `extent[1]` along y, and so on. `frames` counts time points; a static
/// volume has one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    extent: [usize; D],
    frames: usize,
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
}

impl<const D: usize> ImageGeometry<D> {
    /// Create a single-frame geometry.
    pub fn new(extent: [usize; D], origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            extent,
            frames: 1,
            origin,
            spacing,
            direction,
        }
    }

    /// Unit spacing, zero origin, identity direction.
    pub fn with_unit_spacing(extent: [usize; D]) -> Self {
        Self::new(extent, Point::origin(), Spacing::uniform(1.0), Direction::identity())
    }

    /// Set the number of time frames.
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Voxel counts along each spatial axis.
    pub fn extent(&self) -> [usize; D] {
        self.extent
    }

    /// Number of time frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// World position of index `(0, 0, ...)`.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Physical distance between voxel centers along each axis.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Orientation of the image axes.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Number of voxels in one frame.
    pub fn voxel_count(&self) -> usize {
        self.extent.iter().product()
    }

    /// Convert a continuous index to a world point.
    pub fn index_to_world(&self, index: &Point<D>) -> Point<D> {
        let mut scaled = Vector::<D>::zeros();
        for i in 0..D {
            scaled[i] = index[i] * self.spacing[i];
        }
        self.origin + self.direction * scaled
    }

    /// Convert a world point to a continuous index.
    ///
    /// Returns `None` when the direction matrix is singular.
    pub fn world_to_index(&self, point: &Point<D>) -> Option<Point<D>> {
        let inv_dir = self.direction.try_inverse()?;
        let rotated = inv_dir * (*point - self.origin);
        let mut index = Point::<D>::origin();
        for i in 0..D {
            index[i] = rotated[i] / self.spacing[i];
        }
        Some(index)
    }

    /// Batch conversion of continuous indices `[N, D]` to world points `[N, D]`.
    ///
    /// Uses the row-vector form `P = O + I @ M` with `M_rc = S_r * D_cr`.
    pub fn index_to_world_tensor<B: Backend>(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();
        let origin = float_tensor::<B, 2>(self.origin.to_array().to_vec(), [1, D], &device);

        let mut m_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                m_data.push(self.spacing[r] * self.direction[(c, r)]);
            }
        }
        let m_tensor = float_tensor::<B, 2>(m_data, [D, D], &device);

        indices.matmul(m_tensor) + origin
    }

    /// Whether `[start, end)` spatial bounds and `frames` select the whole image.
    pub fn is_full_region(&self, start: [usize; D], end: [usize; D], frames: &Range<usize>) -> bool {
        start.iter().all(|&s| s == 0)
            && end == self.extent
            && frames.start == 0
            && frames.end == self.frames
    }

    /// Geometry of the sub-box `[start, end)` and the frame range `frames`.
    ///
    /// The cropped image keeps spacing and direction; its origin moves to
    /// the world position of `start`. Returns `None` when a bound is
    /// reversed or lies outside the image.
    pub fn region(&self, start: [usize; D], end: [usize; D], frames: Range<usize>) -> Option<Self> {
        for i in 0..D {
            if start[i] > end[i] || end[i] > self.extent[i] {
                return None;
            }
        }
        if frames.start > frames.end || frames.end > self.frames {
            return None;
        }

        let start_point = Point::new(start.map(|s| s as f64));
        Some(Self {
            extent: std::array::from_fn(|i| end[i] - start[i]),
            frames: frames.end - frames.start,
            origin: self.index_to_world(&start_point),
            spacing: self.spacing,
            direction: self.direction,
        })
    }
}
