//! Region of interest resolution and cropping.

use std::ops::Range;

use defgrad_core::image::ImageGeometry;

use crate::config::RoiRequest;
use crate::error::{FieldError, Result};

const AXIS_NAMES: [&str; 4] = ["x", "y", "z", "t"];

/// A region of interest checked against a concrete image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roi {
    pub start: [usize; 3],
    pub end: [usize; 3],
    pub frames: Range<usize>,
}

impl Roi {
    /// Resolve `request` against `source`, filling unset bounds with the full extent.
    pub fn resolve(request: &RoiRequest, source: &ImageGeometry<3>) -> Result<Self> {
        let extent = source.extent();
        let limits = [extent[0], extent[1], extent[2], source.frames()];

        let mut bounds = [(0usize, 0usize); 4];
        for axis in 0..4 {
            let limit = limits[axis] as i64;
            let start = request.start[axis].unwrap_or(0);
            let end = request.end[axis].unwrap_or(limit);
            if start < 0 || end < start || end > limit {
                return Err(FieldError::invalid_parameter(format!(
                    "region of interest along {} is [{}, {}), image has {} samples",
                    AXIS_NAMES[axis], start, end, limit
                )));
            }
            bounds[axis] = (start as usize, end as usize);
        }

        Ok(Self {
            start: [bounds[0].0, bounds[1].0, bounds[2].0],
            end: [bounds[0].1, bounds[1].1, bounds[2].1],
            frames: bounds[3].0..bounds[3].1,
        })
    }

    /// Whether this region covers the whole of `source`.
    pub fn is_full(&self, source: &ImageGeometry<3>) -> bool {
        source.is_full_region(self.start, self.end, &self.frames)
    }

    /// The geometry the pipeline works on: `source` itself for a full region,
    /// otherwise the cropped sub-image.
    pub fn crop(&self, source: &ImageGeometry<3>) -> Result<ImageGeometry<3>> {
        if self.is_full(source) {
            return Ok(source.clone());
        }
        tracing::debug!(start = ?self.start, end = ?self.end, frames = ?self.frames, "Cropping source image");
        source
            .region(self.start, self.end, self.frames.clone())
            .ok_or_else(|| FieldError::invalid_parameter("region of interest lies outside the image"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defgrad_core::spatial::{Direction, Point, Spacing};

    fn source() -> ImageGeometry<3> {
        ImageGeometry::new([10, 8, 6], Point::new([1.0, 2.0, 3.0]), Spacing::new([2.0, 1.0, 0.5]), Direction::identity())
            .with_frames(4)
    }

    #[test]
    fn test_unset_request_is_full() {
        let roi = Roi::resolve(&RoiRequest::full(), &source()).unwrap();
        assert_eq!(roi.start, [0, 0, 0]);
        assert_eq!(roi.end, [10, 8, 6]);
        assert_eq!(roi.frames, 0..4);
        assert!(roi.is_full(&source()));
        assert_eq!(roi.crop(&source()).unwrap(), source());
    }

    #[test]
    fn test_explicit_full_request_is_full() {
        let request = RoiRequest::full()
            .with_axis(0, 0, 10)
            .with_axis(1, 0, 8)
            .with_axis(2, 0, 6)
            .with_axis(3, 0, 4);
        let roi = Roi::resolve(&request, &source()).unwrap();
        assert!(roi.is_full(&source()));
    }

    #[test]
    fn test_partial_request_crops() {
        let request = RoiRequest::full().with_axis(0, 2, 6).with_axis(3, 1, 2);
        let roi = Roi::resolve(&request, &source()).unwrap();
        let cropped = roi.crop(&source()).unwrap();
        assert_eq!(cropped.extent(), [4, 8, 6]);
        assert_eq!(cropped.frames(), 1);
        assert_eq!(cropped.origin(), &Point::new([5.0, 2.0, 3.0]));
    }

    #[test]
    fn test_invalid_bounds() {
        let cases = [
            RoiRequest::full().with_axis(0, -1, 4),
            RoiRequest::full().with_axis(1, 5, 4),
            RoiRequest::full().with_axis(2, 0, 7),
            RoiRequest::full().with_axis(3, 0, 5),
        ];
        for request in cases {
            let err = Roi::resolve(&request, &source()).unwrap_err();
            assert!(matches!(err, FieldError::InvalidParameter(_)), "{request:?}");
        }
    }
}
