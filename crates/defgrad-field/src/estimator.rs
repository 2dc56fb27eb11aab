//! Local tensor estimation by central differences.
//!
//! For every sub-offset `(i, j, k)` of a cell the base sample is
//! `p0 = cell · stride + (i, j, k)` in source indices. Along each axis the two
//! points `p0 ± 0.5` are mapped to world space and through the transform; the
//! tensor column for that axis is the transformed difference divided by the
//! world-space step along the same axis.
//!
//! All points of one output z-slice are evaluated in a single batched
//! transform call. Within the batch, point `((cell · s³ + sub) · 3 + axis) · 2 + side`
//! holds side `0` (`+0.5`) or `1` (`-0.5`), with cells ordered x fastest and
//! sub-offsets ordered `i` fastest, then `j`, then `k`.
//!
//! Host-side values are `f64`. World steps are taken on the CPU from
//! [`ImageGeometry::index_to_world`](defgrad_core::image::ImageGeometry::index_to_world),
//! so their precision does not depend on the backend's float element.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use defgrad_core::spatial::Point;
use defgrad_core::tensor::float_tensor;
use defgrad_core::transform::Transform;
use nalgebra::Matrix3;

use crate::aggregate::{CellTensor, TensorAccumulator};
use crate::error::{FieldError, Result};
use crate::grid::OutputGrid;

const HALF_STEP: f64 = 0.5;

/// World steps and transformed positions of every sample in one slab.
#[derive(Debug, Clone)]
pub struct SlabSamples {
    z: usize,
    row_cells: usize,
    cells: usize,
    stride: usize,
    /// Same-axis world step of each `(cell, sub, axis)` pair.
    steps: Vec<f64>,
    moved: Vec<f64>,
}

/// Evaluate the transform at every sample point of output slice `z`.
pub fn sample_slab<B, T>(transform: &T, grid: &OutputGrid, z: usize, device: &B::Device) -> Result<SlabSamples>
where
    B: Backend,
    T: Transform<B, 3>,
{
    let [nx, ny, _] = grid.dims();
    let stride = grid.stride();
    let source = grid.source();
    let cells = nx * ny;
    let points = cells * grid.sub_samples() * 6;

    let mut indices = Vec::with_capacity(points * 3);
    let mut steps = Vec::with_capacity(points / 2);
    for y in 0..ny {
        for x in 0..nx {
            for k in 0..stride {
                for j in 0..stride {
                    for i in 0..stride {
                        let p0 = Point::from_index(grid.sample_index([x, y, z], [i, j, k]));
                        for axis in 0..3 {
                            let plus = p0.offset_along(axis, HALF_STEP);
                            let minus = p0.offset_along(axis, -HALF_STEP);
                            steps.push(source.index_to_world(&plus)[axis] - source.index_to_world(&minus)[axis]);
                            indices.extend_from_slice(&plus.to_array());
                            indices.extend_from_slice(&minus.to_array());
                        }
                    }
                }
            }
        }
    }

    let indices = float_tensor::<B, 2>(indices, [points, 3], device);
    let moved = transform.transform_points(source.index_to_world_tensor(indices));

    tracing::debug!(z, cells, points, "Evaluated slab");
    Ok(SlabSamples {
        z,
        row_cells: nx,
        cells,
        stride,
        steps,
        moved: read_points(moved, points)?,
    })
}

fn read_points<B: Backend>(tensor: Tensor<B, 2>, expected: usize) -> Result<Vec<f64>> {
    let dims = tensor.dims();
    if dims != [expected, 3] {
        return Err(FieldError::tensor_data(format!(
            "expected {expected} points of dimension 3, got shape {dims:?}"
        )));
    }
    tensor
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|e| FieldError::tensor_data(format!("{e:?}")))
}

impl SlabSamples {
    /// Number of cells in the slab.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Output cell `(x, y, z)` of the slab-local cell index.
    pub fn cell_coords(&self, cell: usize) -> [usize; 3] {
        [cell % self.row_cells, cell / self.row_cells, self.z]
    }

    /// Sub-offset `(i, j, k)` of a sub-sample index.
    pub fn sub_offset(&self, sub: usize) -> [usize; 3] {
        let s = self.stride;
        [sub % s, (sub / s) % s, sub / (s * s)]
    }

    fn sub_samples(&self) -> usize {
        self.stride * self.stride * self.stride
    }

    fn point(&self, cell: usize, sub: usize, axis: usize, side: usize) -> usize {
        ((cell * self.sub_samples() + sub) * 3 + axis) * 2 + side
    }

    /// Finite-difference tensor of one sub-sample.
    pub fn local_tensor(&self, cell: usize, sub: usize) -> Result<Matrix3<f64>> {
        let mut tensor = Matrix3::zeros();
        for axis in 0..3 {
            let plus = self.point(cell, sub, axis, 0) * 3;
            let minus = self.point(cell, sub, axis, 1) * 3;

            let step = self.steps[(cell * self.sub_samples() + sub) * 3 + axis];
            if step == 0.0 || !step.is_finite() {
                return Err(FieldError::DegenerateSampling {
                    cell: self.cell_coords(cell),
                    sub_offset: self.sub_offset(sub),
                    axis,
                    step,
                });
            }

            for row in 0..3 {
                let moved = self.moved[plus + row] - self.moved[minus + row];
                tensor[(row, axis)] = moved / step;
            }
        }
        Ok(tensor)
    }

    /// Aggregate all sub-samples of one cell.
    pub fn estimate_cell(&self, cell: usize, invert: bool) -> Result<CellTensor> {
        let mut accumulator = TensorAccumulator::new(self.cell_coords(cell), invert);
        for sub in 0..self.sub_samples() {
            accumulator.push(self.local_tensor(cell, sub)?, self.sub_offset(sub))?;
        }
        Ok(accumulator.finish(self.sub_samples()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use defgrad_core::image::ImageGeometry;
    use defgrad_core::spatial::{Direction, Point, Spacing, Vector};
    use defgrad_core::transform::{AffineTransform, ScaleTransform, TranslationTransform};

    use crate::config::RoiRequest;

    type TestBackend = NdArray<f32>;

    fn grid(geometry: &ImageGeometry<3>, stride: i64) -> OutputGrid {
        OutputGrid::plan(geometry, &RoiRequest::full(), stride).unwrap()
    }

    #[test]
    fn test_slab_layout() {
        let device = Default::default();
        let geometry = ImageGeometry::with_unit_spacing([4, 4, 4]);
        let grid = grid(&geometry, 2);
        let identity = TranslationTransform::<TestBackend, 3>::new(Tensor::zeros([3], &device));

        let samples = sample_slab(&identity, &grid, 1, &device).unwrap();
        assert_eq!(samples.cells(), 4);
        assert_eq!(samples.cell_coords(3), [1, 1, 1]);
        assert_eq!(samples.sub_offset(5), [1, 0, 1]);

        // Cell 3, sub-offset (1, 0, 1), axis y, side -0.5: p0 = (3, 2, 3)
        let p = samples.point(3, 5, 1, 1) * 3;
        assert_eq!(&samples.moved[p..p + 3], &[3.0, 1.5, 3.0]);
        assert_eq!(samples.steps.len(), 4 * 8 * 3);
        assert!(samples.steps.iter().all(|&step| step == 1.0));
    }

    #[test]
    fn test_local_tensor_of_affine() {
        let device = Default::default();
        let geometry = ImageGeometry::new(
            [3, 3, 3],
            Point::new([-1.0, 4.0, 0.5]),
            Spacing::new([0.5, 2.0, 1.0]),
            Direction::identity(),
        );
        let grid = grid(&geometry, 1);
        let matrix = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.5, 0.0], [0.0, 2.0, 0.0], [0.25, 0.0, 1.0]], &device);
        let affine = AffineTransform::<TestBackend, 3>::new(matrix, Tensor::zeros([3], &device), Tensor::zeros([3], &device));

        let samples = sample_slab(&affine, &grid, 2, &device).unwrap();
        let tensor = samples.local_tensor(4, 0).unwrap();
        let expected = Matrix3::new(1.0, 0.5, 0.0, 0.0, 2.0, 0.0, 0.25, 0.0, 1.0);
        assert!((tensor - expected).abs().max() < 1e-5, "{tensor}");
    }

    #[test]
    fn test_far_origin_and_fine_spacing_keep_precision() {
        let device = Default::default();
        let geometry = ImageGeometry::new(
            [6, 6, 6],
            Point::new([1.0e6, 1.0e6, 1.0e6]),
            Spacing::uniform(0.01),
            Direction::identity(),
        );
        let grid = grid(&geometry, 1);
        let scale = ScaleTransform::<NdArray<f64>, 3>::isotropic(1.5, &device);

        for z in 0..6 {
            let samples = sample_slab(&scale, &grid, z, &device).unwrap();
            for cell in 0..samples.cells() {
                let tensor = samples.estimate_cell(cell, false).unwrap().value;
                assert!((tensor - Matrix3::identity() * 1.5).abs().max() < 1e-6, "{tensor}");
            }
        }
    }

    #[test]
    fn test_world_step_does_not_depend_on_backend_precision() {
        let device = Default::default();
        let geometry = ImageGeometry::new(
            [2, 2, 2],
            Point::new([1.0e6, -1.0e6, 0.0]),
            Spacing::uniform(0.01),
            Direction::identity(),
        );
        let grid = grid(&geometry, 1);
        let identity = TranslationTransform::<TestBackend, 3>::new(Tensor::zeros([3], &device));

        // f32 cannot resolve 0.01 at 1e6, but the step is taken on the host.
        let samples = sample_slab(&identity, &grid, 0, &device).unwrap();
        assert!(samples.steps.iter().all(|&step| (step - 0.01).abs() < 1e-9));
    }

    #[test]
    fn test_axis_without_world_step_is_degenerate() {
        let device = Default::default();
        // Image x runs along world y, so the world x step along image x is zero.
        let direction = Direction::from_columns([
            Vector::new([0.0, 1.0, 0.0]),
            Vector::new([1.0, 0.0, 0.0]),
            Vector::new([0.0, 0.0, 1.0]),
        ]);
        let geometry = ImageGeometry::new([2, 2, 2], Point::origin(), Spacing::uniform(1.0), direction);
        let grid = grid(&geometry, 1);
        let identity = TranslationTransform::<TestBackend, 3>::new(Tensor::zeros([3], &device));

        let samples = sample_slab(&identity, &grid, 0, &device).unwrap();
        let err = samples.estimate_cell(1, false).unwrap_err();
        match err {
            FieldError::DegenerateSampling { cell, sub_offset, axis, step } => {
                assert_eq!(cell, [1, 0, 0]);
                assert_eq!(sub_offset, [0, 0, 0]);
                assert_eq!(axis, 0);
                assert_eq!(step, 0.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
