//! Diagnostic probe: finite-difference tensor against the analytic Jacobian.

use std::fmt;

use burn::tensor::backend::Backend;
use defgrad_core::spatial::Point;
use defgrad_core::transform::Transform;
use nalgebra::Matrix3;

use crate::aggregate::CellTensor;
use crate::config::ProbeSample;
use crate::grid::OutputGrid;

/// Side-by-side comparison at the probe cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Output cell `(x, y, z)`.
    pub cell: [usize; 3],
    /// Which sample was compared.
    pub sample: ProbeSample,
    /// Source index the analytic Jacobian was evaluated at.
    pub index: Point<3>,
    /// World position of `index`.
    pub world: Point<3>,
    /// Tensor estimated by central differences.
    pub finite_difference: Matrix3<f64>,
    /// The transform's own Jacobian.
    pub analytic: Matrix3<f64>,
}

impl ProbeReport {
    /// Build the report for `cell` from its aggregated tensor.
    pub fn compute<B, T>(
        transform: &T,
        grid: &OutputGrid,
        cell: [usize; 3],
        tensor: &CellTensor,
        sample: ProbeSample,
        device: &B::Device,
    ) -> Self
    where
        B: Backend,
        T: Transform<B, 3>,
    {
        let stride = grid.stride();
        let (index, finite_difference) = match sample {
            ProbeSample::LastSubSample => {
                let last = grid.sample_index(cell, [stride - 1; 3]);
                (Point::new(last.map(|v| v as f64)), tensor.last_raw)
            }
            ProbeSample::CellMean => {
                let half = (stride as f64 - 1.0) / 2.0;
                let first = grid.sample_index(cell, [0; 3]);
                (Point::new(first.map(|v| v as f64 + half)), tensor.raw_mean)
            }
        };
        let world = grid.source().index_to_world(&index);
        let analytic = transform.jacobian(&world, device);

        Self { cell, sample, index, world, finite_difference, analytic }
    }

    /// Largest absolute entry of `finite_difference - analytic`.
    pub fn max_abs_difference(&self) -> f64 {
        (self.finite_difference - self.analytic).abs().max()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.cell;
        writeln!(f, "F at image centre ({x},{y},{z}):")?;
        writeln!(f, "  from finite differences ({:?})", self.sample)?;
        write!(f, "{:.6}", self.finite_difference)?;
        writeln!(f, "  from analytic Jacobian at {}", self.world)?;
        write!(f, "{:.6}", self.analytic)
    }
}
