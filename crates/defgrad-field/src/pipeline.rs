//! Field estimation pipeline.

use burn::tensor::backend::Backend;
use defgrad_core::image::ImageGeometry;
use defgrad_core::transform::Transform;
use rayon::prelude::*;
use std::marker::PhantomData;

use crate::aggregate::CellTensor;
use crate::cancel::CancellationToken;
use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::estimator::sample_slab;
use crate::field::TensorField;
use crate::grid::OutputGrid;
use crate::probe::ProbeReport;
use crate::progress::ProgressTracker;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct FieldRun {
    /// The averaged (and optionally inverted) tensor field.
    pub field: TensorField,
    /// Probe comparison, absent for an empty grid.
    pub probe: Option<ProbeReport>,
}

/// Estimates the deformation gradient field of a transform over an image grid.
pub struct FieldEstimator<'a, B, T>
where
    B: Backend,
    T: Transform<B, 3>,
{
    transform: &'a T,
    device: B::Device,
    config: FieldConfig,
    progress: ProgressTracker,
    cancellation: CancellationToken,
    _phantom: PhantomData<B>,
}

impl<'a, B, T> FieldEstimator<'a, B, T>
where
    B: Backend,
    T: Transform<B, 3>,
{
    pub fn new(transform: &'a T, device: B::Device, config: FieldConfig) -> Self {
        Self {
            transform,
            device,
            config,
            progress: ProgressTracker::new(),
            cancellation: CancellationToken::new(),
            _phantom: PhantomData,
        }
    }

    /// Report per-slice progress to `progress`.
    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    /// Stop at the next cell once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Compute the field over `source`.
    pub fn estimate(&self, source: &ImageGeometry<3>) -> Result<FieldRun> {
        self.config.validate()?;
        let grid = OutputGrid::plan(source, &self.config.roi, self.config.stride)?;
        tracing::info!("Use stride = {}", grid.stride());

        let mut field = TensorField::zeros(grid.geometry().clone());
        if grid.is_empty() {
            tracing::warn!(dims = ?grid.dims(), frames = grid.frames(), "Output grid is empty");
            return Ok(FieldRun { field, probe: None });
        }

        self.progress.start();
        match self.fill(&grid, &mut field) {
            Ok(probe) => {
                field.replicate_first_frame();
                self.progress.complete();
                Ok(FieldRun { field, probe })
            }
            Err(e) => {
                self.progress.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn fill(&self, grid: &OutputGrid, field: &mut TensorField) -> Result<Option<ProbeReport>> {
        let [_, _, nz] = grid.dims();
        let probe_cell = grid.probe_cell();
        let invert = self.config.invert;
        let cancellation = &self.cancellation;
        let mut probe = None;

        for z in 0..nz {
            self.progress.update(z + 1, nz);
            let samples = sample_slab(self.transform, grid, z, &self.device)?;

            let cells: Vec<CellTensor> = (0..samples.cells())
                .into_par_iter()
                .map(|cell| {
                    if cancellation.is_cancelled() {
                        return Err(FieldError::Cancelled { cell: samples.cell_coords(cell) });
                    }
                    samples.estimate_cell(cell, invert)
                })
                .collect::<Result<_>>()?;

            for (cell, tensor) in cells.iter().enumerate() {
                let coords = samples.cell_coords(cell);
                field.set(coords, &tensor.value);

                if probe_cell == Some(coords) {
                    let report = ProbeReport::compute(
                        self.transform,
                        grid,
                        coords,
                        tensor,
                        self.config.probe,
                        &self.device,
                    );
                    tracing::info!("\n{}", report);
                    probe = Some(report);
                }
            }
        }
        Ok(probe)
    }
}
