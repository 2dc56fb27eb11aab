//! Dense deformation gradient tensor fields.
//!
//! Given a source image geometry and a spatial transform, every output cell
//! gets the mean of `stride³` central-difference estimates of the
//! transform's Jacobian, optionally inverted per sample, and the nine tensor
//! components are written as separate volumes.
//!
//! ```no_run
//! use burn_ndarray::NdArray;
//! use defgrad_field::{FieldConfig, FieldEstimator, FieldWriter, ProgressTracker};
//!
//! # fn main() -> anyhow::Result<()> {
//! let device = Default::default();
//! let source = defgrad_io::read_nifti_geometry("image.nii.gz")?;
//! let transform = defgrad_io::read_transform::<NdArray<f64>, _>("dof.json", &device)?;
//!
//! let config = FieldConfig::new().with_stride(2);
//! let run = FieldEstimator::new(&transform, device, config)
//!     .with_progress(ProgressTracker::console())
//!     .estimate(&source)?;
//! FieldWriter::nifti("nii.gz").write(&run.field, "out/subject".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod error;
pub mod estimator;
pub mod field;
pub mod grid;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod roi;
pub mod writer;

pub use cancel::CancellationToken;
pub use config::{FieldConfig, ProbeSample, RoiRequest};
pub use error::{FieldError, Result};
pub use field::{Component, TensorField};
pub use grid::OutputGrid;
pub use pipeline::{FieldEstimator, FieldRun};
pub use probe::ProbeReport;
pub use progress::{ConsoleProgressCallback, HistoryCallback, ProgressCallback, ProgressInfo, ProgressTracker};
pub use writer::{FieldWriter, NiftiVolumeSink, VolumeSink};
