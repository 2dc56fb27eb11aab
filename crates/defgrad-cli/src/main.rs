use anyhow::{Context, Result};
use burn_ndarray::NdArray;
use defgrad_field::{FieldEstimator, FieldWriter, ProgressTracker};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;

use args::Cli;

type Backend = NdArray<f64>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = match Cli::parse_legacy(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.field_config();
    config.validate()?;

    let device = Default::default();
    let source = defgrad_io::read_nifti_geometry(&cli.image)?;
    let transform = defgrad_io::read_transform::<Backend, _>(&cli.transformation, &device)?;
    info!(
        image = %cli.image.display(),
        extent = ?source.extent(),
        frames = source.frames(),
        transform = transform.name(),
        "Loaded inputs"
    );

    let run = FieldEstimator::new(&transform, device, config.clone())
        .with_progress(ProgressTracker::console())
        .estimate(&source)?;

    let written = FieldWriter::nifti(config.extension.as_str())
        .write(&run.field, &cli.output)
        .context("Failed to write the tensor field")?;
    info!("Wrote {} component volumes", written.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use defgrad_core::image::ImageGeometry;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    #[test]
    fn test_run_writes_nine_components() -> Result<()> {
        let dir = tempdir()?;
        let image = dir.path().join("image.nii");
        let dof = dir.path().join("dof.json");
        let geometry = ImageGeometry::with_unit_spacing([4, 4, 4]);
        defgrad_io::write_volume(&image, &geometry, &vec![0.0; 64])?;
        std::fs::write(&dof, r#"{ "type": "scale", "factors": [2.0, 1.0, 1.0] }"#)?;

        let output = dir.path().join("field");
        let cli = Cli::parse_legacy([
            OsStr::new("dof2f"),
            image.as_os_str(),
            dof.as_os_str(),
            output.as_os_str(),
            OsStr::new("-stride"),
            OsStr::new("2"),
        ])?;
        run(&cli)?;

        let f11 = defgrad_io::read_volume(dir.path().join("field_f11.nii"))?;
        assert_eq!(f11.geometry.extent(), [2, 2, 2]);
        assert!(f11.data.iter().all(|v| (v - 2.0).abs() < 1e-5));
        for suffix in ["f12", "f13", "f21", "f22", "f23", "f31", "f32", "f33"] {
            assert!(dir.path().join(format!("field_{suffix}.nii")).exists(), "{suffix}");
        }
        Ok(())
    }

    #[test]
    fn test_invalid_stride_fails_before_reading_inputs() {
        let cli = Cli::parse_legacy(["dof2f", "/missing/image.nii", "/missing/dof.json", "out", "-stride", "0"]).unwrap();
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("stride must be positive"));
    }
}
