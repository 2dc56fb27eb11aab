use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use defgrad_core::transform::{TransformDescriptor, TransformKind};
use std::fs;
use std::path::Path;

/// Read a JSON transform descriptor.
pub fn read_transform_descriptor<P: AsRef<Path>>(path: P) -> Result<TransformDescriptor> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transformation {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse transformation {}", path.display()))
}

/// Read a JSON transform descriptor and build the transform on `device`.
pub fn read_transform<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<TransformKind<B>> {
    let path = path.as_ref();
    let descriptor = read_transform_descriptor(path)?;
    let transform = descriptor
        .build(device)
        .with_context(|| format!("Invalid transformation {}", path.display()))?;
    tracing::debug!(path = %path.display(), kind = transform.name(), "Loaded transformation");
    Ok(transform)
}

/// Write a transform descriptor as pretty-printed JSON.
pub fn write_transform_descriptor<P: AsRef<Path>>(path: P, descriptor: &TransformDescriptor) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(descriptor).context("Failed to serialize transformation")?;
    fs::write(path, text).with_context(|| format!("Failed to write transformation {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use defgrad_core::spatial::Point;
    use defgrad_core::transform::Transform;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_descriptor_file_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dof.json");
        let descriptor = TransformDescriptor::Scale { factors: [2.0, 1.0, 0.5], center: [0.0; 3] };

        write_transform_descriptor(&path, &descriptor)?;
        assert_eq!(read_transform_descriptor(&path)?, descriptor);

        let device = Default::default();
        let transform = read_transform::<TestBackend, _>(&path, &device)?;
        let moved = transform.transform_point(&Point::new([1.0, 1.0, 1.0]), &device);
        assert_eq!(moved, Point::new([2.0, 1.0, 0.5]));
        Ok(())
    }

    #[test]
    fn test_malformed_file_names_the_path() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "type": "warp" }"#)?;

        let err = read_transform::<TestBackend, _>(&path, &Default::default()).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        Ok(())
    }

    #[test]
    fn test_invalid_descriptor_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty_chain.json");
        fs::write(&path, r#"{ "type": "chain", "transforms": [] }"#)?;

        let err = read_transform::<TestBackend, _>(&path, &Default::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no transforms"));
        Ok(())
    }
}
