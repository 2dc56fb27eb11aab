//! Persistence of the nine component volumes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use defgrad_core::image::ImageGeometry;

use crate::error::{FieldError, Result};
use crate::field::{Component, TensorField};

/// Destination for scalar volumes.
pub trait VolumeSink {
    /// Write one volume laid out x fastest, then y, z, t.
    fn write_volume(&self, path: &Path, geometry: &ImageGeometry<3>, data: &[f32]) -> anyhow::Result<()>;
}

/// Writes NIfTI-1 files; `.nii.gz` paths are compressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiVolumeSink;

impl VolumeSink for NiftiVolumeSink {
    fn write_volume(&self, path: &Path, geometry: &ImageGeometry<3>, data: &[f32]) -> anyhow::Result<()> {
        defgrad_io::write_volume(path, geometry, data)
    }
}

/// Path of one component: `<output>_f<row><col>.<extension>`.
pub fn component_path(output: &Path, component: Component, extension: &str) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(format!("_{}.{}", component.suffix(), extension));
    PathBuf::from(name)
}

/// Writes every component of a tensor field through a [`VolumeSink`].
#[derive(Debug, Clone)]
pub struct FieldWriter<S: VolumeSink = NiftiVolumeSink> {
    sink: S,
    extension: String,
}

impl FieldWriter<NiftiVolumeSink> {
    /// NIfTI writer producing files with `extension` (`nii` or `nii.gz`).
    pub fn nifti(extension: impl Into<String>) -> Self {
        Self::new(NiftiVolumeSink, extension)
    }
}

impl<S: VolumeSink> FieldWriter<S> {
    pub fn new(sink: S, extension: impl Into<String>) -> Self {
        Self { sink, extension: extension.into() }
    }

    /// Write `f11` through `f33` in order, returning the written paths.
    ///
    /// Stops at the first failure; components written before it stay on disk.
    /// A field without cells or frames writes nothing and returns no paths.
    pub fn write(&self, field: &TensorField, output: &Path) -> Result<Vec<PathBuf>> {
        let geometry = field.geometry();
        if geometry.voxel_count() == 0 || geometry.frames() == 0 {
            tracing::warn!(extent = ?geometry.extent(), frames = geometry.frames(), "Empty field, nothing written");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(Component::ALL.len());
        for component in Component::ALL {
            let path = component_path(output, component, &self.extension);
            tracing::info!("Writing {}", component);
            self.sink
                .write_volume(&path, field.geometry(), field.component(component))
                .map_err(|e| {
                    tracing::error!(component = %component, path = %path.display(), "Write failed: {e:#}");
                    FieldError::persistence(component.suffix(), &path, format!("{e:#}"))
                })?;
            written.push(path);
        }
        Ok(written)
    }
}
