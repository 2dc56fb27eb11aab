use anyhow::{bail, Context, Result};
use nalgebra::SMatrix;
use ndarray::{Array3, Array4, ShapeBuilder};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use defgrad_core::image::ImageGeometry;
use defgrad_core::spatial::{Direction, Point, Spacing, Vector};
use std::path::Path;

/// A scalar image stored with x varying fastest, then y, z and t.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarVolume {
    pub geometry: ImageGeometry<3>,
    pub data: Vec<f32>,
}

impl ScalarVolume {
    /// Value at voxel `(x, y, z)` of frame `t`.
    pub fn value(&self, x: usize, y: usize, z: usize, t: usize) -> f32 {
        let [nx, ny, nz] = self.geometry.extent();
        self.data[((t * nz + z) * ny + y) * nx + x]
    }
}

/// Read the sampling geometry of a NIfTI image without loading its voxels.
pub fn read_nifti_geometry<P: AsRef<Path>>(path: P) -> Result<ImageGeometry<3>> {
    let path = path.as_ref();
    let header = NiftiHeader::from_file(path)
        .with_context(|| format!("Failed to read NIfTI header from {}", path.display()))?;
    geometry_from_header(&header)
}

/// Read a 3D or 4D NIfTI image as `f32` voxels.
pub fn read_volume<P: AsRef<Path>>(path: P) -> Result<ScalarVolume> {
    let path = path.as_ref();
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let geometry = geometry_from_header(obj.header())?;

    let array = obj
        .into_volume()
        .into_ndarray::<f32>()
        .context("Failed to convert volume to ndarray")?;
    if array.ndim() > 4 {
        bail!("Expected at most 4 NIfTI dimensions, found {}", array.ndim());
    }
    // Logical axes are (x, y, z[, t]); reversing them makes x the fastest in iteration order.
    let data: Vec<f32> = array.t().iter().copied().collect();
    if data.len() != geometry.voxel_count() * geometry.frames() {
        bail!(
            "NIfTI header describes {} voxels but the file holds {}",
            geometry.voxel_count() * geometry.frames(),
            data.len()
        );
    }

    Ok(ScalarVolume { geometry, data })
}

/// Write a scalar image to a NIfTI file (`.nii` or `.nii.gz`).
///
/// A single-frame geometry is written as a 3D image, otherwise as 4D with
/// `geometry.frames()` time points. `data` is laid out x fastest.
pub fn write_volume<P: AsRef<Path>>(path: P, geometry: &ImageGeometry<3>, data: &[f32]) -> Result<()> {
    let path = path.as_ref();
    let [nx, ny, nz] = geometry.extent();
    let nt = geometry.frames();
    if data.len() != nx * ny * nz * nt {
        bail!(
            "Volume data holds {} values, geometry {:?} x {} needs {}",
            data.len(),
            geometry.extent(),
            nt,
            nx * ny * nz * nt
        );
    }

    let header = header_from_geometry(geometry);
    let options = WriterOptions::new(path).reference_header(&header);

    let written = if nt == 1 {
        let array = Array3::from_shape_vec((nx, ny, nz).f(), data.to_vec())
            .context("Failed to create ndarray")?;
        options.write_nifti(&array)
    } else {
        let array = Array4::from_shape_vec((nx, ny, nz, nt).f(), data.to_vec())
            .context("Failed to create ndarray")?;
        options.write_nifti(&array)
    };
    written.with_context(|| format!("Failed to write NIfTI file {}", path.display()))?;

    tracing::debug!(path = %path.display(), extent = ?geometry.extent(), frames = nt, "Wrote volume");
    Ok(())
}

fn geometry_from_header(header: &NiftiHeader) -> Result<ImageGeometry<3>> {
    let ndim = header.dim[0] as usize;
    if !(1..=7).contains(&ndim) {
        bail!("Invalid NIfTI dimension count {}", ndim);
    }
    let axis_len = |axis: usize| if axis <= ndim { (header.dim[axis] as usize).max(1) } else { 1 };
    let extent = [axis_len(1), axis_len(2), axis_len(3)];
    let frames = axis_len(4);

    // Sform
    let affine = if header.sform_code > 0 {
        [header.srow_x, header.srow_y, header.srow_z]
    } else if header.qform_code > 0 {
        let b = header.quatern_b;
        let c = header.quatern_c;
        let d = header.quatern_d;
        let a = (1.0 - (b * b + c * c + d * d).min(1.0)).sqrt();

        let qfac = if header.pixdim[0] == 0.0 { 1.0 } else { header.pixdim[0] };

        let r11 = a * a + b * b - c * c - d * d;
        let r12 = 2.0 * b * c - 2.0 * a * d;
        let r13 = 2.0 * b * d + 2.0 * a * c;

        let r21 = 2.0 * b * c + 2.0 * a * d;
        let r22 = a * a + c * c - b * b - d * d;
        let r23 = 2.0 * c * d - 2.0 * a * b;

        let r31 = 2.0 * b * d - 2.0 * a * c;
        let r32 = 2.0 * c * d + 2.0 * a * b;
        let r33 = a * a + d * d - c * c - b * b;

        let dx = header.pixdim[1];
        let dy = header.pixdim[2];
        let dz = header.pixdim[3] * qfac;

        [
            [r11 * dx, r12 * dy, r13 * dz, header.quatern_x],
            [r21 * dx, r22 * dy, r23 * dz, header.quatern_y],
            [r31 * dx, r32 * dy, r33 * dz, header.quatern_z],
        ]
    } else {
        // Fallback: use pixdim scaling only
        let pix = |axis: usize| if header.pixdim[axis] > 0.0 { header.pixdim[axis] } else { 1.0 };
        [
            [pix(1), 0.0, 0.0, 0.0],
            [0.0, pix(2), 0.0, 0.0],
            [0.0, 0.0, pix(3), 0.0],
        ]
    };

    let origin = Point::new([affine[0][3] as f64, affine[1][3] as f64, affine[2][3] as f64]);

    // Columns of the direction matrix, scaled by spacing
    let columns: [Vector<3>; 3] =
        std::array::from_fn(|c| Vector::new([affine[0][c] as f64, affine[1][c] as f64, affine[2][c] as f64]));
    let spacing = Spacing::new(columns.map(|col| col.norm()));
    if !spacing.is_valid() {
        bail!("NIfTI header has degenerate voxel spacing {:?}", spacing.to_array());
    }

    let unit = columns.map(|col| col.0 / col.norm());
    let direction = Direction(SMatrix::<f64, 3, 3>::from_columns(&unit));

    Ok(ImageGeometry::new(extent, origin, spacing, direction).with_frames(frames))
}

fn header_from_geometry(geometry: &ImageGeometry<3>) -> NiftiHeader {
    let spacing = geometry.spacing();
    let direction = geometry.direction();
    let origin = geometry.origin();
    let row = |r: usize| {
        [
            (direction[(r, 0)] * spacing[0]) as f32,
            (direction[(r, 1)] * spacing[1]) as f32,
            (direction[(r, 2)] * spacing[2]) as f32,
            origin[r] as f32,
        ]
    };

    let mut header = NiftiHeader::default();
    header.pixdim = [
        1.0,
        spacing[0] as f32,
        spacing[1] as f32,
        spacing[2] as f32,
        1.0,
        1.0,
        1.0,
        1.0,
    ];
    header.sform_code = 1;
    header.qform_code = 0;
    header.srow_x = row(0);
    header.srow_y = row(1);
    header.srow_z = row(2);
    header.xyzt_units = 2; // millimetres
    header
}
