//! The nine-component tensor field.

use std::fmt;

use defgrad_core::image::ImageGeometry;
use nalgebra::Matrix3;

/// One scalar component `f<row><col>` of the tensor field.
///
/// `row` and `col` are zero-based; component `f<r><c>` holds tensor entry
/// `F(r - 1, c - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Component {
    row: usize,
    col: usize,
}

impl Component {
    /// All components in row-major order: `f11, f12, f13, f21, ..., f33`.
    pub const ALL: [Component; 9] = [
        Component::new(0, 0),
        Component::new(0, 1),
        Component::new(0, 2),
        Component::new(1, 0),
        Component::new(1, 1),
        Component::new(1, 2),
        Component::new(2, 0),
        Component::new(2, 1),
        Component::new(2, 2),
    ];

    /// Component for tensor entry `(row, col)`, zero-based.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Position in [`Component::ALL`].
    pub fn index(&self) -> usize {
        self.row * 3 + self.col
    }

    /// File name suffix, e.g. `f12`.
    pub fn suffix(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}{}", self.row + 1, self.col + 1)
    }
}

/// Nine scalar volumes on the output grid, each stored x fastest, then y, z, t.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorField {
    geometry: ImageGeometry<3>,
    components: [Vec<f32>; 9],
}

impl TensorField {
    /// Allocate a zero field for every frame of `geometry`.
    pub fn zeros(geometry: ImageGeometry<3>) -> Self {
        let len = geometry.voxel_count() * geometry.frames();
        Self {
            geometry,
            components: std::array::from_fn(|_| vec![0.0; len]),
        }
    }

    /// Placement of the component volumes.
    pub fn geometry(&self) -> &ImageGeometry<3> {
        &self.geometry
    }

    /// Values of one component.
    pub fn component(&self, component: Component) -> &[f32] {
        &self.components[component.index()]
    }

    fn offset(&self, cell: [usize; 3], frame: usize) -> usize {
        let [nx, ny, nz] = self.geometry.extent();
        ((frame * nz + cell[2]) * ny + cell[1]) * nx + cell[0]
    }

    /// Tensor stored at `cell` in `frame`.
    pub fn tensor_at(&self, cell: [usize; 3], frame: usize) -> Matrix3<f64> {
        let offset = self.offset(cell, frame);
        Matrix3::from_fn(|r, c| self.components[r * 3 + c][offset] as f64)
    }

    /// Store `tensor` at `cell` of the first frame.
    pub fn set(&mut self, cell: [usize; 3], tensor: &Matrix3<f64>) {
        let offset = self.offset(cell, 0);
        for component in Component::ALL {
            self.components[component.index()][offset] = tensor[(component.row, component.col)] as f32;
        }
    }

    /// Copy the first frame into every other frame.
    pub fn replicate_first_frame(&mut self) {
        let frame_len = self.geometry.voxel_count();
        if frame_len == 0 {
            return;
        }
        for values in &mut self.components {
            let (first, rest) = values.split_at_mut(frame_len);
            for frame in rest.chunks_mut(frame_len) {
                frame.copy_from_slice(first);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_names() {
        let names: Vec<String> = Component::ALL.iter().map(Component::suffix).collect();
        assert_eq!(names, ["f11", "f12", "f13", "f21", "f22", "f23", "f31", "f32", "f33"]);
        assert_eq!(Component::new(0, 1).index(), 1);
        assert_eq!(Component::new(2, 0).index(), 6);
    }

    #[test]
    fn test_set_and_replicate() {
        let geometry = ImageGeometry::with_unit_spacing([2, 3, 1]).with_frames(3);
        let mut field = TensorField::zeros(geometry);
        let tensor = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);

        field.set([1, 2, 0], &tensor);
        field.replicate_first_frame();

        for frame in 0..3 {
            assert_eq!(field.tensor_at([1, 2, 0], frame), tensor);
            assert_eq!(field.tensor_at([0, 0, 0], frame), Matrix3::zeros());
        }
        // f12 holds F(0, 1)
        assert_eq!(field.component(Component::new(0, 1))[5], 2.0);
        assert_eq!(field.component(Component::new(1, 0))[5 + 6], 4.0);
    }
}
