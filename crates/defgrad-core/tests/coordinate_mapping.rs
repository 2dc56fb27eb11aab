use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use defgrad_core::image::ImageGeometry;
use defgrad_core::spatial::{Direction, Point, Spacing};
use nalgebra::SMatrix;
use proptest::prelude::*;

type Backend = NdArray<f32>;
const D: usize = 3;

fn make_rotation(angle_x: f64, angle_y: f64, angle_z: f64) -> Direction<D> {
    let (sx, cx) = angle_x.sin_cos();
    let (sy, cy) = angle_y.sin_cos();
    let (sz, cz) = angle_z.sin_cos();

    let rz = SMatrix::<f64, 3, 3>::new(cz, -sz, 0.0, sz, cz, 0.0, 0.0, 0.0, 1.0);
    let ry = SMatrix::<f64, 3, 3>::new(cy, 0.0, sy, 0.0, 1.0, 0.0, -sy, 0.0, cy);
    let rx = SMatrix::<f64, 3, 3>::new(1.0, 0.0, 0.0, 0.0, cx, -sx, 0.0, sx, cx);

    Direction(rx * ry * rz)
}

proptest! {
    #[test]
    fn test_coordinate_roundtrip(
        ox in -100.0f64..100.0, oy in -100.0f64..100.0, oz in -100.0f64..100.0,
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        ax in -3.14f64..3.14, ay in -3.14f64..3.14, az in -3.14f64..3.14,
        ix in -50.0f64..50.0, iy in -50.0f64..50.0, iz in -50.0f64..50.0
    ) {
        let geometry = ImageGeometry::new(
            [2, 2, 2],
            Point::<D>::new([ox, oy, oz]),
            Spacing::<D>::new([sx, sy, sz]),
            make_rotation(ax, ay, az),
        );

        let index = Point::<D>::new([ix, iy, iz]);
        let world = geometry.index_to_world(&index);
        let back = geometry.world_to_index(&world).unwrap();

        for i in 0..D {
            prop_assert!((back[i] - index[i]).abs() < 1e-8, "axis {}: {} vs {}", i, back[i], index[i]);
        }
    }

    #[test]
    fn test_tensor_mapping_matches_point_mapping(
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        ax in -3.14f64..3.14, az in -3.14f64..3.14,
        ix in 0.0f64..20.0, iy in 0.0f64..20.0, iz in 0.0f64..20.0
    ) {
        let device = Default::default();
        let geometry = ImageGeometry::new(
            [2, 2, 2],
            Point::<D>::new([5.0, -3.0, 1.0]),
            Spacing::<D>::new([sx, sy, sz]),
            make_rotation(ax, 0.0, az),
        );

        let index = Point::<D>::new([ix, iy, iz]);
        let expected = geometry.index_to_world(&index);

        let indices = Tensor::<Backend, 2>::from_floats([[ix as f32, iy as f32, iz as f32]], &device);
        let world = geometry.index_to_world_tensor(indices).into_data();
        let actual = world.as_slice::<f32>().unwrap();

        for i in 0..D {
            prop_assert!((actual[i] as f64 - expected[i]).abs() < 1e-3);
        }
    }
}
