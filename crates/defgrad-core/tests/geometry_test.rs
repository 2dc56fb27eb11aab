use std::f64::consts::PI;

use defgrad_core::image::ImageGeometry;
use defgrad_core::spatial::{Direction, Point, Spacing};
use nalgebra::{Rotation3, Vector3};

type Point3 = Point<3>;

#[test]
fn test_rotated_geometry() {
    // Rotate 90 degrees around Z: image x runs along world y.
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    let geometry = ImageGeometry::new(
        [10, 10, 10],
        Point3::new([0.0, 0.0, 0.0]),
        Spacing::<3>::new([1.0, 1.0, 1.0]),
        Direction(rotation.into_inner()),
    );

    let index = geometry.world_to_index(&Point3::new([1.0, 0.0, 0.0])).unwrap();
    assert!(index[0].abs() < 1e-12, "Expected index[0] to be 0.0, got {}", index[0]);
    assert!((index[1] + 1.0).abs() < 1e-12, "Expected index[1] to be -1.0, got {}", index[1]);
    assert!(index[2].abs() < 1e-12, "Expected index[2] to be 0.0, got {}", index[2]);

    let world = geometry.index_to_world(&Point3::new([1.0, 0.0, 0.0]));
    assert!(world[0].abs() < 1e-12);
    assert!((world[1] - 1.0).abs() < 1e-12);
}

#[test]
fn test_region_of_rotated_geometry() {
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    let geometry = ImageGeometry::new(
        [8, 8, 8],
        Point3::new([10.0, 0.0, 0.0]),
        Spacing::<3>::new([2.0, 2.0, 2.0]),
        Direction(rotation.into_inner()),
    );

    // Index (2, 0, 0) lies two voxels along world +y.
    let region = geometry.region([2, 0, 0], [8, 8, 8], 0..1).unwrap();
    assert_eq!(region.extent(), [6, 8, 8]);
    assert!((region.origin()[0] - 10.0).abs() < 1e-12);
    assert!((region.origin()[1] - 4.0).abs() < 1e-12);
    assert_eq!(region.direction(), geometry.direction());
}

#[test]
fn test_singular_direction_has_no_inverse() {
    let geometry = ImageGeometry::new(
        [4, 4, 4],
        Point3::origin(),
        Spacing::<3>::uniform(1.0),
        Direction(nalgebra::Matrix3::zeros()),
    );
    assert!(geometry.world_to_index(&Point3::new([1.0, 1.0, 1.0])).is_none());
}
