use std::collections::HashSet;

use cgmath::{InnerSpace, Vector3};
use hello_cube::data_structures::{cube::box_geometry, instance::{Euler, Instance}};

#[test]
fn should_build_a_flat_shaded_unit_box() {
    let geometry = box_geometry(1.0, 1.0, 1.0);
    assert_eq!(geometry.vertices.len(), 24);
    assert_eq!(geometry.indices.len(), 36);
    assert!(geometry.indices.iter().all(|&i| (i as usize) < geometry.vertices.len()));

    for vertex in &geometry.vertices {
        for coordinate in vertex.position {
            assert_eq!(coordinate.abs(), 0.5);
        }
        let normal = Vector3::from(vertex.normal);
        assert!((normal.magnitude() - 1.0).abs() < 1e-6);
    }

    let normals: HashSet<[i8; 3]> = geometry
        .vertices
        .iter()
        .map(|v| v.normal.map(|c| c as i8))
        .collect();
    assert_eq!(normals.len(), 6);
}

#[test]
fn should_wind_every_triangle_counter_clockwise_from_outside() {
    let geometry = box_geometry(2.0, 1.0, 0.5);
    for triangle in geometry.indices.chunks(3) {
        let [a, b, c] = [0, 1, 2].map(|k| &geometry.vertices[triangle[k] as usize]);
        let pa = Vector3::from(a.position);
        let face_normal = (Vector3::from(b.position) - pa).cross(Vector3::from(c.position) - pa);
        let normal = Vector3::from(a.normal);
        assert!(face_normal.dot(normal) > 0.0);
        // every vertex of a face sits on the face's plane
        assert_eq!(a.normal, b.normal);
        assert_eq!(a.normal, c.normal);
    }
}

#[test]
fn should_respect_box_extents() {
    let geometry = box_geometry(2.0, 1.0, 0.5);
    let max = geometry.vertices.iter().fold([0.0f32; 3], |acc, v| {
        [
            acc[0].max(v.position[0]),
            acc[1].max(v.position[1]),
            acc[2].max(v.position[2]),
        ]
    });
    assert_eq!(max, [1.0, 0.5, 0.25]);
}

#[test]
fn should_rotate_x_before_y() {
    let quarter = std::f32::consts::FRAC_PI_2;
    let instance = Instance {
        rotation: Euler::new(0.0, quarter, 0.0),
        ..Default::default()
    };
    let x_axis = instance.to_matrix() * cgmath::Vector4::unit_x();
    assert!((x_axis.z + 1.0).abs() < 1e-6);

    let both = Euler::new(quarter, quarter, 0.0).to_matrix();
    // Rx * Ry: the y rotation reaches the vector first
    let z_axis = both * Vector3::unit_z();
    assert!((z_axis - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-6);
}
