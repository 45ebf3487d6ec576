//! Box geometry.

use crate::data_structures::model::{Geometry, ModelVertex};

/// Build an axis-aligned box centred at the origin.
///
/// Each face gets its own four vertices so normals stay flat, which gives
/// 24 vertices and 36 indices. Triangles wind counter-clockwise when seen
/// from outside the box.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);

    // normal, then the face's `u` and `v` axes with u x v == normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [
                (normal[0] + u[0] * su + v[0] * sv) * hx,
                (normal[1] + u[1] * su + v[1] * sv) * hy,
                (normal[2] + u[2] * su + v[2] * sv) * hz,
            ];
            vertices.push(ModelVertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry { vertices, indices }
}
