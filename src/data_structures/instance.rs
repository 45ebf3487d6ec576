//! Object transformation data for GPU rendering.
//!
//! The transform is stored as position, Euler rotation and scale, and is
//! packed into a model matrix plus normal matrix for the vertex shader.

use cgmath::{Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Rotation as three angles applied in X, then Y, then Z order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler {
    pub x: Rad<f32>,
    pub y: Rad<f32>,
    pub z: Rad<f32>,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Rad(x),
            y: Rad(y),
            z: Rad(z),
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotation matrix `Rx * Ry * Rz`, matching an intrinsic XYZ rotation.
    pub fn to_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_x(self.x) * Matrix3::from_angle_y(self.y) * Matrix3::from_angle_z(self.z)
    }
}

#[derive(Clone, Debug)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Euler,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation.to_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let rotation = self.rotation.to_matrix();
        // inverse-transpose handles non-uniform scale; fall back to the pure rotation if singular
        let normal = (rotation * Matrix3::from_diagonal(self.scale))
            .invert()
            .map(|m| m.transpose())
            .unwrap_or(rotation);
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: [
                normal.x.extend(0.0).into(),
                normal.y.extend(0.0).into(),
                normal.z.extend(0.0).into(),
            ],
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// The data stored on the GPU. Columns of the normal matrix are padded to
/// `vec4` so the same struct can back a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
}

impl InstanceRaw {
    pub fn model(&self) -> Matrix4<f32> {
        self.model.into()
    }
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // advance once per instance rather than per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // a mat4 takes four vertex slots, one per column
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 24]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
