//! The cube scene: camera, point light and a spinning box.
//!
//! [`CubeScene`] owns only CPU-side state. The GPU mirrors of that state live
//! in [`crate::context::Context`] and are refreshed from the scene on every
//! frame, so the scene survives a context loss untouched.

use cgmath::Deg;

use crate::{
    camera::{Camera, CameraUniform, Projection},
    config::{LightConfig, Spin, ViewerConfig},
    data_structures::{
        cube::box_geometry,
        instance::{Instance, InstanceRaw},
        model::Geometry,
    },
    pipelines::{light::LightUniform, phong::MaterialUniform},
    viewport::SurfaceSize,
};

const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 1000.0;

#[derive(Clone, Debug)]
pub struct CubeScene {
    pub camera: Camera,
    pub projection: Projection,
    pub light: LightConfig,
    pub cube: Instance,
    pub material: MaterialUniform,
    pub spin: Spin,
    size: SurfaceSize,
    frames: u64,
}

impl CubeScene {
    pub fn new(size: SurfaceSize, config: &ViewerConfig) -> Self {
        let camera = Camera::on_z_axis(config.camera_distance);
        let projection = Projection::new(size, Deg(config.fov_degrees), ZNEAR, ZFAR);
        let material = MaterialUniform::new(config.cube_colour, config.specular, config.shininess);
        Self {
            camera,
            projection,
            light: config.light,
            cube: Instance::new(),
            material,
            spin: config.spin,
            size,
            frames: 0,
        }
    }

    /// Geometry of the cube mesh, uploaded once per context.
    pub fn geometry(&self) -> Geometry {
        box_geometry(1.0, 1.0, 1.0)
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Match the projection to a new surface size. Zero sizes are ignored.
    pub fn resize(&mut self, size: SurfaceSize) {
        if !size.is_drawable() {
            return;
        }
        self.size = size;
        self.projection.resize(size);
    }

    /// Advance the cube's rotation by one frame's worth of spin.
    pub fn animate(&mut self) {
        let rotation = &mut self.cube.rotation;
        rotation.x.0 += self.spin.x;
        rotation.y.0 += self.spin.y;
        self.frames += 1;
    }

    /// Number of [`animate`](Self::animate) calls so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&self.camera, &self.projection);
        uniform
    }

    pub fn light_uniform(&self) -> LightUniform {
        LightUniform::from(&self.light)
    }

    pub fn cube_instance(&self) -> InstanceRaw {
        self.cube.to_raw()
    }
}
