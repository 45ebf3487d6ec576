//! hello-cube
//!
//! A single rotating, lit cube rendered with wgpu. The cube lives in a window
//! natively and in a canvas inside a page element on the web; either way the
//! render surface and the camera follow the size of the viewport.
//!
//! High-level modules
//! - `camera`: perspective camera, projection and its uniform
//! - `config`: viewer options and their query-string form
//! - `context`: GPU device, render target and the scene's GPU resources
//! - `data_structures`: cube geometry, transforms and render targets
//! - `flow`: the winit event loop driving resize, redraw and context loss
//! - `pipelines`: the Phong pipeline and light/material uniforms
//! - `renderer`: the render-surface wrapper
//! - `scene`: camera, light and cube state
//! - `viewport`: surface size shared by renderer and camera
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod renderer;
pub mod scene;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
mod web;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use config::{Rgb, ViewerConfig};
pub use flow::run;
pub use renderer::{Frame, Renderer};
pub use scene::CubeScene;
pub use viewport::SurfaceSize;
