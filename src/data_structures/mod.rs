//! Engine-side data for the viewer: geometry, per-object transforms and textures.
//!
//! - `model` contains the vertex layout and GPU mesh wrapper
//! - `cube` builds box geometry with flat per-face normals
//! - `instance` holds the cube's transformation and its GPU representation
//! - `texture` contains depth and offscreen colour targets

pub mod cube;
pub mod instance;
pub mod model;
pub mod texture;
