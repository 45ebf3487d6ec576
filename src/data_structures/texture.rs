//! GPU render targets.
//!
//! [`Texture`] wraps a wgpu texture and its default view. The viewer only
//! needs two kinds: the depth buffer used for depth testing and the colour
//! target of a headless context.

use crate::viewport::SurfaceSize;

#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Colour format of headless targets. Row reads map straight onto RGBA8 images.
    pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a depth texture matching the surface size.
    ///
    /// Zero dimensions are clamped to one pixel so the texture is always valid.
    pub fn create_depth_texture(device: &wgpu::Device, size: SurfaceSize, label: &str) -> Self {
        Self::create_target(
            device,
            size,
            Self::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            label,
        )
    }

    /// Create a colour texture that can be rendered to and copied out of.
    pub fn create_offscreen_target(device: &wgpu::Device, size: SurfaceSize, label: &str) -> Self {
        Self::create_target(
            device,
            size,
            Self::OFFSCREEN_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            label,
        )
    }

    fn create_target(
        device: &wgpu::Device,
        size: SurfaceSize,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
