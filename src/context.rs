//! GPU context: device, queue, render target and every GPU resource of the scene.
//!
//! A [`Context`] is created in one go and dropped in one go. That is how the
//! viewer reacts to a lost graphics context: the old one is discarded and a
//! fresh one is built from the (CPU-side) [`CubeScene`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Context as _, anyhow, bail};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::CameraResources,
    data_structures::{model::Mesh, texture::Texture},
    pipelines::{
        light::LightResources,
        phong::{MaterialResources, mk_phong_pipeline},
    },
    scene::CubeScene,
    viewport::SurfaceSize,
};

/// Where frames end up.
#[derive(Debug)]
pub(crate) enum Target {
    /// The surface keeps its window alive.
    Window { surface: wgpu::Surface<'static> },
    Offscreen {
        texture: Texture,
    },
}

/// A frame that is being drawn. Surface frames must be presented.
pub(crate) enum FrameTarget {
    Surface {
        output: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    Offscreen {
        view: wgpu::TextureView,
    },
}

impl FrameTarget {
    pub(crate) fn view(&self) -> &wgpu::TextureView {
        match self {
            FrameTarget::Surface { view, .. } => view,
            FrameTarget::Offscreen { view } => view,
        }
    }

    pub(crate) fn present(self) {
        if let FrameTarget::Surface { output, .. } = self {
            output.present();
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) target: Target,
    pub(crate) depth_texture: Texture,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) camera: CameraResources,
    pub(crate) light: LightResources,
    pub(crate) material: MaterialResources,
    pub(crate) cube: Mesh,
    pub(crate) instance_buffer: wgpu::Buffer,
    lost: Arc<AtomicBool>,
}

impl Context {
    /// Create a context that renders into `window`.
    pub async fn new(window: Arc<Window>, scene: &CubeScene) -> anyhow::Result<Self> {
        let size = SurfaceSize::from(window.inner_size());

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;
        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colours, so prefer an sRGB surface. Anything
        // else would make the scene come out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("the surface reports no supported formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        if size.is_drawable() {
            surface.configure(&device, &config);
        }

        Ok(Self::assemble(
            Target::Window { surface },
            device,
            queue,
            config,
            scene,
        ))
    }

    /// Create a context without a window. Frames are kept in a texture that
    /// can be read back with [`Context::capture`].
    pub async fn headless(size: SurfaceSize, scene: &CubeScene) -> anyhow::Result<Self> {
        if !size.is_drawable() {
            bail!("cannot create a {}x{} offscreen target", size.width, size.height);
        }
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter available for offscreen rendering")?;
        let (device, queue) = request_device(&adapter).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: Texture::OFFSCREEN_FORMAT,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let texture = Texture::create_offscreen_target(&device, size, "offscreen_target");

        Ok(Self::assemble(
            Target::Offscreen { texture },
            device,
            queue,
            config,
            scene,
        ))
    }

    fn assemble(
        target: Target,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        scene: &CubeScene,
    ) -> Self {
        let lost = Arc::new(AtomicBool::new(false));
        let flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::warn!("graphics device lost ({:?}): {}", reason, message);
            flag.store(true, Ordering::SeqCst);
        });

        let camera = CameraResources::new(&device, scene.camera_uniform());
        let light = LightResources::new(&device, scene.light_uniform());
        let material = MaterialResources::new(&device, scene.material);
        let pipeline = mk_phong_pipeline(
            &device,
            config.format,
            &camera.bind_group_layout,
            &light.bind_group_layout,
            &material.bind_group_layout,
        );
        let cube = Mesh::upload(&device, "cube", &scene.geometry());
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Instance Buffer"),
            contents: bytemuck::cast_slice(&[scene.cube_instance()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let depth_texture = Texture::create_depth_texture(
            &device,
            SurfaceSize::new(config.width, config.height),
            "depth_texture",
        );

        Self {
            target,
            depth_texture,
            device,
            queue,
            config,
            pipeline,
            camera,
            light,
            material,
            cube,
            instance_buffer,
            lost,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Whether the driver reported this device as lost.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Resize the render target and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, size: SurfaceSize) {
        if !size.is_drawable() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        match &mut self.target {
            Target::Window { surface, .. } => surface.configure(&self.device, &self.config),
            Target::Offscreen { texture } => {
                *texture = Texture::create_offscreen_target(&self.device, size, "offscreen_target")
            }
        }
        self.depth_texture = Texture::create_depth_texture(&self.device, size, "depth_texture");
    }

    /// Re-apply the current configuration, e.g. after the surface went stale.
    pub(crate) fn reconfigure(&mut self) {
        if let Target::Window { surface, .. } = &self.target {
            surface.configure(&self.device, &self.config);
        }
    }

    /// Upload everything the scene changes between frames.
    pub(crate) fn write_scene(&self, scene: &CubeScene) {
        self.camera.write(&self.queue, scene.camera_uniform());
        self.light.write(&self.queue, scene.light_uniform());
        self.material.write(&self.queue, scene.material);
        self.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[scene.cube_instance()]),
        );
    }

    pub(crate) fn acquire_frame(&self) -> Result<FrameTarget, wgpu::SurfaceError> {
        match &self.target {
            Target::Window { surface, .. } => {
                let output = surface.get_current_texture()?;
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(FrameTarget::Surface { output, view })
            }
            Target::Offscreen { texture } => Ok(FrameTarget::Offscreen {
                view: texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default()),
            }),
        }
    }

    /// Read the last frame of an offscreen context back into an image.
    pub async fn capture(&self) -> anyhow::Result<image::RgbaImage> {
        let Target::Offscreen { texture } = &self.target else {
            bail!("only offscreen contexts can be captured");
        };
        let SurfaceSize { width, height } = self.size();

        // rows of a texture copy must be 256 byte aligned
        let unpadded_bytes_per_row = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Buffer"),
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // the receiver only goes away if capture itself was dropped
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow!("capture buffer mapping was cancelled"))??;

        let data = buffer_slice.get_mapped_range();
        let pixels: Vec<u8> = data
            .chunks(padded_bytes_per_row as usize)
            .flat_map(|row| &row[..unpadded_bytes_per_row as usize])
            .copied()
            .collect();
        drop(data);
        output_buffer.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("captured frame does not match {}x{}", width, height))
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    log::info!("device and queue");
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            // WebGL doesn't support all of wgpu's features, so if
            // we're building for the web we'll have to disable some.
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
            ..Default::default()
        })
        .await
        .context("cannot open the graphics device")
}
