//! The render-surface wrapper.
//!
//! [`Renderer`] forwards size and clear colour to the GPU [`Context`] and
//! draws one frame of a [`CubeScene`] per call. Losing the graphics context
//! discards the whole `Context`; restoring it means handing in a new one.
//! Until then every frame is skipped instead of failing.

use crate::{
    config::Rgb,
    context::Context,
    data_structures::model::DrawMesh,
    scene::CubeScene,
    viewport::SurfaceSize,
};

/// What happened to a requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Drawn,
    /// No usable context: not created yet, or lost and not yet restored.
    Skipped,
}

/// Life cycle of a graphics context.
///
/// Generic over the context so the transitions can be exercised without a GPU.
#[derive(Debug)]
pub enum ContextSlot<C> {
    /// Nothing created yet.
    Pending,
    Active(C),
    /// Discarded after a loss; waiting for a replacement.
    Lost,
}

impl<C> Default for ContextSlot<C> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<C> ContextSlot<C> {
    pub fn get(&self) -> Option<&C> {
        match self {
            ContextSlot::Active(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut C> {
        match self {
            ContextSlot::Active(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ContextSlot::Active(_))
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, ContextSlot::Lost)
    }

    /// Install a new context, returning the one it replaces.
    pub fn attach(&mut self, ctx: C) -> Option<C> {
        match std::mem::replace(self, ContextSlot::Active(ctx)) {
            ContextSlot::Active(old) => Some(old),
            _ => None,
        }
    }

    /// Take the context out and mark the slot as lost.
    pub fn lose(&mut self) -> Option<C> {
        match std::mem::replace(self, ContextSlot::Lost) {
            ContextSlot::Active(old) => Some(old),
            _ => None,
        }
    }
}

/// Bookkeeping for context creations that may finish after the context they
/// were started for has already been lost again.
///
/// Each creation gets a ticket. A loss invalidates every outstanding ticket,
/// so a context built before the loss is never attached.
#[derive(Debug, Default)]
pub struct ContextRequests {
    epoch: u64,
    in_flight: Option<u64>,
}

impl ContextRequests {
    /// Start a creation. `None` while another one for the current epoch is running.
    pub fn begin(&mut self) -> Option<u64> {
        if self.in_flight == Some(self.epoch) {
            return None;
        }
        self.in_flight = Some(self.epoch);
        Some(self.epoch)
    }

    /// Whether a creation for the current epoch is running.
    pub fn is_pending(&self) -> bool {
        self.in_flight == Some(self.epoch)
    }

    /// The context was lost: outstanding creations become stale.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
    }

    /// A creation succeeded. Returns whether its context may be attached.
    pub fn complete(&mut self, ticket: u64) -> bool {
        let current = ticket == self.epoch;
        if current {
            self.in_flight = None;
        }
        current
    }

    /// A creation failed. A new one may be started right away.
    pub fn fail(&mut self, ticket: u64) {
        if ticket == self.epoch {
            self.in_flight = None;
        }
    }
}

#[derive(Debug)]
pub struct Renderer {
    context: ContextSlot<Context>,
    size: SurfaceSize,
    clear_colour: wgpu::Color,
    generation: u32,
}

impl Renderer {
    pub fn new(size: SurfaceSize, clear_colour: Rgb) -> Self {
        Self {
            context: ContextSlot::Pending,
            size,
            clear_colour: clear_colour.into(),
            generation: 0,
        }
    }

    /// Take ownership of a freshly created context and size it to the renderer.
    pub fn attach(&mut self, mut ctx: Context) {
        if self.size.is_drawable() {
            ctx.resize(self.size);
        }
        // the old context, if any, is dropped here
        self.context.attach(ctx);
        self.generation += 1;
        log::info!("graphics context #{} attached", self.generation);
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Resize the render surface. Zero sizes are ignored.
    pub fn resize(&mut self, size: SurfaceSize) {
        if !size.is_drawable() {
            return;
        }
        self.size = size;
        if let Some(ctx) = self.context.get_mut() {
            ctx.resize(size);
        }
    }

    pub fn set_clear_colour(&mut self, colour: Rgb) {
        self.clear_colour = colour.into();
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.get()
    }

    pub fn is_lost(&self) -> bool {
        self.context.is_lost()
    }

    /// How many contexts have been attached so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether the driver reported the current device as lost.
    pub fn device_lost(&self) -> bool {
        self.context.get().is_some_and(Context::is_lost)
    }

    /// Drop every GPU resource. Frames are skipped until a context is restored.
    pub fn on_context_lost(&mut self) {
        if self.context.lose().is_some() {
            log::warn!("graphics context #{} lost, resources released", self.generation);
        }
    }

    pub fn on_context_restored(&mut self, ctx: Context) {
        self.attach(ctx);
    }

    /// Stretch the surface again after `Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        if let Some(ctx) = self.context.get_mut() {
            ctx.reconfigure();
        }
    }

    /// Draw one frame of `scene`.
    pub fn render(&mut self, scene: &CubeScene) -> Result<Frame, wgpu::SurfaceError> {
        let ctx = match self.context.get() {
            Some(ctx) if self.size.is_drawable() => ctx,
            _ => return Ok(Frame::Skipped),
        };

        ctx.write_scene(scene);
        let frame = ctx.acquire_frame()?;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&ctx.pipeline);
            render_pass.set_vertex_buffer(1, ctx.instance_buffer.slice(..));
            render_pass.draw_mesh_instanced(
                &ctx.cube,
                0..1,
                &ctx.camera.bind_group,
                &ctx.light.bind_group,
                &ctx.material.bind_group,
            );
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(Frame::Drawn)
    }

    /// Read back the last frame. Only offscreen contexts support this.
    pub async fn capture(&self) -> anyhow::Result<image::RgbaImage> {
        match self.context.get() {
            Some(ctx) => ctx.capture().await,
            None => anyhow::bail!("no graphics context to capture from"),
        }
    }
}
