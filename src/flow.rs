//! Application event loop.
//!
//! Drives the viewer with winit: creates the window (or, on the web, inserts
//! its canvas into the page), builds the scene and the renderer, and renders
//! one frame per redraw request. Every frame requests the next one, which on
//! the web maps onto the browser's animation-frame callback.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the scene and the renderer, then the GPU
//!    context (synchronously natively, through a spawned future on the web)
//! 2. `Resized` updates the surface size shared by renderer and scene
//! 3. `RedrawRequested` advances the cube, draws it and schedules the next frame
//! 4. Context loss drops all GPU resources; restore builds a new context

use std::sync::{Arc, Once};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    context::Context,
    renderer::{ContextRequests, Frame, Renderer},
    scene::CubeScene,
    viewport::SurfaceSize,
};

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Events the viewer sends to itself through the winit event loop.
pub(crate) enum ViewerEvent {
    /// A GPU context finished initialising (web only, natively it is awaited in place).
    /// Carries the ticket the creation was started with.
    #[allow(dead_code)]
    ContextReady(Context, u64),
    /// Creating the context for this ticket failed.
    #[allow(dead_code)]
    ContextFailed(u64),
    #[allow(dead_code)]
    ContextLost,
    #[allow(dead_code)]
    ContextRestored,
    /// The host viewport changed to this logical size.
    #[allow(dead_code)]
    HostResized(LogicalSize<f64>),
}

impl std::fmt::Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContextReady(_, ticket) => f.debug_tuple("ContextReady").field(ticket).finish(),
            Self::ContextFailed(ticket) => f.debug_tuple("ContextFailed").field(ticket).finish(),
            Self::ContextLost => f.write_str("ContextLost"),
            Self::ContextRestored => f.write_str("ContextRestored"),
            Self::HostResized(size) => f.debug_tuple("HostResized").field(size).finish(),
        }
    }
}

/// Window, scene and renderer: everything that exists once the app has resumed.
#[derive(Debug)]
pub(crate) struct Viewer {
    window: Arc<Window>,
    scene: CubeScene,
    renderer: Renderer,
    requests: ContextRequests,
}

impl Viewer {
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Self {
        let size = SurfaceSize::from(window.inner_size());
        let scene = CubeScene::new(size, config);
        let renderer = Renderer::new(size, config.clear_colour);
        Self {
            window,
            scene,
            renderer,
            requests: ContextRequests::default(),
        }
    }

    /// The surface size is consumed by both the render surface and the camera.
    fn resize(&mut self, size: SurfaceSize) {
        log::debug!("resizing to {}x{}", size.width, size.height);
        self.renderer.resize(size);
        self.scene.resize(size);
    }

    fn attach(&mut self, ticket: u64, ctx: Context) {
        if !self.requests.complete(ticket) {
            log::debug!("dropping graphics context #{} created before the last loss", ticket);
            return;
        }
        self.renderer.on_context_restored(ctx);
        self.window.request_redraw();
    }

    fn lose(&mut self) {
        self.renderer.on_context_lost();
        self.requests.invalidate();
    }
}

pub(crate) struct App {
    config: ViewerConfig,
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<ViewerEvent>,
    viewer: Option<Viewer>,
    // removed from the page when the app goes away
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)]
    listeners: Vec<crate::web::Listener>,
    last_stats: Instant,
    frames_since_stats: u32,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            config,
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            viewer: None,
            #[cfg(target_arch = "wasm32")]
            listeners: Vec::new(),
            last_stats: Instant::now(),
            frames_since_stats: 0,
        })
    }

    /// Build a new GPU context for the current window and hand it to the renderer.
    fn create_context(&mut self) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let Some(ticket) = viewer.requests.begin() else {
            return;
        };
        let window = viewer.window.clone();
        let scene = viewer.scene.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(Context::new(window, &scene)) {
                Ok(ctx) => viewer.attach(ticket, ctx),
                Err(e) => {
                    viewer.requests.fail(ticket);
                    log::error!("Unable to create the graphics context: {:#}", e);
                    // keep the frame loop alive, the next redraw retries
                    viewer.window.request_redraw();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window, &scene).await {
                    Ok(ctx) => {
                        if proxy.send_event(ViewerEvent::ContextReady(ctx, ticket)).is_err() {
                            log::warn!("event loop closed before the graphics context was ready");
                        }
                    }
                    Err(e) => {
                        log::error!("Unable to create the graphics context: {:#}", e);
                        let _ = proxy.send_event(ViewerEvent::ContextFailed(ticket));
                    }
                }
            });
        }
    }

    fn record_frame(&mut self) {
        self.frames_since_stats += 1;
        let elapsed = self.last_stats.elapsed();
        if elapsed >= STATS_INTERVAL {
            log::debug!(
                "{:.1} fps",
                self.frames_since_stats as f64 / elapsed.as_secs_f64()
            );
            self.frames_since_stats = 0;
            self.last_stats = Instant::now();
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        let (width, height) = self.config.initial_size;
        let window_attributes = Window::default_attributes()
            .with_title("hello-cube")
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        {
            match crate::web::mount(&window, &self.config.container_id, &self.proxy) {
                Ok(listeners) => self.listeners = listeners,
                Err(e) => log::error!("Unable to mount the canvas: {:?}", e),
            }
        }

        self.viewer = Some(Viewer::new(window, &self.config));
        self.create_context();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        match event {
            ViewerEvent::ContextReady(ctx, ticket) => {
                // pick up whatever size the window settled on while we waited
                viewer.resize(viewer.window.inner_size().into());
                viewer.attach(ticket, ctx);
            }
            ViewerEvent::ContextFailed(ticket) => viewer.requests.fail(ticket),
            ViewerEvent::ContextLost => viewer.lose(),
            ViewerEvent::ContextRestored => self.create_context(),
            ViewerEvent::HostResized(size) => {
                if let Some(physical) = viewer.window.request_inner_size(size) {
                    viewer.resize(physical.into());
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.resize(size.into()),
            WindowEvent::ScaleFactorChanged { .. } => {
                viewer.resize(viewer.window.inner_size().into())
            }
            WindowEvent::RedrawRequested => {
                if viewer.renderer.device_lost() {
                    viewer.lose();
                }
                // the browser announces restores itself
                #[cfg(not(target_arch = "wasm32"))]
                if viewer.renderer.context().is_none() {
                    self.create_context();
                }
                let Some(viewer) = &mut self.viewer else {
                    return;
                };

                viewer.scene.animate();
                match viewer.renderer.render(&viewer.scene) {
                    Ok(Frame::Drawn) => {
                        viewer.window.request_redraw();
                        self.record_frame();
                    }
                    Ok(Frame::Skipped) => viewer.window.request_redraw(),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        viewer.renderer.reconfigure();
                        viewer.window.request_redraw();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                        viewer.window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Set up the `log` backend for the current platform. Safe to call repeatedly.
pub fn init_logging() {
    static LOGGER: Once = Once::new();
    LOGGER.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = env_logger::try_init() {
                println!("Warning: Could not initialize logger: {}", e);
            };
        }

        #[cfg(target_arch = "wasm32")]
        {
            if let Err(e) = console_log::init_with_level(log::Level::Info) {
                web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
            }
        }
    });
}

/// Open the viewer and run until the window is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    init_logging();
    log::info!("starting viewer with {:?}", config);

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
