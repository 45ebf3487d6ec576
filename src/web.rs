//! Browser glue: canvas placement and DOM event listeners.

use wasm_bindgen::{JsCast, JsValue, prelude::*};
use winit::{dpi::LogicalSize, event_loop::EventLoopProxy, platform::web::WindowExtWebSys, window::Window};

use crate::{config::ViewerConfig, flow::ViewerEvent};

/// A DOM event listener that unregisters itself when dropped.
pub(crate) struct Listener {
    target: web_sys::EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn new(
        target: web_sys::EventTarget,
        kind: &'static str,
        callback: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(callback);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

fn send(proxy: &EventLoopProxy<ViewerEvent>, event: ViewerEvent) {
    if let Err(e) = proxy.send_event(event) {
        log::warn!("dropping event, the event loop is closed: {}", e);
    }
}

fn viewport_size(window: &web_sys::Window) -> Option<LogicalSize<f64>> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(LogicalSize::new(width, height))
}

/// Put the canvas into the container element and wire up the browser events.
///
/// The canvas is only inserted when the container is still empty, so mounting
/// twice does not produce two canvases. Falls back to `<body>` when no element
/// has `container_id`.
pub(crate) fn mount(
    window: &Window,
    container_id: &str,
    proxy: &EventLoopProxy<ViewerEvent>,
) -> Result<Vec<Listener>, JsValue> {
    let host = web_sys::window().ok_or("no browser window")?;
    let document = host.document().ok_or("no document")?;
    let canvas = window.canvas().ok_or("the window has no canvas")?;

    let container: web_sys::Node = match document.get_element_by_id(container_id) {
        Some(element) => element.into(),
        None => {
            log::warn!("no element with id '{}', using the document body", container_id);
            document.body().ok_or("no document body")?.into()
        }
    };
    if !container.has_child_nodes() {
        container.append_child(&canvas)?;
    }

    let mut listeners = Vec::with_capacity(3);

    let resize_proxy = proxy.clone();
    let resize_host = host.clone();
    listeners.push(Listener::new(host.clone().into(), "resize", move |_| {
        if let Some(size) = viewport_size(&resize_host) {
            send(&resize_proxy, ViewerEvent::HostResized(size));
        }
    })?);

    let lost_proxy = proxy.clone();
    listeners.push(Listener::new(
        canvas.clone().into(),
        "webglcontextlost",
        move |event: web_sys::Event| {
            // without this the browser never restores the context
            event.prevent_default();
            send(&lost_proxy, ViewerEvent::ContextLost);
        },
    )?);

    let restored_proxy = proxy.clone();
    listeners.push(Listener::new(canvas.into(), "webglcontextrestored", move |_| {
        send(&restored_proxy, ViewerEvent::ContextRestored);
    })?);

    // size the surface to the viewport right away, like a resize would
    if let Some(size) = viewport_size(&host) {
        send(proxy, ViewerEvent::HostResized(size));
    }

    Ok(listeners)
}

/// Entry point for the page: read options from the URL and start the viewer.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    crate::flow::init_logging();
    let config = ViewerConfig::from_location().map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    crate::flow::run(config).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
