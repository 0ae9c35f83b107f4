//! Browser implementation of [`Host`].
//!
//! Event and frame callbacks are `Closure`s owned by the host. Each holds a
//! `Weak` handle to the lifecycle and skips its work if the lifecycle is gone
//! or already borrowed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::rngs::SmallRng;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event, HtmlElement, PointerEvent, Window};

use crate::error::EngineError;
use crate::host::{FrameHandle, Host, HostEvent, ListenerHandle};
use crate::interaction::Viewport;
use crate::lifecycle::Lifecycle;
use crate::render::canvas::CanvasSurface;

pub type BrowserLifecycle = Lifecycle<BrowserHost, SmallRng>;

struct Callbacks {
    frame: Closure<dyn FnMut(f64)>,
    pointer_move: Closure<dyn FnMut(PointerEvent)>,
    resize: Closure<dyn FnMut(Event)>,
}

impl Callbacks {
    fn for_event(&self, event: HostEvent) -> &js_sys::Function {
        match event {
            HostEvent::PointerMove => self.pointer_move.as_ref().unchecked_ref(),
            HostEvent::Resize => self.resize.as_ref().unchecked_ref(),
        }
    }
}

pub struct BrowserHost {
    window: Option<Window>,
    document: Option<Document>,
    container: Option<HtmlElement>,
    callbacks: Option<Callbacks>,
    next_listener: u32,
}

impl BrowserHost {
    /// Host for `container`. Outside a browser window there is nothing to
    /// mount into, which is treated like a missing container.
    pub fn new(container: Option<HtmlElement>) -> Self {
        let window = web_sys::window();
        let document = window.as_ref().and_then(Window::document);
        Self {
            window,
            document,
            container,
            callbacks: None,
            next_listener: 0,
        }
    }

    /// Install the frame and event callbacks for `lifecycle`.
    pub fn bind(lifecycle: &Rc<RefCell<BrowserLifecycle>>) {
        let frame = {
            let weak = Rc::downgrade(lifecycle);
            Closure::wrap(Box::new(move |_timestamp: f64| {
                with_lifecycle(&weak, |lc| {
                    lc.on_frame();
                });
            }) as Box<dyn FnMut(f64)>)
        };

        let pointer_move = {
            let weak = Rc::downgrade(lifecycle);
            Closure::wrap(Box::new(move |event: PointerEvent| {
                let (x, y) = (event.client_x() as f32, event.client_y() as f32);
                with_lifecycle(&weak, |lc| lc.on_pointer_move(x, y));
            }) as Box<dyn FnMut(PointerEvent)>)
        };

        let resize = {
            let weak = Rc::downgrade(lifecycle);
            Closure::wrap(Box::new(move |_event: Event| {
                with_lifecycle(&weak, |lc| {
                    lc.on_resize();
                });
            }) as Box<dyn FnMut(Event)>)
        };

        match lifecycle.try_borrow_mut() {
            Ok(mut lc) => {
                lc.host_mut().callbacks = Some(Callbacks {
                    frame,
                    pointer_move,
                    resize,
                })
            }
            Err(_) => warn!("lifecycle busy, callbacks not installed"),
        }
    }

    /// Drop the callbacks. Only safe once nothing is registered or pending.
    pub fn unbind(&mut self) {
        self.callbacks = None;
    }

    fn window(&self) -> Result<&Window, EngineError> {
        self.window
            .as_ref()
            .ok_or_else(|| EngineError::Host("no window".into()))
    }

    fn callbacks(&self) -> Result<&Callbacks, EngineError> {
        self.callbacks.as_ref().ok_or(EngineError::NotBound)
    }
}

fn with_lifecycle(weak: &Weak<RefCell<BrowserLifecycle>>, f: impl FnOnce(&mut BrowserLifecycle)) {
    let Some(lifecycle) = weak.upgrade() else {
        return;
    };
    if let Ok(mut lc) = lifecycle.try_borrow_mut() {
        f(&mut lc);
    }
}

impl Host for BrowserHost {
    type Surface = CanvasSurface;

    fn has_container(&self) -> bool {
        self.container.is_some() && self.document.is_some()
    }

    fn viewport(&self) -> Viewport {
        let Some(window) = self.window.as_ref() else {
            return Viewport::default();
        };
        let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            value
                .ok()
                .and_then(|v| v.as_f64())
                .map_or(0, |v| v.max(0.0) as u32)
        };
        Viewport::new(
            dimension(window.inner_width()),
            dimension(window.inner_height()),
        )
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.as_ref().map_or(1.0, Window::device_pixel_ratio)
    }

    fn create_surface(
        &mut self,
        viewport: Viewport,
        pixel_ratio: f64,
    ) -> Result<CanvasSurface, EngineError> {
        let (Some(document), Some(container)) = (self.document.as_ref(), self.container.as_ref())
        else {
            return Err(EngineError::Host("no container".into()));
        };
        CanvasSurface::mount(document, container, viewport, pixel_ratio)
    }

    fn listen(&mut self, event: HostEvent) -> Result<ListenerHandle, EngineError> {
        let window = self.window()?;
        let callback = self.callbacks()?.for_event(event);
        window
            .add_event_listener_with_callback(event.dom_name(), callback)
            .map_err(|e| EngineError::from_js("addEventListener", &e))?;
        self.next_listener += 1;
        Ok(ListenerHandle {
            event,
            id: self.next_listener,
        })
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        let (Ok(window), Ok(callbacks)) = (self.window(), self.callbacks()) else {
            return;
        };
        let callback = callbacks.for_event(handle.event);
        if let Err(e) = window.remove_event_listener_with_callback(handle.event.dom_name(), callback)
        {
            warn!(error = ?e, event = %handle.event, "removeEventListener failed");
        }
    }

    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        let window = self.window()?;
        let callback = self.callbacks()?.frame.as_ref().unchecked_ref();
        window
            .request_animation_frame(callback)
            .map(FrameHandle)
            .map_err(|e| EngineError::from_js("requestAnimationFrame", &e))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let cancelled = self
            .window()
            .and_then(|window| {
                window
                    .cancel_animation_frame(handle.0)
                    .map_err(|e| EngineError::from_js("cancelAnimationFrame", &e))
            });
        if let Err(e) = cancelled {
            warn!(error = %e, frame = handle.0, "cancelAnimationFrame failed");
        }
    }
}
