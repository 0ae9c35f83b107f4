//! Host environment seam.
//!
//! The lifecycle talks to the page only through [`Host`]: container lookup,
//! viewport queries, surface creation, event subscriptions and frame
//! scheduling. The browser implementation lives in `web`; tests use an
//! in-memory host.

use std::fmt;

use crate::error::EngineError;
use crate::interaction::Viewport;
use crate::render::RenderSurface;

/// Page events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    PointerMove,
    Resize,
}

impl HostEvent {
    /// DOM event type name.
    pub fn dom_name(self) -> &'static str {
        match self {
            HostEvent::PointerMove => "pointermove",
            HostEvent::Resize => "resize",
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

/// Registration returned by [`Host::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle {
    pub event: HostEvent,
    pub id: u32,
}

/// Pending frame callback returned by [`Host::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Access to the page hosting the engine.
pub trait Host {
    type Surface: RenderSurface;

    /// Whether the mount point exists.
    fn has_container(&self) -> bool;

    /// Current size of the render region in CSS pixels.
    fn viewport(&self) -> Viewport;

    /// Device pixel ratio of the display.
    fn pixel_ratio(&self) -> f64;

    /// Create a surface inside the container sized to `viewport`.
    fn create_surface(
        &mut self,
        viewport: Viewport,
        pixel_ratio: f64,
    ) -> Result<Self::Surface, EngineError>;

    fn listen(&mut self, event: HostEvent) -> Result<ListenerHandle, EngineError>;

    fn unlisten(&mut self, handle: ListenerHandle);

    /// Schedule one call of the frame callback.
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError>;

    fn cancel_frame(&mut self, handle: FrameHandle);
}
