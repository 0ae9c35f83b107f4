//! In-memory host and surface for native tests.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use crate::error::EngineError;
use crate::host::{FrameHandle, Host, HostEvent, ListenerHandle};
use crate::interaction::Viewport;
use crate::lifecycle::Lifecycle;
use crate::render::{
    Frame, GeometryDesc, GeometryId, MaterialDesc, MaterialId, RenderSurface, ResourceSlots,
};

/// Observable state of a [`RecordingSurface`], shared with its host so it
/// survives the surface being dropped on teardown.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub geometries: ResourceSlots<GeometryDesc>,
    pub materials: ResourceSlots<MaterialDesc>,
    pub attached: bool,
    pub detaches: usize,
    pub draws: usize,
    pub last_segments: usize,
    pub last_sprites: usize,
    pub resizes: Vec<Viewport>,
    /// Allocations allowed before `create_*` starts failing.
    pub fail_after: Option<usize>,
    pub allocations: usize,
    pub fail_draw: bool,
}

impl SurfaceLog {
    /// Live geometries plus live materials.
    pub fn live(&self) -> usize {
        self.geometries.len() + self.materials.len()
    }

    fn allocate(&mut self) -> Result<(), EngineError> {
        if self.fail_after.is_some_and(|limit| self.allocations >= limit) {
            return Err(EngineError::Host("allocation refused".into()));
        }
        self.allocations += 1;
        Ok(())
    }
}

pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        let log = SurfaceLog {
            attached: true,
            ..SurfaceLog::default()
        };
        Self {
            log: Rc::new(RefCell::new(log)),
        }
    }

    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }

    pub fn fail_after(&mut self, allocations: usize) {
        self.log.borrow_mut().fail_after = Some(allocations);
    }

    pub fn live_geometries(&self) -> usize {
        self.log.borrow().geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.log.borrow().materials.len()
    }

    pub fn material(&self, id: MaterialId) -> Option<MaterialDesc> {
        self.log.borrow().materials.get(id.0).copied()
    }
}

impl RenderSurface for RecordingSurface {
    fn create_geometry(&mut self, desc: &GeometryDesc) -> Result<GeometryId, EngineError> {
        let mut log = self.log.borrow_mut();
        log.allocate()?;
        Ok(GeometryId(log.geometries.insert(*desc)))
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, EngineError> {
        let mut log = self.log.borrow_mut();
        log.allocate()?;
        Ok(MaterialId(log.materials.insert(*desc)))
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.log.borrow_mut().geometries.remove(id.0);
    }

    fn release_material(&mut self, id: MaterialId) {
        self.log.borrow_mut().materials.remove(id.0);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), EngineError> {
        let mut log = self.log.borrow_mut();
        log.draws += 1;
        log.last_segments = frame.segments.len();
        log.last_sprites = frame.sprites.len();
        if log.fail_draw {
            return Err(EngineError::SurfaceUnavailable);
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.log.borrow().attached
    }

    fn detach(&mut self) {
        let mut log = self.log.borrow_mut();
        log.attached = false;
        log.detaches += 1;
    }
}

/// Host that records subscriptions and frame requests.
pub struct FakeHost {
    pub container: bool,
    pub viewport: Viewport,
    pub pixel_ratio: f64,
    pub fail_surface: bool,
    pub fail_listen: Option<HostEvent>,
    pub surface_fail_after: Option<usize>,
    surface_log: Option<Rc<RefCell<SurfaceLog>>>,
    surfaces_created: usize,
    surface_pixel_ratio: Option<f64>,
    listeners: Vec<ListenerHandle>,
    pending: Vec<FrameHandle>,
    next_id: u32,
    frames_requested: usize,
    frames_cancelled: usize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            container: true,
            viewport: Viewport::new(800, 600),
            pixel_ratio: 3.0,
            fail_surface: false,
            fail_listen: None,
            surface_fail_after: None,
            surface_log: None,
            surfaces_created: 0,
            surface_pixel_ratio: None,
            listeners: Vec::new(),
            pending: Vec::new(),
            next_id: 0,
            frames_requested: 0,
            frames_cancelled: 0,
        }
    }

    pub fn without_container() -> Self {
        Self {
            container: false,
            ..Self::new()
        }
    }

    /// Log of the most recently created surface.
    pub fn surface_log(&self) -> Option<Rc<RefCell<SurfaceLog>>> {
        self.surface_log.clone()
    }

    pub fn surfaces_created(&self) -> usize {
        self.surfaces_created
    }

    /// Pixel ratio the last surface was created with.
    pub fn surface_pixel_ratio(&self) -> Option<f64> {
        self.surface_pixel_ratio
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn frames_requested(&self) -> usize {
        self.frames_requested
    }

    pub fn frames_cancelled(&self) -> usize {
        self.frames_cancelled
    }

    /// Deliver the oldest pending frame, as the browser would.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for FakeHost {
    type Surface = RecordingSurface;

    fn has_container(&self) -> bool {
        self.container
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn create_surface(
        &mut self,
        _viewport: Viewport,
        pixel_ratio: f64,
    ) -> Result<RecordingSurface, EngineError> {
        if self.fail_surface {
            return Err(EngineError::SurfaceUnavailable);
        }
        let mut surface = RecordingSurface::new();
        if let Some(limit) = self.surface_fail_after {
            surface.fail_after(limit);
        }
        self.surface_log = Some(surface.log());
        self.surfaces_created += 1;
        self.surface_pixel_ratio = Some(pixel_ratio);
        Ok(surface)
    }

    fn listen(&mut self, event: HostEvent) -> Result<ListenerHandle, EngineError> {
        if self.fail_listen == Some(event) {
            return Err(EngineError::Host(format!("cannot listen for {event}")));
        }
        let handle = ListenerHandle {
            event,
            id: self.next_id(),
        };
        self.listeners.push(handle);
        Ok(handle)
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|h| *h != handle);
    }

    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        let handle = FrameHandle(self.next_id() as i32);
        self.pending.push(handle);
        self.frames_requested += 1;
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() < before {
            self.frames_cancelled += 1;
        }
    }
}

/// Deliver up to `frames` scheduled frames. Returns how many ticks ran.
pub fn run_frames<R: Rng>(lifecycle: &mut Lifecycle<FakeHost, R>, frames: usize) -> usize {
    let mut ran = 0;
    for _ in 0..frames {
        if lifecycle.host_mut().take_frame().is_none() {
            break;
        }
        if lifecycle.on_frame().is_some() {
            ran += 1;
        }
    }
    ran
}
