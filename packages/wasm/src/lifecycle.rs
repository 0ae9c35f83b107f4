//! Mount, per-frame tick and teardown of the engine.
//!
//! [`Lifecycle`] owns every resource the engine acquires from its [`Host`]:
//! the render surface, the scene resources allocated on it, the event
//! listeners and the pending frame callback. Teardown releases all of them
//! and may be called any number of times.

use rand::Rng;
use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::host::{FrameHandle, Host, HostEvent, ListenerHandle};
use crate::interaction::{InteractionState, Viewport};
use crate::render::{Frame, PerspectiveCamera, RenderSurface, SceneResources};
use crate::simulation::{Simulation, TickStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet mounted.
    Idle,
    /// Mounted and ticking.
    Active,
    /// Torn down. Terminal.
    TornDown,
}

/// Everything that exists only while mounted.
struct Scene<S, R: Rng> {
    surface: S,
    resources: SceneResources,
    simulation: Simulation<R>,
    camera: PerspectiveCamera,
    frame: Frame,
    viewport: Viewport,
}

pub struct Lifecycle<H: Host, R: Rng> {
    host: H,
    config: EngineConfig,
    rng: Option<R>,
    phase: Phase,
    cancelled: bool,
    pending_frame: Option<FrameHandle>,
    listeners: Vec<ListenerHandle>,
    scene: Option<Scene<H::Surface, R>>,
    interaction: InteractionState,
    draw_failed: bool,
}

impl<H: Host, R: Rng> Lifecycle<H, R> {
    /// Create an idle lifecycle. Nothing is acquired until [`activate`].
    ///
    /// [`activate`]: Lifecycle::activate
    pub fn new(host: H, config: EngineConfig, rng: R) -> Self {
        Self {
            host,
            config,
            rng: Some(rng),
            phase: Phase::Idle,
            cancelled: false,
            pending_frame: None,
            listeners: Vec::new(),
            scene: None,
            interaction: InteractionState::default(),
            draw_failed: false,
        }
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Mount into the host container and schedule the first frame.
    ///
    /// Returns `Ok(false)` without side effects when there is no container
    /// or the lifecycle is not idle. On error everything acquired so far has
    /// been released and the lifecycle is torn down.
    pub fn activate(&mut self) -> Result<bool, EngineError> {
        if self.phase != Phase::Idle {
            return Ok(self.phase == Phase::Active);
        }
        if !self.host.has_container() {
            debug!("no container, staying idle");
            return Ok(false);
        }

        match self.mount() {
            Ok(()) => {
                self.phase = Phase::Active;
                debug!(
                    nodes = self.config.node_count,
                    particles = self.config.particle_count,
                    "network backdrop mounted"
                );
                Ok(true)
            }
            Err(err) => {
                error!(%err, "activation failed, rolling back");
                self.teardown();
                Err(err)
            }
        }
    }

    fn mount(&mut self) -> Result<(), EngineError> {
        let Some(rng) = self.rng.take() else {
            return Err(EngineError::NotBound);
        };
        let simulation = Simulation::new(&self.config, rng);

        let viewport = self.host.viewport();
        let pixel_ratio = self.host.pixel_ratio().min(self.config.max_pixel_ratio);
        let mut surface = self.host.create_surface(viewport, pixel_ratio)?;

        let mut camera = PerspectiveCamera::default();
        if !camera.fit(viewport) {
            warn!(?viewport, "degenerate viewport at mount");
        }

        let resources = match SceneResources::allocate(&mut surface, simulation.store()) {
            Ok(resources) => resources,
            Err(err) => {
                surface.detach();
                return Err(err);
            }
        };

        self.interaction = InteractionState::new(viewport);
        self.scene = Some(Scene {
            surface,
            resources,
            simulation,
            camera,
            frame: Frame::new(),
            viewport,
        });

        for event in [HostEvent::PointerMove, HostEvent::Resize] {
            let handle = self.host.listen(event)?;
            self.listeners.push(handle);
        }

        self.pending_frame = Some(self.host.request_frame()?);
        Ok(())
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Run one tick and schedule the next.
    ///
    /// Returns the tick summary, or `None` when cancelled or not mounted.
    pub fn on_frame(&mut self) -> Option<TickStats> {
        self.pending_frame = None;
        if self.cancelled || self.phase != Phase::Active {
            return None;
        }
        let scene = self.scene.as_mut()?;

        let rotation = self.interaction.advance();
        let stats = scene.simulation.step();
        scene.frame.build(
            &scene.simulation,
            &scene.resources,
            &scene.camera,
            rotation,
            scene.viewport,
        );
        if let Err(err) = scene.surface.draw(&scene.frame) {
            if !self.draw_failed {
                warn!(%err, "draw failed");
                self.draw_failed = true;
            }
        }
        trace!(
            tick = scene.simulation.ticks(),
            edges = stats.edges,
            hops = stats.routes.hopped,
            "tick"
        );

        match self.host.request_frame() {
            Ok(handle) => self.pending_frame = Some(handle),
            Err(err) => error!(%err, "could not schedule next frame"),
        }
        Some(stats)
    }

    /// Record a pointer position in client coordinates.
    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32) {
        if self.phase == Phase::Active {
            self.interaction.pointer_moved(client_x, client_y);
        }
    }

    /// Refit camera, surface and pointer centre to the host viewport.
    ///
    /// Returns whether the new viewport was applied.
    pub fn on_resize(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let viewport = self.host.viewport();
        if self.interaction.resized(viewport).is_none() {
            warn!(?viewport, "ignoring degenerate resize");
            return false;
        }
        scene.camera.fit(viewport);
        scene.surface.resize(viewport);
        scene.viewport = viewport;
        debug!(width = viewport.width, height = viewport.height, "resized");
        true
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release everything. Safe to call before activation and repeatedly.
    pub fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }

        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
        self.cancelled = true;

        let listeners = self.listeners.len();
        for handle in self.listeners.drain(..) {
            self.host.unlisten(handle);
        }

        let mut released = 0;
        if let Some(scene) = self.scene.take() {
            let Scene {
                mut surface,
                resources,
                simulation,
                ..
            } = scene;
            released = resources.release(&mut surface);
            if surface.is_attached() {
                surface.detach();
            } else {
                warn!("surface already detached from container");
            }
            drop(simulation);
        }

        self.rng = None;
        self.interaction = InteractionState::default();
        self.phase = Phase::TornDown;
        debug!(listeners, released, "network backdrop torn down");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn simulation(&self) -> Option<&Simulation<R>> {
        self.scene.as_ref().map(|scene| &scene.simulation)
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Allocations currently held on the surface.
    pub fn allocation_count(&self) -> usize {
        self.scene
            .as_ref()
            .map_or(0, |scene| scene.resources.allocation_count())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host, R: Rng> Drop for Lifecycle<H, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}
