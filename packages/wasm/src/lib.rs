//! Network Backdrop - WASM Module
//!
//! An ambient 3D network drawn behind page content: nodes drift inside a
//! bounding box, nearby nodes are joined by fading lines and small packets
//! hop between them. Compiled to WebAssembly and exposed to JavaScript via
//! wasm-bindgen.
//!
//! # Architecture
//!
//! - `network`: SoA node buffers, colours, edges and packets
//! - `simulation`: physics, proximity graph and packet routing per tick
//! - `interaction`: pointer parallax and viewport tracking
//! - `render`: camera, resource ledger, display list and canvas surface
//! - `lifecycle`: mount, frame loop and idempotent teardown over a `Host`
//! - `web`: the browser `Host`

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Float32Array;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{Level, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub mod config;
pub mod error;
pub mod host;
pub mod interaction;
pub mod lifecycle;
pub mod network;
pub mod render;
pub mod simulation;
pub mod telemetry;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

use config::EngineConfig;
use lifecycle::Lifecycle;
use web::{BrowserHost, BrowserLifecycle};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    telemetry::init_logging(Level::INFO);
}

/// The mounted background.
///
/// Construction mounts into `container`; `unmount()` (or `free()`) releases
/// the canvas, listeners and pending frame.
#[wasm_bindgen]
pub struct NetworkBackdrop {
    lifecycle: Rc<RefCell<BrowserLifecycle>>,
}

#[wasm_bindgen]
impl NetworkBackdrop {
    /// Mount into `container` with optional `options`.
    ///
    /// Throws only for malformed options. A missing container leaves the
    /// instance inactive; other mount failures are logged and likewise
    /// leave it inactive.
    #[wasm_bindgen(constructor)]
    pub fn new(container: Option<HtmlElement>, options: JsValue) -> Result<NetworkBackdrop, JsValue> {
        let config = EngineConfig::from_js(options)?;
        let host = BrowserHost::new(container);
        let lifecycle = Rc::new(RefCell::new(Lifecycle::new(
            host,
            config,
            SmallRng::from_entropy(),
        )));
        BrowserHost::bind(&lifecycle);

        if let Ok(mut lc) = lifecycle.try_borrow_mut() {
            // Logged and rolled back inside.
            let _ = lc.activate();
        }
        Ok(Self { lifecycle })
    }

    /// Tear down. Safe to call repeatedly.
    pub fn unmount(&self) {
        match self.lifecycle.try_borrow_mut() {
            Ok(mut lc) => {
                lc.teardown();
                lc.host_mut().unbind();
            }
            Err(_) => warn!("unmount called from inside a callback, ignored"),
        }
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.lifecycle.try_borrow().is_ok_and(|lc| lc.is_active())
    }

    /// Ticks run since mounting.
    #[wasm_bindgen(js_name = tickCount)]
    pub fn tick_count(&self) -> f64 {
        self.with_simulation(0.0, |sim| sim.ticks() as f64)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.with_simulation(0, |sim| sim.store().node_count() as u32)
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> u32 {
        self.with_simulation(0, |sim| sim.store().particle_count() as u32)
    }

    /// Edges in the proximity graph as of the last tick.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.with_simulation(0, |sim| sim.graph().edge_count() as u32)
    }

    // =========================================================================
    // Zero-copy buffer access
    // =========================================================================

    /// Get a zero-copy view of node X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Read immediately, do not store.
    #[wasm_bindgen(js_name = positionsXView)]
    pub fn positions_x_view(&self) -> Float32Array {
        self.with_simulation(Float32Array::new_with_length(0), |sim| unsafe {
            Float32Array::view(sim.store().positions_x())
        })
    }

    /// Get a zero-copy view of node Y positions.
    #[wasm_bindgen(js_name = positionsYView)]
    pub fn positions_y_view(&self) -> Float32Array {
        self.with_simulation(Float32Array::new_with_length(0), |sim| unsafe {
            Float32Array::view(sim.store().positions_y())
        })
    }

    /// Get a zero-copy view of node Z positions.
    #[wasm_bindgen(js_name = positionsZView)]
    pub fn positions_z_view(&self) -> Float32Array {
        self.with_simulation(Float32Array::new_with_length(0), |sim| unsafe {
            Float32Array::view(sim.store().positions_z())
        })
    }
}

impl NetworkBackdrop {
    fn with_simulation<T>(
        &self,
        fallback: T,
        f: impl FnOnce(&simulation::Simulation<SmallRng>) -> T,
    ) -> T {
        match self.lifecycle.try_borrow() {
            Ok(lc) => lc.simulation().map_or(fallback, f),
            Err(_) => fallback,
        }
    }
}
