//! Mount-time configuration.
//!
//! Every option is optional on the JavaScript side; missing keys fall back to
//! the defaults below. The population sizes are fixed for the lifetime of a
//! mounted engine.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::EngineError;

/// Half-extents of the invisible box nodes reflect off.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x: 35.0,
            y: 25.0,
            z: 15.0,
        }
    }
}

impl Bounds {
    /// Bound for an axis index (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Full extents of the origin-centred box nodes are spawned in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnBox {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for SpawnBox {
    fn default() -> Self {
        Self {
            x: 55.0,
            y: 35.0,
            z: 25.0,
        }
    }
}

/// Engine configuration supplied at mount.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of nodes (default: 40).
    pub node_count: usize,
    /// Number of packets travelling between nodes (default: 30).
    pub particle_count: usize,
    /// Nodes closer than this are connected by an edge (default: 12).
    pub connection_threshold: f32,
    /// Packets abandon a hop whose endpoints are farther apart than this (default: 14).
    pub traversal_threshold: f32,
    /// Reflection half-extents.
    pub bounds: Bounds,
    /// Spawn box extents.
    pub spawn: SpawnBox,
    /// Upper limit on the device pixel ratio used for the backing store (default: 2).
    pub max_pixel_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_count: 40,
            particle_count: 30,
            connection_threshold: 12.0,
            traversal_threshold: 14.0,
            bounds: Bounds::default(),
            spawn: SpawnBox::default(),
            max_pixel_ratio: 2.0,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

impl EngineConfig {
    /// Parse options passed from JavaScript. `undefined` and `null` yield defaults.
    pub fn from_js(options: JsValue) -> Result<Self, EngineError> {
        let config: Self = if options.is_undefined() || options.is_null() {
            Self::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), EngineError> {
        positive("connectionThreshold", self.connection_threshold)?;
        positive("traversalThreshold", self.traversal_threshold)?;
        positive("bounds.x", self.bounds.x)?;
        positive("bounds.y", self.bounds.y)?;
        positive("bounds.z", self.bounds.z)?;

        for (name, extent, bound) in [
            ("spawn.x", self.spawn.x, self.bounds.x),
            ("spawn.y", self.spawn.y, self.bounds.y),
            ("spawn.z", self.spawn.z, self.bounds.z),
        ] {
            if !extent.is_finite() || extent < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {extent}"
                )));
            }
            // Nodes spawned outside the bounds would never reflect back in.
            if extent * 0.5 > bound {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} ({extent}) must not exceed twice the matching bound ({bound})"
                )));
            }
        }

        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "maxPixelRatio must be a positive finite number, got {}",
                self.max_pixel_ratio
            )));
        }

        if self.node_count == 0 && self.particle_count > 0 {
            return Err(EngineError::InvalidConfig(
                "particleCount requires at least one node".into(),
            ));
        }

        Ok(())
    }
}
