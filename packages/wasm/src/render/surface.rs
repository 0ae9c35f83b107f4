//! Render surface abstraction.
//!
//! A surface owns the drawing context bound to the container and every
//! geometry/material allocated on it. The engine refers to those allocations
//! by id and hands the surface one [`Frame`] per tick.

use std::fmt;

use super::frame::Frame;
use crate::error::EngineError;
use crate::interaction::Viewport;
use crate::network::Rgb;

/// Handle to a geometry allocated on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);

/// Handle to a material allocated on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Geometry({})", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Material({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// Icosahedron subdivided `detail` times.
    Icosahedron { detail: u32 },
    /// Sphere, drawn as a disc.
    Sphere,
}

/// Template shape shared by every instance that uses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryDesc {
    pub kind: GeometryKind,
    /// Radius in world units.
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    Additive,
}

impl Blending {
    /// Canvas `globalCompositeOperation` value.
    pub fn composite_operation(self) -> &'static str {
        match self {
            Blending::Additive => "lighter",
        }
    }
}

/// Colour and compositing state for drawn instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    pub color: Rgb,
    pub opacity: f32,
    pub blending: Blending,
}

impl MaterialDesc {
    /// Copy of this material carrying its own colour.
    pub fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }
}

/// A drawing target bound to the host container.
pub trait RenderSurface {
    fn create_geometry(&mut self, desc: &GeometryDesc) -> Result<GeometryId, EngineError>;

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, EngineError>;

    fn release_geometry(&mut self, id: GeometryId);

    fn release_material(&mut self, id: MaterialId);

    /// Match the backing store to a (non-degenerate) viewport.
    fn resize(&mut self, viewport: Viewport);

    fn draw(&mut self, frame: &Frame) -> Result<(), EngineError>;

    /// Whether the surface element is still in the container.
    fn is_attached(&self) -> bool;

    /// Remove the surface element from the container.
    fn detach(&mut self);
}

/// Id-indexed storage with slot reuse.
#[derive(Debug, Clone)]
pub struct ResourceSlots<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> ResourceSlots<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a value and return its slot.
    pub fn insert(&mut self, value: T) -> u32 {
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(value);
                slot
            }
            None => {
                self.slots.push(Some(value));
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Remove a value. Returns it if the slot was occupied.
    pub fn remove(&mut self, slot: u32) -> Option<T> {
        let value = self.slots.get_mut(slot as usize)?.take()?;
        self.free.push(slot);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, slot: u32) -> Option<&T> {
        self.slots.get(slot as usize)?.as_ref()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T> Default for ResourceSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}
