//! Per-tick display list.
//!
//! A [`Frame`] is rebuilt from the simulation every tick: one segment per
//! proximity edge and one sprite per glow, core and packet. Buffers are kept
//! between ticks so steady-state rebuilding does not allocate.

use glam::{Quat, Vec2, Vec3};

use super::camera::PerspectiveCamera;
use super::resources::SceneResources;
use super::surface::{GeometryId, MaterialId};
use crate::interaction::Viewport;
use crate::network::Rgb;
use crate::simulation::Simulation;

/// A connection line between two projected nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub material: MaterialId,
    pub from: Vec2,
    pub to: Vec2,
    pub color: Rgb,
    pub opacity: f32,
}

/// A projected instance of a template geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub center: Vec2,
    /// Radius in CSS pixels.
    pub radius: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub viewport: Viewport,
    pub segments: Vec<Segment>,
    pub sprites: Vec<Sprite>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.sprites.clear();
    }

    /// Rebuild from the current simulation state.
    pub fn build<R: rand::Rng>(
        &mut self,
        simulation: &Simulation<R>,
        resources: &SceneResources,
        camera: &PerspectiveCamera,
        rotation: Vec3,
        viewport: Viewport,
    ) {
        self.clear();
        self.viewport = viewport;
        if viewport.is_degenerate() {
            return;
        }

        let cloud = PerspectiveCamera::cloud_rotation(rotation);
        let store = simulation.store();
        let project = |local: Vec3| camera.project(rotate(cloud, local), viewport);

        for edge in simulation.graph().edges() {
            let (Some(a), Some(b)) = (
                project(store.position(edge.a)),
                project(store.position(edge.b)),
            ) else {
                continue;
            };
            self.segments.push(Segment {
                material: resources.connection_material,
                from: a.screen,
                to: b.screen,
                color: edge.link.color.rgb(),
                opacity: edge.link.opacity,
            });
        }

        for id in store.node_ids() {
            let (Some(materials), Some(p)) =
                (resources.node_materials(id), project(store.position(id)))
            else {
                continue;
            };
            let glow = resources.glow_geometry;
            let core = resources.core_geometry;
            self.sprites.push(Sprite {
                geometry: glow,
                material: materials.glow,
                center: p.screen,
                radius: resources.radius(glow) * store.pulse_scale(id) * p.pixels_per_unit,
            });
            self.sprites.push(Sprite {
                geometry: core,
                material: materials.core,
                center: p.screen,
                radius: resources.radius(core) * p.pixels_per_unit,
            });
        }

        let packet = resources.packet_geometry;
        for (index, particle) in store.particles().iter().enumerate() {
            let (Some(material), Some(p)) =
                (resources.packet_material(index), project(particle.position))
            else {
                continue;
            };
            self.sprites.push(Sprite {
                geometry: packet,
                material,
                center: p.screen,
                radius: resources.radius(packet) * p.pixels_per_unit,
            });
        }
    }
}

#[inline]
fn rotate(rotation: Quat, local: Vec3) -> Vec3 {
    rotation * local
}
