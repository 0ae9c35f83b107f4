//! SpatialStore - node and packet state.
//!
//! Node state is kept in SoA (Structure of Arrays) buffers so the positions
//! can be handed to JavaScript as zero-copy `Float32Array` views and walked
//! linearly by the physics stepper and the pairwise graph builder.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::node::{ColorClass, NodeId};
use super::particle::Particle;
use crate::config::{EngineConfig, SpawnBox};

/// Largest absolute value of a spawned velocity component.
pub const MAX_INITIAL_SPEED: f32 = 0.005;

/// Holds every node and packet of a mounted engine.
///
/// The population is fixed at construction. Only the simulation stages
/// mutate it, once per tick.
pub struct SpatialStore {
    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Z positions (SoA layout)
    pos_z: Vec<f32>,

    /// X velocities (SoA layout)
    vel_x: Vec<f32>,

    /// Y velocities (SoA layout)
    vel_y: Vec<f32>,

    /// Z velocities (SoA layout)
    vel_z: Vec<f32>,

    /// Per-node glow phase offsets in radians
    pulse_phase: Vec<f32>,

    /// Per-node glow scale computed by the last physics step
    pulse_scale: Vec<f32>,

    /// Per-node colour class
    colors: Vec<ColorClass>,

    particles: Vec<Particle>,
}

impl SpatialStore {
    /// Create an empty store with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, particle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            pos_z: Vec::with_capacity(node_capacity),
            vel_x: Vec::with_capacity(node_capacity),
            vel_y: Vec::with_capacity(node_capacity),
            vel_z: Vec::with_capacity(node_capacity),
            pulse_phase: Vec::with_capacity(node_capacity),
            pulse_scale: Vec::with_capacity(node_capacity),
            colors: Vec::with_capacity(node_capacity),
            particles: Vec::with_capacity(particle_capacity),
        }
    }

    /// Populate a store with a random cloud sized by `config`.
    pub fn populate<R: Rng + ?Sized>(config: &EngineConfig, rng: &mut R) -> Self {
        let mut store = Self::with_capacity(config.node_count, config.particle_count);

        for _ in 0..config.node_count {
            let position = random_in_box(rng, &config.spawn);
            let velocity = Vec3::new(
                rng.gen_range(-MAX_INITIAL_SPEED..MAX_INITIAL_SPEED),
                rng.gen_range(-MAX_INITIAL_SPEED..MAX_INITIAL_SPEED),
                rng.gen_range(-MAX_INITIAL_SPEED..MAX_INITIAL_SPEED),
            );
            let phase = rng.gen_range(0.0..TAU);
            let color = if rng.gen_bool(ColorClass::CYAN_PROBABILITY) {
                ColorClass::Cyan
            } else {
                ColorClass::Blue
            };
            store.push_node(position, velocity, phase, color);
        }

        if config.node_count > 0 {
            for _ in 0..config.particle_count {
                let mut particle = Particle::random(rng, config.node_count);
                particle.position = store.position(particle.current);
                store.push_particle(particle);
            }
        }

        store
    }

    /// Append a node. Returns its id.
    pub(crate) fn push_node(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        pulse_phase: f32,
        color: ColorClass,
    ) -> NodeId {
        let id = NodeId(self.pos_x.len() as u32);
        self.pos_x.push(position.x);
        self.pos_y.push(position.y);
        self.pos_z.push(position.z);
        self.vel_x.push(velocity.x);
        self.vel_y.push(velocity.y);
        self.vel_z.push(velocity.z);
        self.pulse_phase.push(pulse_phase);
        self.pulse_scale.push(1.0);
        self.colors.push(color);
        id
    }

    /// Append a packet.
    pub(crate) fn push_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Get the number of packets.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Get a node's position.
    #[inline]
    pub fn position(&self, id: NodeId) -> Vec3 {
        let i = id.index();
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Get a node's velocity.
    #[inline]
    pub fn velocity(&self, id: NodeId) -> Vec3 {
        let i = id.index();
        Vec3::new(self.vel_x[i], self.vel_y[i], self.vel_z[i])
    }

    /// Get a node's colour class.
    #[inline]
    pub fn color(&self, id: NodeId) -> ColorClass {
        self.colors[id.index()]
    }

    /// Glow scale computed by the last physics step.
    #[inline]
    pub fn pulse_scale(&self, id: NodeId) -> f32 {
        self.pulse_scale[id.index()]
    }

    /// Iterate over all node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.pos_x.len() as u32).map(NodeId)
    }

    /// Distance between two nodes.
    #[inline]
    pub fn distance(&self, a: NodeId, b: NodeId) -> f32 {
        self.position(a).distance(self.position(b))
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get Z positions slice.
    pub fn positions_z(&self) -> &[f32] {
        &self.pos_z
    }

    /// Mutable node kinematics for the physics stepper.
    pub(crate) fn kinematics_mut(&mut self) -> Kinematics<'_> {
        Kinematics {
            pos: [
                self.pos_x.as_mut_slice(),
                self.pos_y.as_mut_slice(),
                self.pos_z.as_mut_slice(),
            ],
            vel: [
                self.vel_x.as_mut_slice(),
                self.vel_y.as_mut_slice(),
                self.vel_z.as_mut_slice(),
            ],
            pulse_phase: &self.pulse_phase,
            pulse_scale: self.pulse_scale.as_mut_slice(),
        }
    }

    // =========================================================================
    // Packet Access
    // =========================================================================

    /// Get the packets.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Split borrow: packets mutably, node positions read-only.
    pub(crate) fn particles_mut(&mut self) -> (&mut [Particle], NodePositions<'_>) {
        (
            &mut self.particles,
            NodePositions {
                x: &self.pos_x,
                y: &self.pos_y,
                z: &self.pos_z,
            },
        )
    }
}

/// Mutable view of node motion, one slice per axis.
pub(crate) struct Kinematics<'a> {
    pub pos: [&'a mut [f32]; 3],
    pub vel: [&'a mut [f32]; 3],
    pub pulse_phase: &'a [f32],
    pub pulse_scale: &'a mut [f32],
}

/// Read-only node positions, borrowed alongside the packet slice.
pub(crate) struct NodePositions<'a> {
    x: &'a [f32],
    y: &'a [f32],
    z: &'a [f32],
}

impl NodePositions<'_> {
    #[inline]
    pub fn get(&self, id: NodeId) -> Vec3 {
        let i = id.index();
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn random_in_box<R: Rng + ?Sized>(rng: &mut R, spawn: &SpawnBox) -> Vec3 {
    Vec3::new(
        rng.gen_range(-0.5..0.5) * spawn.x,
        rng.gen_range(-0.5..0.5) * spawn.y,
        rng.gen_range(-0.5..0.5) * spawn.z,
    )
}
