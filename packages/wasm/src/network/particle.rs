//! Packets travelling along the proximity graph.

use glam::Vec3;
use rand::Rng;

use super::node::NodeId;

/// Lower bound of the per-tick progress increment.
pub const MIN_SPEED: f32 = 0.005;
/// Upper bound (exclusive) of the per-tick progress increment.
pub const MAX_SPEED: f32 = 0.015;

/// A packet hopping from `current` toward `target`.
///
/// `progress` stays in `[0, 1)` between ticks; `position` is the
/// interpolation between the two nodes at `progress`, refreshed by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub current: NodeId,
    pub target: NodeId,
    pub progress: f32,
    pub speed: f32,
    pub position: Vec3,
}

impl Particle {
    /// Create a particle at rest on `current`.
    pub fn new(current: NodeId, target: NodeId, speed: f32) -> Self {
        Self {
            current,
            target,
            progress: 0.0,
            speed,
            position: Vec3::ZERO,
        }
    }

    /// Spawn a particle with uniformly random endpoints over `node_count` nodes.
    ///
    /// `node_count` must be non-zero.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, node_count: usize) -> Self {
        let current = random_node(rng, node_count);
        let target = random_node(rng, node_count);
        Self::new(current, target, rng.gen_range(MIN_SPEED..MAX_SPEED))
    }

    /// Whether the particle sits on a self-loop and needs a new target.
    #[inline]
    pub fn is_parked(&self) -> bool {
        self.current == self.target
    }
}

/// Uniformly sample a node id. Coincidences with any other id are allowed.
#[inline]
pub fn random_node<R: Rng + ?Sized>(rng: &mut R, node_count: usize) -> NodeId {
    NodeId(rng.gen_range(0..node_count) as u32)
}
