//! Packet routing along the proximity graph.
//!
//! Each tick a packet does exactly one of:
//! - **retarget**: current and target coincide, so draw a new target and stay put
//! - **abandon**: the hop endpoints drifted beyond the traversal threshold, so
//!   re-anchor on a random node and restart the hop
//! - **advance**: move `progress` forward and, on reaching the target, hop
//!   onto it and draw the next target
//!
//! Targets are drawn uniformly over all nodes, so a self-loop can be drawn
//! again; it is resolved on the following tick.

use rand::Rng;

use crate::network::{NodePositions, Particle, SpatialStore, random_node};

/// What a packet did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStep {
    Retargeted,
    Abandoned,
    Advanced,
    Hopped,
}

/// Per-tick tally of packet transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    pub retargeted: usize,
    pub abandoned: usize,
    pub advanced: usize,
    pub hopped: usize,
}

impl RouteStats {
    fn record(&mut self, step: RouteStep) {
        match step {
            RouteStep::Retargeted => self.retargeted += 1,
            RouteStep::Abandoned => self.abandoned += 1,
            RouteStep::Advanced => self.advanced += 1,
            RouteStep::Hopped => self.hopped += 1,
        }
    }
}

/// Advances packets between nodes.
#[derive(Debug, Clone, Copy)]
pub struct PacketRouter {
    traversal_threshold: f32,
}

impl PacketRouter {
    pub fn new(traversal_threshold: f32) -> Self {
        Self {
            traversal_threshold,
        }
    }

    /// Route every packet in `store` for one tick.
    pub fn step<R: Rng + ?Sized>(&self, store: &mut SpatialStore, rng: &mut R) -> RouteStats {
        let mut stats = RouteStats::default();
        let (particles, nodes) = store.particles_mut();
        if nodes.is_empty() {
            return stats;
        }
        for particle in particles.iter_mut() {
            stats.record(self.route(particle, &nodes, rng));
        }
        stats
    }

    fn route<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        nodes: &NodePositions<'_>,
        rng: &mut R,
    ) -> RouteStep {
        let node_count = nodes.len();

        if particle.is_parked() {
            particle.target = random_node(rng, node_count);
            return RouteStep::Retargeted;
        }

        let from = nodes.get(particle.current);
        let to = nodes.get(particle.target);
        if from.distance(to) > self.traversal_threshold {
            particle.current = random_node(rng, node_count);
            particle.progress = 0.0;
            return RouteStep::Abandoned;
        }

        particle.progress += particle.speed;
        let step = if particle.progress >= 1.0 {
            particle.progress = 0.0;
            particle.current = particle.target;
            particle.target = random_node(rng, node_count);
            RouteStep::Hopped
        } else {
            RouteStep::Advanced
        };

        // A completed hop re-anchors on the new current node.
        particle.position = nodes
            .get(particle.current)
            .lerp(nodes.get(particle.target), particle.progress);
        step
    }
}
