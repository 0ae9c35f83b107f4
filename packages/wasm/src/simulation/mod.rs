//! Per-tick simulation of the network.
//!
//! One tick runs three stages in a fixed order:
//! 1. [`PhysicsStepper`] moves nodes and reflects them off the bounds
//! 2. [`ProximityGraph`] rebuilds the edge set from scratch
//! 3. [`PacketRouter`] advances packets along the fresh positions

pub mod physics;
pub mod proximity;
pub mod router;

use rand::Rng;

use crate::config::EngineConfig;
use crate::network::SpatialStore;

pub use physics::PhysicsStepper;
pub use proximity::ProximityGraph;
pub use router::{PacketRouter, RouteStats};

/// Simulation time added per tick.
pub const TIME_STEP: f32 = 0.01;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub edges: usize,
    pub routes: RouteStats,
}

/// Owns the network state and the stages that advance it.
pub struct Simulation<R: Rng> {
    store: SpatialStore,
    physics: PhysicsStepper,
    graph: ProximityGraph,
    router: PacketRouter,
    rng: R,
    time: f32,
    ticks: u64,
}

impl<R: Rng> Simulation<R> {
    /// Populate a fresh network from `config`.
    pub fn new(config: &EngineConfig, mut rng: R) -> Self {
        let store = SpatialStore::populate(config, &mut rng);
        Self::from_store(store, config, rng)
    }

    /// Wrap an existing store.
    pub fn from_store(store: SpatialStore, config: &EngineConfig, rng: R) -> Self {
        let graph = ProximityGraph::new(store.node_count(), config.connection_threshold);
        Self {
            store,
            physics: PhysicsStepper::new(config.bounds),
            graph,
            router: PacketRouter::new(config.traversal_threshold),
            rng,
            time: 0.0,
            ticks: 0,
        }
    }

    /// Run one tick.
    pub fn step(&mut self) -> TickStats {
        self.time += TIME_STEP;
        self.ticks += 1;

        self.physics.step(&mut self.store, self.time);
        let edges = self.graph.rebuild(&self.store);
        let routes = self.router.step(&mut self.store, &mut self.rng);

        TickStats { edges, routes }
    }

    pub fn store(&self) -> &SpatialStore {
        &self.store
    }

    pub fn graph(&self) -> &ProximityGraph {
        &self.graph
    }

    /// Simulation time in seconds-like units (0.01 per tick).
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_step_advances_clock() {
        let config = EngineConfig::default();
        let mut sim = Simulation::new(&config, StdRng::seed_from_u64(1));

        assert_eq!(sim.ticks(), 0);
        sim.step();
        sim.step();
        assert_eq!(sim.ticks(), 2);
        assert!((sim.time() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_edges_track_current_positions() {
        let config = EngineConfig::default();
        let mut sim = Simulation::new(&config, StdRng::seed_from_u64(2));

        for _ in 0..200 {
            let stats = sim.step();
            assert_eq!(stats.edges, sim.graph().edge_count());

            let store = sim.store();
            for a in store.node_ids() {
                for b in store.node_ids().filter(|&b| b > a) {
                    let close = store.distance(a, b) < config.connection_threshold;
                    assert_eq!(sim.graph().contains(a, b), close, "{a} {b}");
                }
            }
        }
    }

    #[test]
    fn test_population_is_fixed() {
        let config = EngineConfig {
            node_count: 7,
            particle_count: 3,
            ..EngineConfig::default()
        };
        let mut sim = Simulation::new(&config, StdRng::seed_from_u64(3));
        for _ in 0..50 {
            sim.step();
        }
        assert_eq!(sim.store().node_count(), 7);
        assert_eq!(sim.store().particle_count(), 3);
        assert!(
            sim.store()
                .particles()
                .iter()
                .all(|p| p.current < NodeId(7) && p.target < NodeId(7))
        );
    }
}
