//! Distance-threshold proximity graph.
//!
//! The graph topology lives in a petgraph `StableGraph` whose node slots
//! mirror the store's node ids. Every rebuild drops all edges and retests
//! every unordered pair, so an edge exists exactly when its endpoints are
//! closer than the threshold at that tick.

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::network::{Edge, Link, NodeId, SpatialStore};

/// Edge set recomputed from pairwise distances each tick.
pub struct ProximityGraph {
    /// Nodes store their NodeId, edges store the link built this tick.
    graph: StableUnGraph<NodeId, Link>,

    threshold: f32,
}

impl ProximityGraph {
    /// Create a graph over `node_count` nodes with no edges.
    pub fn new(node_count: usize, threshold: f32) -> Self {
        let mut graph = StableUnGraph::with_capacity(node_count, node_count * 2);
        for i in 0..node_count {
            graph.add_node(NodeId(i as u32));
        }
        Self { graph, threshold }
    }

    /// Discard the previous edge set and rebuild it from `store`.
    ///
    /// Tests all n·(n−1)/2 pairs. Returns the new edge count.
    pub fn rebuild(&mut self, store: &SpatialStore) -> usize {
        self.graph.clear_edges();

        let n = store.node_count().min(self.graph.node_count());
        for i in 0..n {
            let a = NodeId(i as u32);
            let pa = store.position(a);
            let color = store.color(a);
            for j in (i + 1)..n {
                let distance = pa.distance(store.position(NodeId(j as u32)));
                if distance < self.threshold {
                    self.graph.add_edge(
                        NodeIndex::new(i),
                        NodeIndex::new(j),
                        Link::new(distance, self.threshold, color),
                    );
                }
            }
        }

        self.graph.edge_count()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over the current edges, lower endpoint first.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|edge| {
            let source = self.graph[edge.source()];
            let target = self.graph[edge.target()];
            Edge {
                a: source.min(target),
                b: source.max(target),
                link: *edge.weight(),
            }
        })
    }

    /// Whether `a` and `b` are connected this tick.
    pub fn contains(&self, a: NodeId, b: NodeId) -> bool {
        self.graph
            .find_edge(NodeIndex::new(a.index()), NodeIndex::new(b.index()))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::network::{ColorClass, EDGE_MAX_OPACITY};
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    fn line_store(xs: &[f32]) -> SpatialStore {
        let mut store = SpatialStore::with_capacity(xs.len(), 0);
        for (i, &x) in xs.iter().enumerate() {
            let color = if i % 2 == 0 { ColorClass::Cyan } else { ColorClass::Blue };
            store.push_node(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, 0.0, color);
        }
        store
    }

    fn brute_force(store: &SpatialStore, threshold: f32) -> BTreeSet<(NodeId, NodeId)> {
        let mut expected = BTreeSet::new();
        for a in store.node_ids() {
            for b in store.node_ids() {
                if a < b && store.distance(a, b) < threshold {
                    expected.insert((a, b));
                }
            }
        }
        expected
    }

    #[test]
    fn test_threshold_is_strict() {
        let store = line_store(&[0.0, 12.0, 11.9]);
        let mut graph = ProximityGraph::new(3, 12.0);

        graph.rebuild(&store);

        assert!(!graph.contains(NodeId(0), NodeId(1)));
        assert!(graph.contains(NodeId(0), NodeId(2)));
        assert!(graph.contains(NodeId(1), NodeId(2)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edge_color_from_lower_index() {
        let store = line_store(&[0.0, 3.0]);
        let mut graph = ProximityGraph::new(2, 12.0);
        graph.rebuild(&store);

        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].a, NodeId(0));
        assert_eq!(edges[0].b, NodeId(1));
        assert_eq!(edges[0].link.color, ColorClass::Cyan);
        assert!((edges[0].link.distance - 3.0).abs() < 1e-6);
        assert!((edges[0].link.opacity - 0.75 * EDGE_MAX_OPACITY).abs() < 1e-6);
    }

    #[test]
    fn test_stale_edges_are_dropped() {
        let mut store = line_store(&[0.0, 5.0]);
        let mut graph = ProximityGraph::new(2, 12.0);
        assert_eq!(graph.rebuild(&store), 1);

        // Drift apart beyond the threshold.
        store = line_store(&[0.0, 20.0]);
        assert_eq!(graph.rebuild(&store), 0);
        assert!(!graph.contains(NodeId(0), NodeId(1)));
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn test_matches_brute_force_on_random_cloud() {
        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let store = SpatialStore::populate(&config, &mut rng);
        let mut graph = ProximityGraph::new(store.node_count(), config.connection_threshold);

        graph.rebuild(&store);

        let actual: BTreeSet<_> = graph.edges().map(|e| (e.a, e.b)).collect();
        assert_eq!(actual, brute_force(&store, config.connection_threshold));
        assert_eq!(actual.len(), graph.edge_count());
    }
}
