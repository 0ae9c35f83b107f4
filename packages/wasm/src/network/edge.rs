//! Edge type and related structures.
//!
//! Edges are derived, never stored across ticks. Each edge carries:
//! - Its two endpoints, lower index first
//! - The endpoint distance at the tick it was built
//! - A distance-faded opacity and the lower endpoint's colour

use super::node::{ColorClass, NodeId};

/// Peak edge opacity, reached as distance approaches zero.
pub const EDGE_MAX_OPACITY: f32 = 0.15;

/// Weight stored on a proximity graph edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub distance: f32,
    pub opacity: f32,
    pub color: ColorClass,
}

impl Link {
    /// Build the link for two nodes `distance` apart under `threshold`.
    ///
    /// Opacity fades linearly from [`EDGE_MAX_OPACITY`] at distance 0 to 0 at
    /// the threshold.
    pub fn new(distance: f32, threshold: f32, color: ColorClass) -> Self {
        Self {
            distance,
            opacity: (1.0 - distance / threshold) * EDGE_MAX_OPACITY,
            color,
        }
    }
}

/// An edge of the proximity graph as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Lower-indexed endpoint.
    pub a: NodeId,
    /// Higher-indexed endpoint.
    pub b: NodeId,
    pub link: Link,
}
