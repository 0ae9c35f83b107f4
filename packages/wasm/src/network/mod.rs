//! Network data structures.
//!
//! Nodes live in SoA buffers inside [`SpatialStore`]; packets ride between
//! them; edges are derived each tick and never stored beyond it.

mod edge;
mod node;
mod particle;
mod store;

pub use edge::{EDGE_MAX_OPACITY, Edge, Link};
pub use node::{ColorClass, NodeId, Rgb};
pub use particle::{MAX_SPEED, MIN_SPEED, Particle, random_node};
pub use store::{MAX_INITIAL_SPEED, SpatialStore};
pub(crate) use store::{Kinematics, NodePositions};
