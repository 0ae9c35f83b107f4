//! Projection, resources and drawing.
//!
//! - `camera`: perspective projection of the rotated node cloud
//! - `resources`: geometry/material templates and per-instance clones
//! - `frame`: the per-tick display list
//! - `surface`: the drawing target trait
//! - `canvas`: Canvas 2D implementation

pub mod camera;
pub mod canvas;
pub mod frame;
pub mod resources;
pub mod surface;

pub use camera::{PerspectiveCamera, Projected};
pub use frame::{Frame, Segment, Sprite};
pub use resources::{NodeMaterials, SceneResources};
pub use surface::{
    Blending, GeometryDesc, GeometryId, GeometryKind, MaterialDesc, MaterialId, RenderSurface,
    ResourceSlots,
};
