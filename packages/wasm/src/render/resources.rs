//! Geometry templates and per-instance materials.
//!
//! Three geometries and four material templates are shared. Every node gets
//! its own core and glow material and every packet its own material, each
//! cloned from a template with an owned colour, so recolouring one instance
//! never touches another. All allocations go through a ledger and are
//! released in reverse order on teardown.

use tracing::debug;

use super::surface::{
    Blending, GeometryDesc, GeometryId, GeometryKind, MaterialDesc, MaterialId, RenderSurface,
};
use crate::error::EngineError;
use crate::network::{NodeId, Rgb, SpatialStore};

pub const CORE_RADIUS: f32 = 0.2;
pub const GLOW_RADIUS: f32 = 0.5;
pub const PACKET_RADIUS: f32 = 0.06;

const CORE_GEOMETRY: GeometryDesc = GeometryDesc {
    kind: GeometryKind::Icosahedron { detail: 0 },
    radius: CORE_RADIUS,
};

const GLOW_GEOMETRY: GeometryDesc = GeometryDesc {
    kind: GeometryKind::Icosahedron { detail: 1 },
    radius: GLOW_RADIUS,
};

const PACKET_GEOMETRY: GeometryDesc = GeometryDesc {
    kind: GeometryKind::Sphere,
    radius: PACKET_RADIUS,
};

const CYAN: Rgb = Rgb::from_hex(0x0fb6d4);

const CORE_MATERIAL: MaterialDesc = MaterialDesc {
    color: CYAN,
    opacity: 0.9,
    blending: Blending::Additive,
};

const GLOW_MATERIAL: MaterialDesc = MaterialDesc {
    color: CYAN,
    opacity: 0.2,
    blending: Blending::Additive,
};

const CONNECTION_MATERIAL: MaterialDesc = MaterialDesc {
    color: CYAN,
    opacity: 0.12,
    blending: Blending::Additive,
};

const PACKET_MATERIAL: MaterialDesc = MaterialDesc {
    color: Rgb::WHITE,
    opacity: 0.9,
    blending: Blending::Additive,
};

/// Every id allocated on a surface, in allocation order.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    geometries: Vec<GeometryId>,
    materials: Vec<MaterialId>,
}

impl ResourceLedger {
    fn geometry<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        desc: &GeometryDesc,
    ) -> Result<GeometryId, EngineError> {
        let id = surface.create_geometry(desc)?;
        self.geometries.push(id);
        Ok(id)
    }

    fn material<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        desc: &MaterialDesc,
    ) -> Result<MaterialId, EngineError> {
        let id = surface.create_material(desc)?;
        self.materials.push(id);
        Ok(id)
    }

    /// Number of live allocations tracked.
    pub fn len(&self) -> usize {
        self.geometries.len() + self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.materials.is_empty()
    }

    /// Release everything, materials newest first, then geometries.
    pub fn release<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let released = self.len();
        while let Some(id) = self.materials.pop() {
            surface.release_material(id);
        }
        while let Some(id) = self.geometries.pop() {
            surface.release_geometry(id);
        }
        released
    }
}

/// Materials owned by one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMaterials {
    pub core: MaterialId,
    pub glow: MaterialId,
}

/// All rendering resources of a mounted engine.
#[derive(Debug)]
pub struct SceneResources {
    pub core_geometry: GeometryId,
    pub glow_geometry: GeometryId,
    pub packet_geometry: GeometryId,
    pub connection_material: MaterialId,
    node_materials: Vec<NodeMaterials>,
    packet_materials: Vec<MaterialId>,
    ledger: ResourceLedger,
}

impl SceneResources {
    /// Allocate templates and per-instance clones for `store`.
    ///
    /// On failure everything allocated so far is released before returning.
    pub fn allocate<S: RenderSurface + ?Sized>(
        surface: &mut S,
        store: &SpatialStore,
    ) -> Result<Self, EngineError> {
        let mut ledger = ResourceLedger::default();
        match Self::allocate_into(surface, store, &mut ledger) {
            Ok(resources) => Ok(resources),
            Err(err) => {
                ledger.release(surface);
                Err(err)
            }
        }
    }

    fn allocate_into<S: RenderSurface + ?Sized>(
        surface: &mut S,
        store: &SpatialStore,
        ledger: &mut ResourceLedger,
    ) -> Result<Self, EngineError> {
        let core_geometry = ledger.geometry(surface, &CORE_GEOMETRY)?;
        let glow_geometry = ledger.geometry(surface, &GLOW_GEOMETRY)?;
        let packet_geometry = ledger.geometry(surface, &PACKET_GEOMETRY)?;

        ledger.material(surface, &CORE_MATERIAL)?;
        ledger.material(surface, &GLOW_MATERIAL)?;
        let connection_material = ledger.material(surface, &CONNECTION_MATERIAL)?;
        ledger.material(surface, &PACKET_MATERIAL)?;

        let mut node_materials = Vec::with_capacity(store.node_count());
        for id in store.node_ids() {
            let color = store.color(id).rgb();
            node_materials.push(NodeMaterials {
                core: ledger.material(surface, &CORE_MATERIAL.with_color(color))?,
                glow: ledger.material(surface, &GLOW_MATERIAL.with_color(color))?,
            });
        }

        let mut packet_materials = Vec::with_capacity(store.particle_count());
        for _ in store.particles() {
            packet_materials.push(ledger.material(surface, &PACKET_MATERIAL)?);
        }

        debug!(
            geometries = ledger.geometries.len(),
            materials = ledger.materials.len(),
            "allocated scene resources"
        );

        Ok(Self {
            core_geometry,
            glow_geometry,
            packet_geometry,
            connection_material,
            node_materials,
            packet_materials,
            ledger: std::mem::take(ledger),
        })
    }

    /// Radius of a geometry template in world units.
    pub fn radius(&self, geometry: GeometryId) -> f32 {
        if geometry == self.core_geometry {
            CORE_GEOMETRY.radius
        } else if geometry == self.glow_geometry {
            GLOW_GEOMETRY.radius
        } else {
            PACKET_GEOMETRY.radius
        }
    }

    pub fn node_materials(&self, id: NodeId) -> Option<NodeMaterials> {
        self.node_materials.get(id.index()).copied()
    }

    pub fn packet_material(&self, index: usize) -> Option<MaterialId> {
        self.packet_materials.get(index).copied()
    }

    /// Live allocation count.
    pub fn allocation_count(&self) -> usize {
        self.ledger.len()
    }

    /// Release every allocation on `surface`. Returns how many were released.
    pub fn release<S: RenderSurface + ?Sized>(mut self, surface: &mut S) -> usize {
        self.node_materials.clear();
        self.packet_materials.clear();
        let released = self.ledger.release(surface);
        debug!(released, "released scene resources");
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::RecordingSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store() -> SpatialStore {
        let config = EngineConfig {
            node_count: 5,
            particle_count: 3,
            ..EngineConfig::default()
        };
        SpatialStore::populate(&config, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_allocates_templates_and_clones() {
        let store = store();
        let mut surface = RecordingSurface::new();

        let resources = SceneResources::allocate(&mut surface, &store).unwrap();

        assert_eq!(surface.live_geometries(), 3);
        // 4 templates + 2 per node + 1 per packet
        assert_eq!(surface.live_materials(), 4 + 5 * 2 + 3);
        assert_eq!(resources.allocation_count(), 3 + 4 + 13);
    }

    #[test]
    fn test_clones_carry_node_color() {
        let store = store();
        let mut surface = RecordingSurface::new();
        let resources = SceneResources::allocate(&mut surface, &store).unwrap();

        for id in store.node_ids() {
            let materials = resources.node_materials(id).unwrap();
            assert_ne!(materials.core, materials.glow);
            let core = surface.material(materials.core).unwrap();
            let glow = surface.material(materials.glow).unwrap();
            assert_eq!(core.color, store.color(id).rgb());
            assert_eq!(glow.color, store.color(id).rgb());
            assert_eq!(glow.opacity, 0.2);
        }
        assert!(resources.packet_material(2).is_some());
        assert!(resources.packet_material(3).is_none());
    }

    #[test]
    fn test_release_frees_everything() {
        let store = store();
        let mut surface = RecordingSurface::new();
        let resources = SceneResources::allocate(&mut surface, &store).unwrap();
        let allocated = resources.allocation_count();

        let released = resources.release(&mut surface);

        assert_eq!(released, allocated);
        assert_eq!(surface.live_geometries(), 0);
        assert_eq!(surface.live_materials(), 0);
    }

    #[test]
    fn test_partial_failure_rolls_back() {
        let store = store();
        let mut surface = RecordingSurface::new();
        surface.fail_after(6);

        let result = SceneResources::allocate(&mut surface, &store);

        assert!(result.is_err());
        assert_eq!(surface.live_geometries(), 0);
        assert_eq!(surface.live_materials(), 0);
    }

    #[test]
    fn test_radius_lookup() {
        let store = store();
        let mut surface = RecordingSurface::new();
        let resources = SceneResources::allocate(&mut surface, &store).unwrap();

        assert_eq!(resources.radius(resources.core_geometry), CORE_RADIUS);
        assert_eq!(resources.radius(resources.glow_geometry), GLOW_RADIUS);
        assert_eq!(resources.radius(resources.packet_geometry), PACKET_RADIUS);
    }
}
