//! Perspective camera looking down −z at the node cloud.

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::interaction::Viewport;

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 75.0;
/// Distance of the camera from the origin along +z.
pub const CAMERA_DISTANCE: f32 = 25.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// A world point projected to CSS pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen position, origin top-left.
    pub screen: Vec2,
    /// Pixels covered by one world unit at this depth.
    pub pixels_per_unit: f32,
}

/// Pinhole camera with a mutable aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y: f32,
    pub aspect: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    /// Cached `1 / tan(fov_y / 2)`.
    focal: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, distance: f32) -> Self {
        let fov_y = fov_y_degrees.to_radians();
        Self {
            fov_y,
            aspect,
            distance,
            near: NEAR,
            far: FAR,
            focal: 1.0 / (fov_y * 0.5).tan(),
        }
    }

    /// Update the aspect ratio. Degenerate viewports leave it unchanged.
    ///
    /// Returns whether the viewport was accepted.
    pub fn fit(&mut self, viewport: Viewport) -> bool {
        match viewport.aspect() {
            Some(aspect) => {
                self.aspect = aspect;
                true
            }
            None => false,
        }
    }

    /// Rotation applied to the whole cloud before viewing (Euler XYZ).
    pub fn cloud_rotation(rotation: Vec3) -> Quat {
        Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
    }

    /// Project a point already in world space. Points outside the
    /// near/far range yield `None`.
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<Projected> {
        if viewport.is_degenerate() {
            return None;
        }
        let depth = self.distance - world.z;
        if depth <= self.near || depth > self.far {
            return None;
        }

        let ndc = Vec2::new(
            self.focal / self.aspect * world.x / depth,
            self.focal * world.y / depth,
        );
        let half = viewport.half();
        Some(Projected {
            screen: Vec2::new((ndc.x + 1.0) * half.x, (1.0 - ndc.y) * half.y),
            pixels_per_unit: self.focal * half.y / depth,
        })
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(FOV_Y_DEGREES, 1.0, CAMERA_DISTANCE)
    }
}
