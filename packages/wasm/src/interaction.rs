//! Pointer parallax and viewport tracking.
//!
//! Event handlers only write [`InteractionState`]; the tick reads it at its
//! start and eases the cloud rotation toward the pointer target.

use glam::{Vec2, Vec3};

/// Pointer offset per CSS pixel from the viewport centre.
pub const POINTER_SENSITIVITY: f32 = 0.0005;
/// Fraction of the pointer offset used as the rotation target.
pub const PARALLAX_GAIN: f32 = 0.5;
/// Exponential smoothing factor applied each tick.
pub const SMOOTHING: f32 = 0.02;
/// Autonomous spin about the y axis, radians per tick.
pub const AUTO_SPIN: f32 = 0.0003;

/// Size of the render region in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area cannot be projected onto.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` when degenerate.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }

    /// Half of each dimension.
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * 0.5
    }
}

/// Pointer target and eased rotation of the node cloud.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    pointer_offset: Vec2,
    rotation: Vec3,
    center: Vec2,
}

impl InteractionState {
    /// Fresh state centred on `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            center: viewport.half(),
            ..Self::default()
        }
    }

    /// Record a pointer position in client coordinates.
    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        self.pointer_offset =
            (Vec2::new(client_x, client_y) - self.center) * POINTER_SENSITIVITY;
    }

    /// Re-centre on a resized viewport. Degenerate sizes are ignored.
    ///
    /// Returns the new aspect ratio when the viewport was accepted.
    pub fn resized(&mut self, viewport: Viewport) -> Option<f32> {
        let aspect = viewport.aspect()?;
        self.center = viewport.half();
        Some(aspect)
    }

    /// Ease the rotation one tick toward the pointer target.
    pub fn advance(&mut self) -> Vec3 {
        self.rotation.y += AUTO_SPIN;
        self.rotation.x += (self.pointer_offset.y * PARALLAX_GAIN - self.rotation.x) * SMOOTHING;
        self.rotation.y += (self.pointer_offset.x * PARALLAX_GAIN - self.rotation.y) * SMOOTHING;
        self.rotation
    }

    pub fn pointer_offset(&self) -> Vec2 {
        self.pointer_offset
    }

    /// Euler XYZ rotation of the node cloud.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        assert_eq!(Viewport::new(1600, 800).aspect(), Some(2.0));
        assert_eq!(Viewport::new(0, 800).aspect(), None);
        assert_eq!(Viewport::new(800, 0).aspect(), None);
        assert!(Viewport::default().is_degenerate());
    }

    #[test]
    fn test_pointer_offset_from_center() {
        let mut state = InteractionState::new(Viewport::new(1000, 600));

        state.pointer_moved(500.0, 300.0);
        assert_eq!(state.pointer_offset(), Vec2::ZERO);

        state.pointer_moved(1000.0, 0.0);
        let offset = state.pointer_offset();
        assert!((offset.x - 0.25).abs() < 1e-6);
        assert!((offset.y + 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_resize_recenters_and_skips_degenerate() {
        let mut state = InteractionState::new(Viewport::new(1000, 600));

        assert_eq!(state.resized(Viewport::new(0, 0)), None);
        state.pointer_moved(500.0, 300.0);
        assert_eq!(state.pointer_offset(), Vec2::ZERO);

        assert_eq!(state.resized(Viewport::new(400, 200)), Some(2.0));
        state.pointer_moved(200.0, 100.0);
        assert_eq!(state.pointer_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_rotation_eases_toward_target() {
        let mut state = InteractionState::new(Viewport::new(1000, 600));
        state.pointer_moved(1000.0, 600.0);
        let target_x = state.pointer_offset().y * PARALLAX_GAIN;

        let first = state.advance();
        assert!((first.x - target_x * SMOOTHING).abs() < 1e-7);

        for _ in 0..2_000 {
            state.advance();
        }
        let settled = state.rotation();
        assert!((settled.x - target_x).abs() < 1e-4);
        // Spin keeps y slightly ahead of its pointer target.
        let target_y = state.pointer_offset().x * PARALLAX_GAIN;
        assert!(settled.y > target_y);
    }

    #[test]
    fn test_idle_spin_without_pointer() {
        let mut state = InteractionState::new(Viewport::new(1000, 600));
        let rotation = state.advance();
        assert_eq!(rotation.x, 0.0);
        assert!((rotation.y - AUTO_SPIN * (1.0 - SMOOTHING)).abs() < 1e-9);
    }
}
