//! Bounded random walk with elastic reflection.
//!
//! Nodes drift at constant speed. When a coordinate's magnitude exceeds its
//! bound the matching velocity component flips sign. Positions are never
//! clamped, so a node may overshoot by up to one tick of travel before the
//! reflected velocity carries it back. Nodes do not collide with each other.

use crate::config::Bounds;
use crate::network::{Kinematics, SpatialStore};

/// Angular frequency of the glow pulse, in radians per unit of simulation time.
pub const PULSE_FREQUENCY: f32 = 2.0;
/// Relative amplitude of the glow pulse.
pub const PULSE_AMPLITUDE: f32 = 0.15;

/// Advances node motion one tick at a time.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsStepper {
    bounds: Bounds,
}

impl PhysicsStepper {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Move every node by its velocity, reflect off the bounds, and refresh
    /// the glow scale for simulation time `time`.
    pub fn step(&self, store: &mut SpatialStore, time: f32) {
        let Kinematics {
            pos,
            vel,
            pulse_phase,
            pulse_scale,
        } = store.kinematics_mut();

        for (axis, (positions, velocities)) in pos.into_iter().zip(vel).enumerate() {
            let bound = self.bounds.axis(axis);
            for (p, v) in positions.iter_mut().zip(velocities.iter_mut()) {
                *p += *v;
                if p.abs() > bound {
                    *v = -*v;
                }
            }
        }

        for (scale, &phase) in pulse_scale.iter_mut().zip(pulse_phase) {
            *scale = pulse(time, phase);
        }
    }
}

/// Glow scale `1 + sin(2t + phase) * 0.15`.
#[inline]
pub fn pulse(time: f32, phase: f32) -> f32 {
    1.0 + (PULSE_FREQUENCY * time + phase).sin() * PULSE_AMPLITUDE
}
