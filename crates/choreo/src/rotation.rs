use crate::layout::Layout;
use glam::Quat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationParams {
    /// Radians per second while in chaos.
    pub angular_speed: f32,
    /// Per-tick multiplier while formed.
    pub decay: f32,
    pub snap_epsilon: f32,
}

impl Default for RotationParams {
    fn default() -> Self {
        Self {
            angular_speed: 0.45,
            decay: 0.95,
            snap_epsilon: 0.01,
        }
    }
}

/// Extra spin about +Y applied to the whole card group.
///
/// Chaos spins up immediately at a constant rate; formed bleeds the angle off
/// geometrically and snaps it to zero once it is small.
#[derive(Debug, Clone, Default)]
pub struct GroupRotation {
    angle: f32,
    params: RotationParams,
}

impl GroupRotation {
    pub fn new(params: RotationParams) -> Self {
        Self { angle: 0.0, params }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn quat(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }

    pub fn set_params(&mut self, params: RotationParams) {
        self.params = params;
    }

    pub fn advance(&mut self, layout: Layout, dt: f32) {
        match layout {
            Layout::Chaos => self.angle += dt * self.params.angular_speed,
            Layout::Formed => {
                self.angle *= self.params.decay;
                if self.angle.abs() < self.params.snap_epsilon {
                    self.angle = 0.0;
                }
            }
        }
    }
}
