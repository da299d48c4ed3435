use crate::camera::CameraParams;
use crate::item::AnimationParams;
use crate::layout::LayoutParams;
use crate::rotation::RotationParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every tunable constant of the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub layout: LayoutParams,
    pub animation: AnimationParams,
    pub rotation: RotationParams,
    pub camera: CameraParams,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParamsError {
    #[error("animation speed range {min}..{max} must be positive and non-empty")]
    SpeedRange { min: f32, max: f32 },
    #[error("sway phase range must be positive, got {0}")]
    SwayPhase(f32),
    #[error("rotation decay must lie in (0, 1), got {0}")]
    Decay(f32),
    #[error("snap epsilon must be positive, got {0}")]
    SnapEpsilon(f32),
    #[error("field of view must lie in (0, 180) degrees, got {0}")]
    FieldOfView(f32),
    #[error("`{0}` must be a finite, non-negative number")]
    Negative(&'static str),
}

impl SceneParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let anim = &self.animation;
        if !(anim.speed_min > 0.0 && anim.speed_min < anim.speed_max) {
            return Err(ParamsError::SpeedRange {
                min: anim.speed_min,
                max: anim.speed_max,
            });
        }
        if !(anim.sway_phase_max > 0.0) {
            return Err(ParamsError::SwayPhase(anim.sway_phase_max));
        }

        let rot = &self.rotation;
        if !(rot.decay > 0.0 && rot.decay < 1.0) {
            return Err(ParamsError::Decay(rot.decay));
        }
        if !(rot.snap_epsilon > 0.0) {
            return Err(ParamsError::SnapEpsilon(rot.snap_epsilon));
        }

        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ParamsError::FieldOfView(fov));
        }

        [
            ("animation.chaos_turn_rate", anim.chaos_turn_rate),
            ("animation.scale_rate", anim.scale_rate),
            ("animation.formed_scale", anim.formed_scale),
            ("animation.chaos_scale", anim.chaos_scale),
            ("rotation.angular_speed", rot.angular_speed),
            ("layout.tree_height", self.layout.tree_height),
            ("layout.carousel_radius", self.layout.carousel_radius),
        ]
        .into_iter()
        .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        .map_or(Ok(()), |(name, _)| Err(ParamsError::Negative(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SceneParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut params = SceneParams::default();
        params.animation.speed_max = params.animation.speed_min;
        assert!(matches!(params.validate(), Err(ParamsError::SpeedRange { .. })));

        let mut params = SceneParams::default();
        params.rotation.decay = 1.0;
        assert_eq!(params.validate(), Err(ParamsError::Decay(1.0)));

        let mut params = SceneParams::default();
        params.animation.scale_rate = f32::NAN;
        assert_eq!(
            params.validate(),
            Err(ParamsError::Negative("animation.scale_rate"))
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params: SceneParams =
            serde_json::from_str(r#"{ "rotation": { "angular_speed": 1.0 } }"#).unwrap();
        assert_eq!(params.rotation.angular_speed, 1.0);
        assert_eq!(params.rotation.decay, 0.95);
        assert_eq!(params.layout, LayoutParams::default());
    }
}
