use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::f32::consts::TAU;
use strum::{Display as StrumDisplay, EnumString};

/// Approximately `π(3 - √5)`, the phyllotaxis spacing.
pub const GOLDEN_ANGLE: f32 = 2.39996;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Cards on the spiral "tree".
    #[default]
    #[strum(to_string = "formed", serialize = "tree", serialize = "0")]
    Formed,
    /// Cards on the large foreground carousel.
    #[strum(to_string = "chaos", serialize = "carousel", serialize = "1")]
    Chaos,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Self::Formed => Self::Chaos,
            Self::Chaos => Self::Formed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub tree_height: f32,
    pub tree_radius: f32,
    pub tree_radius_offset: f32,
    pub tree_base: f32,
    pub tree_span: f32,
    pub golden_angle: f32,
    pub carousel_radius: f32,
    pub carousel_height: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            tree_height: 9.0,
            tree_radius: 5.0,
            tree_radius_offset: 0.8,
            tree_base: 0.2,
            tree_span: 0.6,
            golden_angle: GOLDEN_ANGLE,
            carousel_radius: 22.0,
            carousel_height: 9.0,
        }
    }
}

/// Both target sets for an item list, indexed by item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positions {
    pub formed: Vec<Vec3>,
    pub chaos: Vec<Vec3>,
}

impl Positions {
    pub fn len(&self) -> usize {
        self.formed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formed.is_empty()
    }
}

/// Spiral position of `index` among `count` cards. Height rises linearly with
/// the index while the radius shrinks, so the spiral narrows toward the top.
pub fn formed_position(index: usize, count: usize, params: &LayoutParams) -> Vec3 {
    let y_norm = params.tree_base + (index as f32 / count as f32) * params.tree_span;
    let y = y_norm * params.tree_height;
    let r = params.tree_radius * (1.0 - y_norm) + params.tree_radius_offset;
    let theta = index as f32 * params.golden_angle;
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Even spacing on a horizontal ring between the camera and the tree.
pub fn chaos_position(index: usize, count: usize, params: &LayoutParams) -> Vec3 {
    let theta = (index as f32 / count as f32) * TAU;
    Vec3::new(
        params.carousel_radius * theta.sin(),
        params.carousel_height,
        params.carousel_radius * theta.cos(),
    )
}

pub fn generate(count: usize, params: &LayoutParams) -> Positions {
    let (formed, chaos) = (0..count)
        .map(|i| {
            (
                formed_position(i, count, params),
                chaos_position(i, count, params),
            )
        })
        .unzip();
    Positions { formed, chaos }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground_radius(p: Vec3) -> f32 {
        p.x.hypot(p.z)
    }

    #[test]
    fn test_generate_lengths() {
        let params = LayoutParams::default();
        for count in [0, 1, 2, 7, 64] {
            let positions = generate(count, &params);
            assert_eq!(positions.formed.len(), count);
            assert_eq!(positions.chaos.len(), count);
        }
        assert!(generate(0, &params).is_empty());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let params = LayoutParams::default();
        let a = generate(23, &params);
        let b = generate(23, &params);
        for (p, q) in a.formed.iter().zip(&b.formed) {
            assert_eq!(p.to_array().map(f32::to_bits), q.to_array().map(f32::to_bits));
        }
        for (p, q) in a.chaos.iter().zip(&b.chaos) {
            assert_eq!(p.to_array().map(f32::to_bits), q.to_array().map(f32::to_bits));
        }
    }

    #[test]
    fn test_formed_azimuth_steps_by_golden_angle() {
        let params = LayoutParams::default();
        let positions = generate(12, &params);
        let expected = GOLDEN_ANGLE.rem_euclid(TAU);
        for pair in positions.formed.windows(2) {
            let a = pair[0].z.atan2(pair[0].x);
            let b = pair[1].z.atan2(pair[1].x);
            let step = (b - a).rem_euclid(TAU);
            assert!((step - expected).abs() < 1e-3, "step {step} vs {expected}");
        }
    }

    #[test]
    fn test_formed_spiral_narrows_with_height() {
        let params = LayoutParams::default();
        let positions = generate(10, &params);
        for pair in positions.formed.windows(2) {
            assert!(pair[1].y > pair[0].y);
            assert!(ground_radius(pair[1]) < ground_radius(pair[0]));
        }
    }

    #[test]
    fn test_chaos_ring_is_level_and_round() {
        let params = LayoutParams::default();
        let positions = generate(5, &params);
        assert_eq!(positions.chaos[0], Vec3::new(0.0, 9.0, 22.0));
        for p in &positions.chaos {
            assert_eq!(p.y, params.carousel_height);
            assert!((ground_radius(*p) - params.carousel_radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_layout_parsing() {
        let cases = vec![
            ("\"formed\"", Layout::Formed),
            ("\"Formed\"", Layout::Formed),
            ("\"tree\"", Layout::Formed),
            ("\"CHAOS\"", Layout::Chaos),
            ("\"carousel\"", Layout::Chaos),
            ("\"1\"", Layout::Chaos),
        ];

        for (json, expected) in cases {
            let deserialized: Layout = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert_eq!(Layout::Formed.toggled(), Layout::Chaos);
        assert_eq!(Layout::Chaos.to_string(), "chaos");
    }
}
