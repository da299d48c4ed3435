use crate::layout::Layout;
use derive_more::{AsRef, Deref, Display, From, Into};
use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Position of an item in the loaded image list. Only meaningful until the
/// list is replaced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
pub struct ItemId(usize);

impl ItemId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Caller-owned handle to a source image (a path or URL).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageRef(String);

crate::impl_string_newtype!(ImageRef);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub speed_min: f32,
    pub speed_max: f32,
    pub sway_phase_max: f32,
    pub chaos_turn_rate: f32,
    pub scale_rate: f32,
    pub formed_scale: f32,
    pub chaos_scale: f32,
    /// Point the carousel cards turn toward.
    pub chaos_focus: Vec3,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            speed_min: 0.8,
            speed_max: 2.3,
            sway_phase_max: 100.0,
            chaos_turn_rate: 3.0,
            scale_rate: 4.0,
            formed_scale: 1.0,
            chaos_scale: 6.5,
            chaos_focus: Vec3::new(0.0, 9.0, 0.0),
        }
    }
}

/// One card's identity. Never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub image: ImageRef,
    pub formed_position: Vec3,
    pub chaos_position: Vec3,
    pub animation_speed: f32,
    pub sway_phase: f32,
}

impl Item {
    /// Draws the per-item speed and sway phase from `rng`.
    pub fn spawn<R: Rng>(
        id: ItemId,
        image: ImageRef,
        formed_position: Vec3,
        chaos_position: Vec3,
        params: &AnimationParams,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            image,
            formed_position,
            chaos_position,
            animation_speed: rng.gen_range(params.speed_min..params.speed_max),
            sway_phase: rng.gen_range(0.0..params.sway_phase_max),
        }
    }

    pub fn target(&self, layout: Layout) -> Vec3 {
        match layout {
            Layout::Formed => self.formed_position,
            Layout::Chaos => self.chaos_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.orientation,
            self.position,
        )
    }
}

/// An axis-aligned rectangle in card-local space, facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub center: Vec3,
    pub half: Vec2,
}

impl Quad {
    /// White backing board.
    pub const FRAME: Quad = Quad::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.6, 0.75));
    /// Gold border behind the photo.
    pub const TRIM: Quad = Quad::new(Vec3::new(0.0, 0.15, 0.025), Vec2::new(0.525, 0.525));
    pub const PHOTO: Quad = Quad::new(Vec3::new(0.0, 0.15, 0.03), Vec2::new(0.5, 0.5));
    pub const CLIP: Quad = Quad::new(Vec3::new(0.0, 0.7, 0.035), Vec2::new(0.1, 0.04));

    pub const fn new(center: Vec3, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Vec3; 4] {
        let Vec2 { x, y } = self.half;
        [
            self.center + Vec3::new(-x, y, 0.0),
            self.center + Vec3::new(x, y, 0.0),
            self.center + Vec3::new(x, -y, 0.0),
            self.center + Vec3::new(-x, -y, 0.0),
        ]
    }
}

/// An item together with the transform it exclusively animates.
#[derive(Debug, Clone)]
pub struct Card {
    item: Item,
    transform: Transform,
    // Blended look-at orientation; sway is applied on top of it per tick.
    settled: Quat,
}

impl Card {
    /// Places the card directly on its target for `layout`.
    pub fn new(item: Item, layout: Layout, params: &AnimationParams) -> Self {
        let position = item.target(layout);
        let settled = facing(position, layout, params).unwrap_or(Quat::IDENTITY);
        Self {
            item,
            transform: Transform {
                position,
                orientation: settled,
                scale: target_scale(layout, params),
            },
            settled,
        }
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn advance(&mut self, layout: Layout, dt: f32, elapsed: f32, params: &AnimationParams) {
        let step = saturate(dt * self.item.animation_speed);

        let target = self.item.target(layout);
        self.transform.position = approach(self.transform.position, target, step);

        let turn = match layout {
            Layout::Formed => step,
            Layout::Chaos => saturate(dt * params.chaos_turn_rate),
        };
        if let Some(desired) = facing(self.transform.position, layout, params) {
            self.settled = self.settled.slerp(desired, turn).normalize();
        }
        self.transform.orientation = self.settled * sway(layout, elapsed, self.item.sway_phase);

        let scale_step = saturate(dt * params.scale_rate);
        let scale_target = target_scale(layout, params);
        self.transform.scale += (scale_target - self.transform.scale) * scale_step;
    }

    pub fn world_matrix(&self, group: Quat) -> Mat4 {
        Mat4::from_quat(group) * self.transform.matrix()
    }

    pub fn world_position(&self, group: Quat) -> Vec3 {
        group * self.transform.position
    }

    pub fn world_quad(&self, group: Quat, quad: Quad) -> [Vec3; 4] {
        let m = self.world_matrix(group);
        quad.corners().map(|c| m.transform_point3(c))
    }
}

pub fn target_scale(layout: Layout, params: &AnimationParams) -> f32 {
    match layout {
        Layout::Formed => params.formed_scale,
        Layout::Chaos => params.chaos_scale,
    }
}

fn saturate(factor: f32) -> f32 {
    factor.clamp(0.0, 1.0)
}

/// First-order step toward `target`; never passes it.
pub fn approach(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current.lerp(target, saturate(factor))
}

/// Rotation whose +Z axis points from `eye` to `target`, keeping +Y up.
/// `None` when the direction is degenerate.
pub fn look_at(eye: Vec3, target: Vec3) -> Option<Quat> {
    let forward = (target - eye).try_normalize()?;
    let right = Vec3::Y.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)))
}

/// Desired orientation for a card at `position`: toward the trunk at its own
/// height when formed, toward the focus point above the tree in chaos.
pub fn facing(position: Vec3, layout: Layout, params: &AnimationParams) -> Option<Quat> {
    let target = match layout {
        Layout::Formed => Vec3::new(0.0, position.y, 0.0),
        Layout::Chaos => params.chaos_focus,
    };
    look_at(position, target)
}

#[derive(Debug, Clone, Copy)]
struct Wave {
    frequency: f32,
    amplitude: f32,
    offset: f32,
}

impl Wave {
    fn sample(&self, time: f32, phase: f32) -> f32 {
        (time * self.frequency + phase + self.offset).sin() * self.amplitude
    }
}

#[derive(Debug, Clone, Copy)]
struct SwayProfile {
    pitch: Wave,
    roll: Wave,
}

// Slow breathing on the tree.
const FORMED_SWAY: SwayProfile = SwayProfile {
    pitch: Wave { frequency: 1.5, amplitude: 0.0025, offset: FRAC_PI_2 },
    roll: Wave { frequency: 2.0, amplitude: 0.004, offset: 0.0 },
};

// Faster wobble on the carousel.
const CHAOS_SWAY: SwayProfile = SwayProfile {
    pitch: Wave { frequency: 1.5, amplitude: 0.03, offset: 0.0 },
    roll: Wave { frequency: 1.2, amplitude: 0.03, offset: FRAC_PI_2 },
};

/// Idle offset rotation at absolute time `elapsed`.
pub fn sway(layout: Layout, elapsed: f32, phase: f32) -> Quat {
    let profile = match layout {
        Layout::Formed => FORMED_SWAY,
        Layout::Chaos => CHAOS_SWAY,
    };
    Quat::from_euler(
        EulerRot::XYZ,
        profile.pitch.sample(elapsed, phase),
        0.0,
        profile.roll.sample(elapsed, phase),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f32 = 1.0 / 60.0;

    fn item(formed: Vec3, chaos: Vec3, speed: f32) -> Item {
        Item {
            id: ItemId::new(0),
            image: ImageRef::new("a.png"),
            formed_position: formed,
            chaos_position: chaos,
            animation_speed: speed,
            sway_phase: 1.0,
        }
    }

    #[test]
    fn test_spawn_draws_within_ranges() {
        let params = AnimationParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..200 {
            let it = Item::spawn(
                ItemId::new(i),
                ImageRef::new("x"),
                Vec3::ZERO,
                Vec3::ONE,
                &params,
                &mut rng,
            );
            assert!((params.speed_min..params.speed_max).contains(&it.animation_speed));
            assert!((0.0..params.sway_phase_max).contains(&it.sway_phase));
        }
    }

    #[test]
    fn test_approach_converges_without_overshoot() {
        let target = Vec3::new(0.0, 4.0, 0.0);
        let mut position = Vec3::new(10.0, 4.0, 0.0);
        let mut distance = position.distance(target);
        let mut steps = 0;
        while distance > 1e-3 {
            position = approach(position, target, DT * 1.2);
            let next = position.distance(target);
            assert!(next < distance);
            assert!(position.x >= target.x);
            distance = next;
            steps += 1;
            assert!(steps < 10_000);
        }
    }

    #[test]
    fn test_approach_saturates_on_long_frames() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(approach(Vec3::ZERO, target, 5.0), target);
    }

    #[test]
    fn test_look_at_points_z_toward_target() {
        let q = look_at(Vec3::new(5.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 0.0)).unwrap();
        let z = q * Vec3::Z;
        assert!(z.abs_diff_eq(Vec3::NEG_X, 1e-5));
        let y = q * Vec3::Y;
        assert!(y.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_look_at_on_axis_is_degenerate() {
        assert!(look_at(Vec3::ZERO, Vec3::ZERO).is_none());
        assert!(look_at(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_card_moves_to_new_layout() {
        let params = AnimationParams::default();
        let chaos = Vec3::new(0.0, 9.0, 22.0);
        let mut card = Card::new(item(Vec3::new(3.0, 2.0, 0.0), chaos, 1.5), Layout::Formed, &params);
        assert_eq!(card.transform().scale, params.formed_scale);

        let mut elapsed = 0.0;
        for _ in 0..2_000 {
            elapsed += DT;
            card.advance(Layout::Chaos, DT, elapsed, &params);
        }
        assert!(card.transform().position.distance(chaos) < 1e-3);
        assert!((card.transform().scale - params.chaos_scale).abs() < 1e-3);
    }

    #[test]
    fn test_scale_rate_ignores_animation_speed() {
        let params = AnimationParams::default();
        let mut slow = Card::new(item(Vec3::X * 3.0, Vec3::Z * 22.0, 0.8), Layout::Formed, &params);
        let mut fast = Card::new(item(Vec3::X * 3.0, Vec3::Z * 22.0, 2.2), Layout::Formed, &params);
        slow.advance(Layout::Chaos, DT, DT, &params);
        fast.advance(Layout::Chaos, DT, DT, &params);
        assert_eq!(slow.transform().scale, fast.transform().scale);
        assert_ne!(slow.transform().position, fast.transform().position);
    }

    #[test]
    fn test_sway_is_recomputed_not_accumulated() {
        let params = AnimationParams::default();
        let formed = Vec3::new(3.0, 2.0, 0.0);
        let mut long_run = Card::new(item(formed, Vec3::Z * 22.0, 1.0), Layout::Formed, &params);
        let mut elapsed = 0.0;
        for _ in 0..500 {
            elapsed += DT;
            long_run.advance(Layout::Formed, DT, elapsed, &params);
        }

        let mut fresh = Card::new(item(formed, Vec3::Z * 22.0, 1.0), Layout::Formed, &params);
        fresh.advance(Layout::Formed, 0.0, elapsed, &params);

        assert!(
            long_run
                .transform()
                .orientation
                .abs_diff_eq(fresh.transform().orientation, 1e-5)
        );
    }

    #[test]
    fn test_chaos_turn_ignores_speed_and_faces_focus() {
        let params = AnimationParams::default();
        let chaos = Vec3::new(22.0, 9.0, 0.0);
        let mut slow = Card::new(item(Vec3::ZERO, chaos, 0.8), Layout::Chaos, &params);
        let mut fast = Card::new(item(Vec3::ZERO, chaos, 2.2), Layout::Chaos, &params);
        slow.settled = Quat::IDENTITY;
        fast.settled = Quat::IDENTITY;

        slow.advance(Layout::Chaos, DT, DT, &params);
        fast.advance(Layout::Chaos, DT, DT, &params);
        assert!(slow.settled.abs_diff_eq(fast.settled, 1e-6));

        let desired = look_at(chaos, params.chaos_focus).unwrap();
        let expected = Quat::IDENTITY.slerp(desired, DT * params.chaos_turn_rate);
        assert!(slow.settled.abs_diff_eq(expected, 1e-5));

        let mut elapsed = DT;
        for _ in 0..600 {
            elapsed += DT;
            slow.advance(Layout::Chaos, DT, elapsed, &params);
        }
        let forward = slow.settled * Vec3::Z;
        let to_focus = (params.chaos_focus - chaos).normalize();
        assert!(forward.abs_diff_eq(to_focus, 1e-4));
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-4));
    }

    #[test]
    fn test_world_quad_follows_group_rotation() {
        let params = AnimationParams::default();
        let card = Card::new(item(Vec3::new(3.0, 2.0, 0.0), Vec3::Z, 1.0), Layout::Formed, &params);
        let group = Quat::from_rotation_y(FRAC_PI_2);
        let center = card.world_position(group);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 2.0, -3.0), 1e-5));

        let corners = card.world_quad(group, Quad::FRAME);
        let mid = corners.iter().copied().sum::<Vec3>() / 4.0;
        assert!(mid.abs_diff_eq(center, 1e-5));
    }
}
