use crate::gesture::Pointer;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// How far a detected hand pushes the eye off its rest position.
    pub parallax: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 30.0),
            target: Vec3::new(0.0, 5.0, 0.0),
            fov_degrees: 45.0,
            near: 0.1,
            far: 200.0,
            parallax: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// A world point mapped to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub point: Vec2,
    /// Distance along the view axis; larger is farther.
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_params(params: &CameraParams) -> Self {
        Self {
            position: params.position,
            target: params.target,
            fov_y: params.fov_degrees.to_radians(),
            near: params.near,
            far: params.far,
        }
    }

    /// Shifts the eye with the hand, keeping the look target fixed.
    pub fn with_pointer(mut self, pointer: &Pointer, parallax: f32) -> Self {
        if pointer.detected {
            self.position += Vec3::new(
                (pointer.x - 0.5) * 2.0 * parallax,
                (0.5 - pointer.y) * 2.0 * parallax,
                0.0,
            );
        }
        self
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, viewport.aspect(), self.near, self.far) * self.view()
    }

    /// `None` for points behind the eye.
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<Projected> {
        let clip = self.view_projection(viewport) * world.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            point: Vec2::new(
                (ndc.x + 1.0) * 0.5 * viewport.width,
                (1.0 - ndc.y) * 0.5 * viewport.height,
            ),
            depth: clip.w,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_params(&CameraParams::default())
    }
}
