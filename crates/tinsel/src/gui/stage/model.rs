use super::MAX_FRAME_DT;
use super::view::SurfaceCache;
use crate::config::Config;
use crate::events::AppEvent;
use crate::sys::texture::PixbufDecoder;
use choreo::{
    Camera, Frame, GestureState, ImageRef, Layout, Pointer, ResourceLoader, Scene, Selection,
    Stage, Viewport,
};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;

/// What the selection overlay should show this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay<'a> {
    pub selection: &'a Selection,
    pub caption: Option<&'a str>,
    /// Clicked (stays until dismissed) rather than picked by the gesture.
    pub pinned: bool,
}

pub struct ViewState {
    stage: Stage<PixbufDecoder>,
    gesture: GestureState,
    viewport: Viewport,
    closest: Option<Selection>,
    pinned: Option<Selection>,
    captions: Vec<String>,
    rng: StdRng,
    elapsed: f32,
    last_frame_us: Option<i64>,
    pub(super) surfaces: SurfaceCache,
}

impl ViewState {
    pub fn new(config: &Config, layout: Layout, runtime: Handle) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let stage = Stage::new(
            Scene::new(config.scene, layout),
            ResourceLoader::new(PixbufDecoder::default(), runtime),
        );

        let mut state = Self {
            stage,
            gesture: GestureState::default(),
            viewport: Viewport::new(config.window.width as f32, config.window.height as f32),
            closest: None,
            pinned: None,
            captions: config.captions.clone(),
            rng,
            elapsed: 0.0,
            last_frame_us: None,
            surfaces: SurfaceCache::default(),
        };
        state.set_images(config.images());
        state
    }

    pub fn stage(&self) -> &Stage<PixbufDecoder> {
        &self.stage
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The scene camera, nudged by the hand pointer when one is detected.
    pub fn camera(&self) -> Camera {
        let params = self.stage.scene().params().camera;
        Camera::from_params(&params).with_pointer(&self.gesture.pointer, params.parallax)
    }

    /// Pointer from window coordinates.
    pub fn pointer_at(&mut self, x: f64, y: f64) {
        let (w, h) = (self.viewport.width.max(1.0), self.viewport.height.max(1.0));
        self.gesture.pointer = Pointer::new(x as f32 / w, y as f32 / h);
    }

    pub fn toggle_two_hands(&mut self) -> bool {
        self.gesture.two_hands_active = !self.gesture.two_hands_active;
        log::debug!("Two hands active: {}", self.gesture.two_hands_active);
        self.gesture.two_hands_active
    }

    pub fn set_images(&mut self, images: Vec<ImageRef>) {
        self.surfaces.clear();
        self.closest = None;
        self.pinned = None;
        self.stage.set_images(images, &mut self.rng);
    }

    /// Applies a freshly loaded config: parameters, captions, then the image
    /// list (which rebuilds every card with the new parameters).
    pub fn reload(&mut self, config: &Config) {
        self.stage.scene_mut().set_params(config.scene);
        self.captions = config.captions.clone();
        self.set_images(config.images());
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::SetLayout(layout) => {
                self.stage.set_layout(layout);
            }
            AppEvent::ToggleLayout => {
                self.stage.toggle_layout();
            }
            AppEvent::Hands(on) => self.gesture.two_hands_active = on,
            AppEvent::Pointer(pointer) => self.gesture.pointer = pointer,
            AppEvent::Load(images) => self.set_images(images),
            AppEvent::ConfigReload => {
                log::debug!("Config reload must be handled by the application");
            }
        }
    }

    pub fn toggle_layout(&mut self) -> Layout {
        self.stage.toggle_layout()
    }

    /// Advances everything to `frame_time_us` (the frame clock's microsecond
    /// timestamp). The first frame only records the time.
    pub fn tick(&mut self, frame_time_us: i64) {
        let dt = self
            .last_frame_us
            .map(|last| ((frame_time_us - last) as f32 / 1_000_000.0).clamp(0.0, MAX_FRAME_DT))
            .unwrap_or(0.0);
        self.last_frame_us = Some(frame_time_us);
        self.elapsed += dt;

        let frame = Frame {
            dt,
            elapsed: self.elapsed,
            gesture: self.gesture,
            camera: self.camera().position,
        };
        let closest = self.stage.tick(&frame);
        if closest.as_ref().map(|s| s.id) != self.closest.as_ref().map(|s| s.id)
            && let Some(selection) = &closest
        {
            log::debug!("Closest photo is now {} ({})", selection.id, selection.image);
        }
        self.closest = closest;
    }

    /// A click dismisses a pinned photo, otherwise pins the card under it.
    pub fn click(&mut self, x: f64, y: f64) {
        if self.dismiss() {
            return;
        }
        let camera = self.camera();
        let scene = self.stage.scene();
        self.pinned = scene
            .pick(Vec2::new(x as f32, y as f32), &camera, self.viewport)
            .and_then(|id| scene.select(id));
        if let Some(selection) = &self.pinned {
            log::info!("Selected photo {} ({})", selection.id, selection.image);
        }
    }

    pub fn dismiss(&mut self) -> bool {
        self.pinned.take().is_some()
    }

    /// A pinned photo wins over the gesture's pick; only pinned photos get a
    /// caption.
    pub fn overlay(&self) -> Option<Overlay<'_>> {
        match (&self.pinned, &self.closest) {
            (Some(selection), _) => Some(Overlay {
                selection,
                caption: selection.caption(&self.captions),
                pinned: true,
            }),
            (None, Some(selection)) => Some(Overlay {
                selection,
                caption: None,
                pinned: false,
            }),
            (None, None) => None,
        }
    }
}
