use crate::gesture::GestureState;
use crate::item::{ImageRef, ItemId};
use crate::layout::Layout;
use crate::loader::{Decoder, ResourceLoader, TextureState};
use crate::proximity;
use crate::scene::{Scene, Selection};
use glam::Vec3;
use rand::Rng;

/// Inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub dt: f32,
    /// Seconds since the stage started; drives sway.
    pub elapsed: f32,
    pub gesture: GestureState,
    pub camera: Vec3,
}

/// A [`Scene`] and the textures for its cards, ticked together.
pub struct Stage<D: Decoder> {
    scene: Scene,
    loader: ResourceLoader<D>,
}

impl<D: Decoder> Stage<D> {
    pub fn new(scene: Scene, loader: ResourceLoader<D>) -> Self {
        Self { scene, loader }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn loader(&self) -> &ResourceLoader<D> {
        &self.loader
    }

    pub fn texture(&self, id: ItemId) -> Option<&TextureState<D::Texture>> {
        self.loader.state(id)
    }

    /// Full replacement: new cards, new ids, new loads. Nothing is diffed.
    pub fn set_images<R: Rng>(&mut self, images: Vec<ImageRef>, rng: &mut R) {
        self.loader.reset(&images);
        self.scene.set_images(images, rng);
    }

    pub fn set_layout(&mut self, layout: Layout) -> bool {
        self.scene.set_layout(layout)
    }

    pub fn toggle_layout(&mut self) -> Layout {
        self.scene.toggle_layout()
    }

    /// Applies finished loads, animates every card and the group, then reports
    /// the proximity selection for this tick.
    pub fn tick(&mut self, frame: &Frame) -> Option<Selection> {
        self.loader.poll();
        self.scene.advance(frame.dt, frame.elapsed);
        proximity::select(&frame.gesture, frame.camera, &self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraParams;
    use crate::item::target_scale;
    use crate::loader::tests::{FakeDecoder, settle};
    use crate::params::SceneParams;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::runtime::Runtime;

    const DT: f32 = 1.0 / 60.0;

    fn stage(rt: &Runtime) -> Stage<FakeDecoder> {
        let params = SceneParams::default();
        Stage::new(
            Scene::new(params, Layout::Formed),
            ResourceLoader::new(FakeDecoder, rt.handle().clone()),
        )
    }

    fn frame(elapsed: f32, two_hands_active: bool) -> Frame {
        Frame {
            dt: DT,
            elapsed,
            gesture: GestureState {
                two_hands_active,
                ..GestureState::default()
            },
            camera: CameraParams::default().position,
        }
    }

    #[test]
    fn test_formed_then_chaos() {
        let rt = Runtime::new().unwrap();
        let mut stage = stage(&rt);
        let images = ["a.png", "b.png", "missing.png", "d.png"]
            .map(ImageRef::new)
            .to_vec();
        stage.set_images(images, &mut StdRng::seed_from_u64(11));
        assert!(!stage.set_layout(Layout::Formed));

        let mut elapsed = 0.0;
        for _ in 0..600 {
            elapsed += DT;
            assert_eq!(stage.tick(&frame(elapsed, false)), None);
        }
        for card in stage.scene().cards() {
            let target = card.item().target(Layout::Formed);
            assert!(card.transform().position.distance(target) < 1e-3);
        }
        assert_eq!(stage.scene().rotation().angle(), 0.0);

        assert!(stage.set_layout(Layout::Chaos));
        elapsed += DT;
        stage.tick(&frame(elapsed, false));
        assert!(stage.scene().rotation().angle() > 0.0);
        let anim = stage.scene().params().animation;
        assert_eq!(target_scale(stage.scene().layout(), &anim), anim.chaos_scale);
        for card in stage.scene().cards() {
            assert!(card.transform().scale > anim.formed_scale);
        }
    }

    #[test]
    fn test_loads_land_on_later_ticks() {
        let rt = Runtime::new().unwrap();
        let mut stage = stage(&rt);
        stage.set_images(
            vec![ImageRef::new("a.png"), ImageRef::new("missing.png")],
            &mut StdRng::seed_from_u64(2),
        );
        assert!(stage.texture(ItemId::new(0)).unwrap().is_pending());

        settle(&mut stage.loader);
        stage.tick(&frame(DT, false));
        assert!(stage.texture(ItemId::new(0)).unwrap().is_ready());
        assert!(stage.texture(ItemId::new(1)).unwrap().is_failed());
    }

    #[test]
    fn test_two_hands_select_nearest_each_tick() {
        let rt = Runtime::new().unwrap();
        let mut stage = stage(&rt);
        stage.set_layout(Layout::Chaos);
        stage.set_images(
            ["a.png", "b.png", "c.png"].map(ImageRef::new).to_vec(),
            &mut StdRng::seed_from_u64(4),
        );

        let picked = stage.tick(&frame(DT, true)).unwrap();
        assert_eq!(picked.image, ImageRef::new("a.png"));
        assert_eq!(stage.tick(&frame(2.0 * DT, false)), None);
        assert!(stage.tick(&frame(3.0 * DT, true)).is_some());
    }

    #[test]
    fn test_empty_stage_ticks() {
        let rt = Runtime::new().unwrap();
        let mut stage = stage(&rt);
        stage.set_images(Vec::new(), &mut StdRng::seed_from_u64(0));
        assert_eq!(stage.tick(&frame(DT, true)), None);
        assert!(stage.loader().is_empty());
    }
}
