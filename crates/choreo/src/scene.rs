use crate::camera::{Camera, Viewport};
use crate::item::{Card, ImageRef, Item, ItemId, Quad};
use crate::layout::{self, Layout};
use crate::params::SceneParams;
use crate::rotation::GroupRotation;
use glam::{Quat, Vec2, Vec3};
use rand::Rng;

/// What a selection hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: ItemId,
    pub image: ImageRef,
}

impl Selection {
    /// Captions are assigned round-robin by item id.
    pub fn caption<'a>(&self, captions: &'a [String]) -> Option<&'a str> {
        (!captions.is_empty()).then(|| captions[self.id.index() % captions.len()].as_str())
    }
}

/// The card set, the current layout and the group spin.
#[derive(Debug, Clone)]
pub struct Scene {
    params: SceneParams,
    layout: Layout,
    cards: Vec<Card>,
    rotation: GroupRotation,
}

impl Scene {
    pub fn new(params: SceneParams, layout: Layout) -> Self {
        Self {
            rotation: GroupRotation::new(params.rotation),
            params,
            layout,
            cards: Vec::new(),
        }
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    /// Layout constants and the speed and sway-phase ranges only reach cards
    /// created by the next [`Scene::set_images`]. The remaining animation
    /// constants and the rotation constants apply from the next
    /// [`Scene::advance`].
    pub fn set_params(&mut self, params: SceneParams) {
        self.rotation.set_params(params.rotation);
        self.params = params;
    }

    /// Discards every card and builds a fresh set with ids `0..images.len()`.
    pub fn set_images<R: Rng>(&mut self, images: Vec<ImageRef>, rng: &mut R) {
        let positions = layout::generate(images.len(), &self.params.layout);
        let anim = self.params.animation;
        let layout = self.layout;

        self.cards = images
            .into_iter()
            .zip(positions.formed.into_iter().zip(positions.chaos))
            .enumerate()
            .map(|(i, (image, (formed, chaos)))| {
                let item = Item::spawn(ItemId::new(i), image, formed, chaos, &anim, rng);
                Card::new(item, layout, &anim)
            })
            .collect();

        log::info!("Scene rebuilt with {} cards", self.cards.len());
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns whether the layout actually changed.
    pub fn set_layout(&mut self, layout: Layout) -> bool {
        if self.layout == layout {
            return false;
        }
        log::info!("Layout {} -> {}", self.layout, layout);
        self.layout = layout;
        true
    }

    pub fn toggle_layout(&mut self) -> Layout {
        self.set_layout(self.layout.toggled());
        self.layout
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: ItemId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn rotation(&self) -> &GroupRotation {
        &self.rotation
    }

    pub fn group(&self) -> Quat {
        self.rotation.quat()
    }

    pub fn advance(&mut self, dt: f32, elapsed: f32) {
        let anim = self.params.animation;
        for card in &mut self.cards {
            card.advance(self.layout, dt, elapsed, &anim);
        }
        self.rotation.advance(self.layout, dt);
    }

    pub fn world_positions(&self) -> impl Iterator<Item = (ItemId, Vec3)> + '_ {
        let group = self.group();
        self.cards
            .iter()
            .map(move |card| (card.id(), card.world_position(group)))
    }

    /// Direct selection, e.g. from a click.
    pub fn select(&self, id: ItemId) -> Option<Selection> {
        self.card(id).map(|card| Selection {
            id,
            image: card.item().image.clone(),
        })
    }

    /// Card ids sorted far to near from `camera`, the order to paint them in.
    pub fn depth_order(&self, camera: &Camera) -> Vec<ItemId> {
        let mut order: Vec<(ItemId, f32)> = self
            .world_positions()
            .map(|(id, p)| (id, p.distance(camera.position)))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        order.into_iter().map(|(id, _)| id).collect()
    }

    /// Front-most card whose frame covers `point` on screen.
    pub fn pick(&self, point: Vec2, camera: &Camera, viewport: Viewport) -> Option<ItemId> {
        let group = self.group();
        self.depth_order(camera).into_iter().rev().find(|&id| {
            let corners = self.cards[id.index()]
                .world_quad(group, Quad::FRAME)
                .map(|c| camera.project(c, viewport).map(|p| p.point));
            match corners {
                [Some(a), Some(b), Some(c), Some(d)] => quad_contains(&[a, b, c, d], point),
                _ => false,
            }
        })
    }
}

/// Convex quad test that accepts either winding.
fn quad_contains(quad: &[Vec2; 4], point: Vec2) -> bool {
    let sides: Vec<f32> = (0..4)
        .map(|i| {
            let (a, b) = (quad[i], quad[(i + 1) % 4]);
            (b - a).perp_dot(point - a)
        })
        .collect();
    sides.iter().all(|&s| s >= 0.0) || sides.iter().all(|&s| s <= 0.0)
}
