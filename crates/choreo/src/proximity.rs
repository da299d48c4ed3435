use crate::gesture::GestureState;
use crate::item::ItemId;
use crate::scene::{Scene, Selection};
use glam::Vec3;

/// Closest candidate to `camera`. Equal distances keep the earliest candidate.
pub fn nearest<I>(camera: Vec3, candidates: I) -> Option<ItemId>
where
    I: IntoIterator<Item = (ItemId, Vec3)>,
{
    candidates
        .into_iter()
        .map(|(id, position)| (id, position.distance(camera)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Card nearest the camera while both hands are up, recomputed from scratch
/// every call. Uses positions after the group spin, i.e. what is on screen.
pub fn select(gesture: &GestureState, camera: Vec3, scene: &Scene) -> Option<Selection> {
    if !gesture.two_hands_active {
        return None;
    }
    nearest(camera, scene.world_positions()).and_then(|id| scene.select(id))
}
