//! Scene choreography for a set of photo cards.
//!
//! Cards sit either on a narrowing golden-angle spiral ([`Layout::Formed`])
//! or on a large foreground ring ([`Layout::Chaos`]). Every tick each card
//! eases its position, orientation and scale toward the current layout,
//! the whole group spins while in chaos, and a two-hand gesture picks the
//! card closest to the camera.

pub mod macros;

pub mod camera;
pub mod gesture;
pub mod item;
pub mod layout;
pub mod loader;
pub mod params;
pub mod proximity;
pub mod remote;
pub mod rotation;
pub mod scene;
pub mod stage;

pub use camera::{Camera, Projected, Viewport};
pub use gesture::{GestureState, Pointer};
pub use item::{Card, ImageRef, Item, ItemId, Transform};
pub use layout::{Layout, Positions};
pub use loader::{Decoder, LoadError, ResourceLoader, TextureState};
pub use params::{ParamsError, SceneParams};
pub use scene::{Scene, Selection};
pub use stage::{Frame, Stage};
