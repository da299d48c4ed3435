pub mod model;
pub mod view;

pub use model::{Overlay, ViewState};
pub use view::{SurfaceCache, draw};

/// Longest frame step fed to the animation, in seconds. Keeps a stall (or a
/// suspended window) from turning into one huge jump.
pub const MAX_FRAME_DT: f32 = 0.1;

pub const OVERLAY_PHOTO_FRACTION: f64 = 0.45; // of the shorter window edge
pub const CAPTION_FONT_FRACTION: f64 = 0.07; // of the overlay photo size
pub const CAPTION_OFFSET: f64 = -0.55; // card-local y of the caption baseline band

/// Smallest on-screen photo area (px²) worth texturing; thinner quads would
/// produce a singular cairo matrix.
pub const MIN_PHOTO_AREA: f32 = 4.0;
