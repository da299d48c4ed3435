use super::model::{Overlay, ViewState};
use super::{CAPTION_FONT_FRACTION, CAPTION_OFFSET, MIN_PHOTO_AREA, OVERLAY_PHOTO_FRACTION};
use crate::gui::theme::ThemeColors;
use crate::sys::texture::DecodedImage;
use cairo::{Context, Format, ImageSurface};
use choreo::item::Quad;
use choreo::{Camera, Card, ItemId, TextureState, Viewport};
use gdk4::prelude::*;
use glam::{Quat, Vec2};
use palette::Srgba;
use std::cell::RefCell;
use std::collections::HashMap;

type ScreenQuad = [Vec2; 4];

/// Decoded photos converted to cairo surfaces, built on first paint.
#[derive(Default)]
pub struct SurfaceCache {
    surfaces: RefCell<HashMap<ItemId, ImageSurface>>,
}

impl SurfaceCache {
    pub fn clear(&self) {
        self.surfaces.borrow_mut().clear();
    }

    fn get(&self, id: ItemId, image: &DecodedImage) -> Result<ImageSurface, cairo::Error> {
        if let Some(surface) = self.surfaces.borrow().get(&id) {
            return Ok(surface.clone());
        }

        let pixbuf = image.to_pixbuf();
        let surface = ImageSurface::create(Format::ARgb32, pixbuf.width(), pixbuf.height())?;
        {
            let cr = Context::new(&surface)?;
            cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
            cr.paint()?;
        }
        self.surfaces.borrow_mut().insert(id, surface.clone());
        Ok(surface)
    }
}

/// Shoelace area in window coordinates; positive when the card's front
/// faces the viewer.
fn signed_area(q: &ScreenQuad) -> f32 {
    (0..4).map(|i| q[i].perp_dot(q[(i + 1) % 4])).sum::<f32>() * 0.5
}

fn project_quad(camera: &Camera, viewport: Viewport, corners: [glam::Vec3; 4]) -> Option<ScreenQuad> {
    match corners.map(|c| camera.project(c, viewport).map(|p| p.point)) {
        [Some(a), Some(b), Some(c), Some(d)] => Some([a, b, c, d]),
        _ => None,
    }
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn quad_path(cr: &Context, q: &ScreenQuad) {
    cr.move_to(q[0].x as f64, q[0].y as f64);
    for p in &q[1..] {
        cr.line_to(p.x as f64, p.y as f64);
    }
    cr.close_path();
}

/// Runs `body` between `save` and `restore`. The restore happens even when
/// `body` fails, so one card's clip or transform never leaks into the next.
fn isolated<F>(cr: &Context, body: F) -> Result<(), cairo::Error>
where
    F: FnOnce() -> Result<(), cairo::Error>,
{
    cr.save()?;
    let result = body();
    let restored = cr.restore();
    result.and(restored)
}

fn fill_quad(cr: &Context, q: &ScreenQuad, color: Srgba<f64>) -> Result<(), cairo::Error> {
    set_color(cr, color);
    quad_path(cr, q);
    cr.fill()
}

/// One card's parts, already projected to the window.
struct CardFace {
    frame: ScreenQuad,
    trim: ScreenQuad,
    photo: ScreenQuad,
    clip: ScreenQuad,
}

impl CardFace {
    fn project(card: &Card, group: Quat, camera: &Camera, viewport: Viewport) -> Option<Self> {
        let screen = |quad| project_quad(camera, viewport, card.world_quad(group, quad));
        Some(Self {
            frame: screen(Quad::FRAME)?,
            trim: screen(Quad::TRIM)?,
            photo: screen(Quad::PHOTO)?,
            clip: screen(Quad::CLIP)?,
        })
    }

    /// Flat layout centered on `center`, `size` pixels per card-local unit.
    fn flat(center: Vec2, size: f32) -> Self {
        let screen = |quad: Quad| {
            quad.corners()
                .map(|c| Vec2::new(center.x + c.x * size, center.y - c.y * size))
        };
        Self {
            frame: screen(Quad::FRAME),
            trim: screen(Quad::TRIM),
            photo: screen(Quad::PHOTO),
            clip: screen(Quad::CLIP),
        }
    }

    fn is_front(&self) -> bool {
        signed_area(&self.frame) > 0.0
    }
}

struct CardRenderer<'a> {
    id: ItemId,
    face: &'a CardFace,
    texture: Option<&'a TextureState<DecodedImage>>,
    surfaces: &'a SurfaceCache,
}

impl<'a> CardRenderer<'a> {
    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        isolated(cr, || {
            if self.face.is_front() {
                fill_quad(cr, &self.face.frame, colors.frame)?;
                fill_quad(cr, &self.face.trim, colors.trim)?;
                self.draw_photo(cr, colors)?;
                fill_quad(cr, &self.face.clip, colors.trim)
            } else {
                fill_quad(cr, &self.face.frame, colors.card_back)
            }
        })
    }

    fn draw_photo(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        match self.texture {
            Some(TextureState::Ready(image)) => {
                let surface = self.surfaces.get(self.id, image)?;
                paint_surface(cr, &self.face.photo, &surface)
            }
            Some(TextureState::Failed(_)) => fill_quad(cr, &self.face.photo, colors.failed),
            Some(TextureState::Pending) | None => fill_quad(cr, &self.face.photo, colors.pending),
        }
    }
}

/// Maps `surface`, center-cropped to a square, onto `quad` with the affine
/// transform given by its top-left, top-right and bottom-left corners.
fn paint_surface(cr: &Context, quad: &ScreenQuad, surface: &ImageSurface) -> Result<(), cairo::Error> {
    let [tl, tr, _, bl] = *quad;
    let (u, v) = (tr - tl, bl - tl);
    // A singular matrix would leave the context in a permanent error state.
    if u.perp_dot(v).abs() < MIN_PHOTO_AREA {
        return Ok(());
    }

    let (w, h) = (surface.width() as f64, surface.height() as f64);
    let side = w.min(h);
    if side <= 0.0 {
        return Ok(());
    }

    isolated(cr, || {
        quad_path(cr, quad);
        cr.clip();
        cr.transform(cairo::Matrix::new(
            u.x as f64, u.y as f64, v.x as f64, v.y as f64, tl.x as f64, tl.y as f64,
        ));
        cr.scale(1.0 / side, 1.0 / side);
        cr.translate((side - w) / 2.0, (side - h) / 2.0);
        cr.set_source_surface(surface, 0.0, 0.0)?;
        cr.paint()
    })
}

pub fn draw(cr: &Context, state: &ViewState, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_color(cr, colors.background);
    cr.paint()?;

    let stage = state.stage();
    let scene = stage.scene();
    let camera = state.camera();
    let group = scene.group();
    let highlighted = state.overlay().filter(|o| !o.pinned).map(|o| o.selection.id);

    for id in scene.depth_order(&camera) {
        let Some(card) = scene.card(id) else {
            continue;
        };
        let Some(face) = CardFace::project(card, group, &camera, state.viewport()) else {
            continue;
        };
        let renderer = CardRenderer {
            id,
            face: &face,
            texture: stage.texture(id),
            surfaces: &state.surfaces,
        };
        if let Err(e) = renderer.draw(cr, colors) {
            log::error!("Failed to draw card {}: {}", id, e);
            continue;
        }
        if highlighted == Some(id)
            && let Err(e) = outline(cr, &face.frame, colors.highlight)
        {
            log::error!("Failed to outline card {}: {}", id, e);
        }
    }

    if let Some(overlay) = state.overlay() {
        draw_overlay(cr, state, &overlay, colors)?;
    }
    Ok(())
}

fn outline(cr: &Context, q: &ScreenQuad, color: Srgba<f64>) -> Result<(), cairo::Error> {
    isolated(cr, || {
        set_color(cr, color);
        cr.set_line_width(3.0);
        quad_path(cr, q);
        cr.stroke()
    })
}

fn draw_overlay(
    cr: &Context,
    state: &ViewState,
    overlay: &Overlay,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let viewport = state.viewport();
    set_color(cr, colors.backdrop);
    cr.paint()?;

    let size = (viewport.width.min(viewport.height) as f64 * OVERLAY_PHOTO_FRACTION) as f32;
    let center = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
    let face = CardFace::flat(center, size);
    let id = overlay.selection.id;
    CardRenderer {
        id,
        face: &face,
        texture: state.stage().texture(id),
        surfaces: &state.surfaces,
    }
    .draw(cr, colors)?;

    if let Some(caption) = overlay.caption {
        draw_caption(cr, caption, center, size as f64, colors)?;
    }
    Ok(())
}

fn draw_caption(
    cr: &Context,
    text: &str,
    center: Vec2,
    size: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.caption);
    cr.select_font_face("Serif", cairo::FontSlant::Italic, cairo::FontWeight::Normal);
    cr.set_font_size(size * CAPTION_FONT_FRACTION);
    let ext = cr.text_extents(text)?;
    cr.move_to(
        center.x as f64 - ext.width() / 2.0 - ext.x_bearing(),
        center.y as f64 - CAPTION_OFFSET * size + ext.height() / 2.0,
    );
    cr.show_text(text)
}
