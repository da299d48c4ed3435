use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::{Srgb, Srgba, WithAlpha};

pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub frame: Srgba<f64>,
    pub card_back: Srgba<f64>,
    pub trim: Srgba<f64>,
    pub pending: Srgba<f64>,
    pub failed: Srgba<f64>,
    pub backdrop: Srgba<f64>,
    pub caption: Srgba<f64>,
    /// Outline around the photo the gesture is pointing at.
    pub highlight: Srgba<f64>,
}

fn hex(r: u8, g: u8, b: u8) -> Srgba<f64> {
    Srgb::new(r, g, b).into_format::<f64>().with_alpha(1.0)
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: hex(0x05, 0x0b, 0x1a),
            frame: hex(0xfa, 0xfa, 0xf5),
            card_back: hex(0xe4, 0xe0, 0xd6),
            trim: hex(0xd4, 0xaf, 0x37),
            pending: hex(0xcc, 0xcc, 0xcc),
            failed: hex(0x55, 0x00, 0x00),
            backdrop: Srgba::new(0.0, 0.0, 0.0, 0.6),
            caption: hex(0x33, 0x33, 0x33),
            highlight: hex(0xff, 0xe0, 0x8a),
        }
    }
}

impl ThemeColors {
    /// Placeholder colors stay fixed; the rest can be overridden by the GTK
    /// theme through `@define-color`.
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let defaults = Self::default();
        Self {
            background: Self::lookup_color(context, "tinsel_background", defaults.background, None),
            frame: Self::lookup_color(context, "tinsel_frame", defaults.frame, Some(1.0)),
            card_back: Self::lookup_color(context, "tinsel_card_back", defaults.card_back, Some(1.0)),
            trim: Self::lookup_color(context, "tinsel_trim", defaults.trim, Some(1.0)),
            backdrop: Self::lookup_color(context, "tinsel_backdrop", defaults.backdrop, Some(0.6)),
            highlight: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                defaults.highlight,
                Some(0.9),
            ),
            ..defaults
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
@define-color tinsel_background #050b1a;
@define-color tinsel_trim #d4af37;

.tinsel-window, .tinsel-drawing-area {
    background-color: @tinsel_background;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
