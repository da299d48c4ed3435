use crate::config::WindowConfig;
use gtk::prelude::*;
use gtk4 as gtk;

pub fn configure(window: &gtk::ApplicationWindow, config: &WindowConfig) {
    window.set_default_size(config.width.max(1), config.height.max(1));
    if config.fullscreen {
        window.fullscreen();
    }
}

pub fn toggle_fullscreen(window: &gtk::ApplicationWindow) {
    if window.is_fullscreen() {
        window.unfullscreen();
    } else {
        window.fullscreen();
    }
}
