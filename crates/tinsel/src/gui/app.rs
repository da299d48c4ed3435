use crate::config::{self, WindowConfig};
use crate::events::AppEvent;
use crate::gui::stage::{self, ViewState};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub struct AppInit {
    pub state: ViewState,
    pub window: WindowConfig,
    pub config_path: Option<PathBuf>,
    pub rx: async_channel::Receiver<AppEvent>,
}

pub struct AppModel {
    pub state: Rc<RefCell<ViewState>>,
    pub config_path: Option<PathBuf>,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Tick(i64),
    Resize(i32, i32),
    PointerMove(f64, f64),
    PointerLeave,
    Click(f64, f64),
    ToggleLayout,
    ToggleHands,
    ToggleFullscreen,
    Dismiss,
    Quit,
    Event(AppEvent),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        AppMsg::Event(event)
    }
}

fn key_message(key: gdk::Key) -> Option<AppMsg> {
    if key == gdk::Key::space {
        Some(AppMsg::ToggleLayout)
    } else if key == gdk::Key::h || key == gdk::Key::H {
        Some(AppMsg::ToggleHands)
    } else if key == gdk::Key::f || key == gdk::Key::F11 {
        Some(AppMsg::ToggleFullscreen)
    } else if key == gdk::Key::Escape {
        Some(AppMsg::Dismiss)
    } else if key == gdk::Key::q || key == gdk::Key::Q {
        Some(AppMsg::Quit)
    } else {
        None
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Tinsel"),
            add_css_class: "tinsel-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match key_message(key) {
                        Some(msg) => {
                            sender.input(msg);
                            glib::Propagation::Stop
                        }
                        None => glib::Propagation::Proceed,
                    }
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "tinsel-drawing-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resize(width, height));
                },

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::PointerMove(x, y));
                    },
                    connect_leave[sender] => move |_| {
                        sender.input(AppMsg::PointerLeave);
                    }
                },

                add_controller = gtk::GestureClick {
                    set_button: gdk::BUTTON_PRIMARY,
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(x, y));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            state,
            window: window_config,
            config_path,
            rx,
        } = init;

        theme::load_css();
        window::configure(&root, &window_config);

        let state = Rc::new(RefCell::new(state));

        let model = AppModel {
            state: state.clone(),
            config_path,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = stage::draw(cr, &state_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_tick = sender.clone();
        widgets
            .drawing_area
            .add_tick_callback(move |_, clock| {
                sender_tick.input(AppMsg::Tick(clock.frame_time()));
                glib::ControlFlow::Continue
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Tick(frame_time) => {
                self.state.borrow_mut().tick(frame_time);
                self.drawing_area.queue_draw();
            }
            AppMsg::Resize(width, height) => {
                self.state
                    .borrow_mut()
                    .set_viewport(width as f32, height as f32);
            }
            AppMsg::PointerMove(x, y) => self.state.borrow_mut().pointer_at(x, y),
            AppMsg::PointerLeave => self
                .state
                .borrow_mut()
                .apply(AppEvent::Pointer(choreo::Pointer::lost())),
            AppMsg::Click(x, y) => self.state.borrow_mut().click(x, y),
            AppMsg::ToggleLayout => {
                let layout = self.state.borrow_mut().toggle_layout();
                log::debug!("Toggled to {}", layout);
            }
            AppMsg::ToggleHands => {
                self.state.borrow_mut().toggle_two_hands();
            }
            AppMsg::ToggleFullscreen => window::toggle_fullscreen(&self.root),
            AppMsg::Dismiss => {
                self.state.borrow_mut().dismiss();
            }
            AppMsg::Quit => self.root.close(),
            AppMsg::Event(AppEvent::ConfigReload) => {
                let loaded = match &self.config_path {
                    Some(path) => config::load_config_from(path),
                    None => config::load_config(),
                };
                match loaded {
                    Ok(new_config) => {
                        self.state.borrow_mut().reload(&new_config);
                        log::info!("Configuration reloaded");
                    }
                    Err(e) => log::error!("Failed to reload config: {}", e),
                }
            }
            AppMsg::Event(event) => self.state.borrow_mut().apply(event),
        }
    }
}
