use choreo::remote::Command;
use choreo::{ImageRef, Layout, Pointer};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    SetLayout(Layout),
    ToggleLayout,
    Hands(bool),
    Pointer(Pointer),
    Load(Vec<ImageRef>),
    ConfigReload,
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Mode(layout) => AppEvent::SetLayout(layout),
            Command::Toggle => AppEvent::ToggleLayout,
            Command::Hands(on) => AppEvent::Hands(on),
            Command::Pointer(Some((x, y))) => AppEvent::Pointer(Pointer::new(x, y)),
            Command::Pointer(None) => AppEvent::Pointer(Pointer::lost()),
            Command::Load(images) => AppEvent::Load(images),
            Command::Reload => AppEvent::ConfigReload,
        }
    }
}
