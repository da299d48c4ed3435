//! Line protocol spoken over the viewer's control socket.
//!
//! One command per line:
//!
//! ```text
//! mode formed | mode chaos | formed | chaos
//! toggle
//! hands on | hands off
//! pointer <x> <y> | pointer off
//! load <image>...
//! reload
//! ```
//!
//! Arguments are shell-quoted, so image paths may contain spaces.

use crate::item::ImageRef;
use crate::layout::Layout;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/tinsel.sock";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mode(Layout),
    Toggle,
    Hands(bool),
    /// `None` when the hand is lost.
    Pointer(Option<(f32, f32)>),
    Load(Vec<ImageRef>),
    Reload,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unbalanced quotes in `{0}`")]
    Quoting(String),
}

fn parse_switch(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_unit(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = shell_words::split(line).map_err(|_| CommandError::Quoting(line.to_string()))?;
        let (head, args) = words.split_first().ok_or(CommandError::Empty)?;
        let head = head.to_ascii_lowercase();

        match (head.as_str(), args) {
            ("mode", [layout]) => layout
                .parse()
                .map(Command::Mode)
                .map_err(|_| CommandError::Usage("mode <formed|chaos>")),
            ("mode", _) => Err(CommandError::Usage("mode <formed|chaos>")),
            ("formed" | "chaos", []) => head
                .parse()
                .map(Command::Mode)
                .map_err(|_| CommandError::Unknown(head.clone())),
            ("toggle", []) => Ok(Command::Toggle),
            ("hands", [state]) => parse_switch(state)
                .map(Command::Hands)
                .ok_or(CommandError::Usage("hands <on|off>")),
            ("hands", _) => Err(CommandError::Usage("hands <on|off>")),
            ("pointer", [off]) if off.eq_ignore_ascii_case("off") => Ok(Command::Pointer(None)),
            ("pointer", [x, y]) => parse_unit(x)
                .zip(parse_unit(y))
                .map(|p| Command::Pointer(Some(p)))
                .ok_or(CommandError::Usage("pointer <x> <y> | pointer off")),
            ("pointer", _) => Err(CommandError::Usage("pointer <x> <y> | pointer off")),
            ("load", images) => Ok(Command::Load(
                images.iter().map(|s| ImageRef::new(s.as_str())).collect(),
            )),
            ("reload", []) => Ok(Command::Reload),
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Mode(layout) => write!(f, "mode {layout}"),
            Command::Toggle => f.write_str("toggle"),
            Command::Hands(on) => write!(f, "hands {}", if *on { "on" } else { "off" }),
            Command::Pointer(Some((x, y))) => write!(f, "pointer {x} {y}"),
            Command::Pointer(None) => f.write_str("pointer off"),
            Command::Load(images) if images.is_empty() => f.write_str("load"),
            Command::Load(images) => write!(
                f,
                "load {}",
                shell_words::join(images.iter().map(ImageRef::as_str))
            ),
            Command::Reload => f.write_str("reload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = vec![
            ("mode chaos", Command::Mode(Layout::Chaos)),
            ("MODE tree", Command::Mode(Layout::Formed)),
            ("formed", Command::Mode(Layout::Formed)),
            ("toggle", Command::Toggle),
            ("hands on", Command::Hands(true)),
            ("hands OFF", Command::Hands(false)),
            ("pointer 0.25 0.75", Command::Pointer(Some((0.25, 0.75)))),
            ("pointer off", Command::Pointer(None)),
            ("load", Command::Load(Vec::new())),
            (
                "load a.png 'my photo.jpg'",
                Command::Load(vec![ImageRef::new("a.png"), ImageRef::new("my photo.jpg")]),
            ),
            ("  reload  ", Command::Reload),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), Ok(expected), "{line}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert!(matches!(
            "hands maybe".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            "pointer 0.5 NaN".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            "load 'open".parse::<Command>(),
            Err(CommandError::Quoting(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        let commands = [
            Command::Mode(Layout::Chaos),
            Command::Hands(false),
            Command::Pointer(Some((0.1, 0.9))),
            Command::Load(vec![ImageRef::new("with space.png"), ImageRef::new("b.png")]),
        ];
        for command in commands {
            assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        }
    }
}
