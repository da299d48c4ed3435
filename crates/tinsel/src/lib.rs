//! Tinsel: a photo viewer that hangs cards on a spiral tree and bursts them
//! out into a spinning carousel. The animation itself lives in `choreo`;
//! this crate adds the window, the painting, the config file and the
//! control socket.

pub mod config;
pub mod events;
pub mod gui;
pub mod sys;
