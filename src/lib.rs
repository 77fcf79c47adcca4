//! A Flappy Bird style skyline runner.
//!
//! The library holds the whole game: physics, the building stream, the
//! session state machine and drawing onto an abstract [`render::Surface`].
//! The binary only wires a terminal to it.

pub mod assets;
pub mod audio;
pub mod character;
pub mod config;
pub mod error;
pub mod obstacle;
pub mod render;
pub mod session;
pub mod stream;

pub use config::Config;
pub use error::{GameError, GameResult};
pub use session::{Command, Controller, InputSource, Phase, Session, TickOutcome};
