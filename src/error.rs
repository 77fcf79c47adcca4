//! Errors for the parts of the game that touch the outside world.
//!
//! Gameplay itself never fails; only startup (config, logging, terminal)
//! and the optional asset and audio layers produce these.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("audio unavailable: {0}")]
    Audio(String),

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type GameResult<T> = Result<T, GameError>;
