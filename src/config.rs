//! Startup configuration, read once from a TOML file.
//!
//! Every field has a default, so an empty (or missing) file plays the
//! standard game on an 800×600 logical canvas.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "flappy-vibe.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub tuning: Tuning,
    pub assets: AssetConfig,
    pub audio: AudioConfig,
    pub log: LogConfig,
}

/// Logical drawing area. All game coordinates live in this space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Ticks per second; one tick per refresh.
    pub frame_rate: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            frame_rate: 60,
        }
    }
}

/// Physics and pacing constants, in canvas units per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f64,
    /// Velocity added on flap. Negative is upward.
    pub lift: f64,
    pub obstacle_speed: f64,
    /// Gap the newest obstacle must open from the right edge before the next spawns.
    pub spawn_spacing: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            lift: -15.0,
            obstacle_speed: 2.0,
            spawn_spacing: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub background: PathBuf,
    /// Horizontal strip of animation frames.
    pub character_sprite: PathBuf,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            background: PathBuf::from("assets/sprites/background.png"),
            character_sprite: PathBuf::from("assets/sprites/bird-sprite.png"),
            frame_width: 500,
            frame_height: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file. The terminal is owned by the game, so nothing is logged without one.
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> GameResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| GameError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            GameError::ConfigParse { source, .. } => GameError::ConfigParse { path, source },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: Config = toml::from_str(text).map_err(|source| GameError::ConfigParse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        let c = &self.canvas;
        let t = &self.tuning;
        let floats = [c.width, c.height, t.gravity, t.lift, t.obstacle_speed, t.spawn_spacing];
        let checks = [
            (floats.iter().all(|v| v.is_finite()), "numbers must be finite"),
            (c.width > 0.0 && c.height > 0.0, "canvas dimensions must be positive"),
            (c.frame_rate > 0, "frame_rate must be at least 1"),
            (t.gravity > 0.0, "gravity must be positive"),
            (t.lift < 0.0, "lift must be negative (upward)"),
            (t.obstacle_speed > 0.0, "obstacle_speed must be positive"),
            (
                t.spawn_spacing > t.obstacle_speed,
                "spawn_spacing must exceed obstacle_speed",
            ),
            (
                t.spawn_spacing < c.width,
                "spawn_spacing must be smaller than the canvas width",
            ),
            (
                self.assets.frame_width > 0 && self.assets.frame_height > 0,
                "sprite frame size must be non-zero",
            ),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(GameError::InvalidConfig((*msg).to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.canvas.frame_rate, 60);
        assert!((config.tuning.lift - (-15.0)).abs() < f64::EPSILON);
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [canvas]
            height = 480.0

            [tuning]
            spawn_spacing = 200.0

            [log]
            file = "game.log"
            level = "debug"
            "#,
        )
        .unwrap();
        assert!((config.canvas.height - 480.0).abs() < f64::EPSILON);
        assert!((config.canvas.width - 800.0).abs() < f64::EPSILON);
        assert!((config.tuning.spawn_spacing - 200.0).abs() < f64::EPSILON);
        assert!((config.tuning.gravity - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.log.file, Some(PathBuf::from("game.log")));
        assert_eq!(config.log.level, "debug");
        assert!(config.audio.enabled);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_toml_str("[tuning]\nlift = 3.0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));

        let err = Config::from_toml_str("[canvas]\nframe_rate = 0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));

        let err = Config::from_toml_str("[tuning]\nspawn_spacing = 1.0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));

        let err = Config::from_toml_str("[tuning]\nspawn_spacing = 1000.0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for text in [
            "[canvas]\nheight = inf\n",
            "[canvas]\nwidth = nan\n",
            "[tuning]\ngravity = inf\nlift = -inf\n",
            "[tuning]\nobstacle_speed = nan\n",
            "[tuning]\nspawn_spacing = inf\n",
        ] {
            let err = Config::from_toml_str(text).unwrap_err();
            assert!(matches!(err, GameError::InvalidConfig(_)), "{text:?} accepted");
        }
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[canvas\nwidth = ").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_explicit_path_is_read_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, GameError::ConfigRead { .. }));
    }
}
