//! Sprite images, decoded off the main thread.
//!
//! A missing or broken image is logged and simply never drawn.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, unbounded};

use crate::config::AssetConfig;
use crate::error::{GameError, GameResult};
use crate::render::Rgb;

/// Decoded RGBA pixels.
#[derive(Debug, Clone)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Sprite {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color at sprite coordinates `(u, v)`, or `None` if outside or mostly transparent.
    pub fn sample(&self, u: f64, v: f64) -> Option<Rgb> {
        if u < 0.0 || v < 0.0 {
            return None;
        }
        let (x, y) = (u as u32, v as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, a] = *self.pixels.get((y * self.width + x) as usize)?;
        (a >= 128).then_some(Rgb(r, g, b))
    }
}

pub fn load_sprite(path: &Path) -> GameResult<Sprite> {
    let img = image::open(path)
        .map_err(|source| GameError::Asset {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    let pixels = img.pixels().map(|p| p.0).collect();
    Ok(Sprite::from_rgba(width, height, pixels))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Background,
    CharacterSprite,
}

type Delivery = (AssetKind, GameResult<Sprite>);

pub struct Assets {
    background: Option<Sprite>,
    character: Option<Sprite>,
    frame_size: (f64, f64),
    pending: usize,
    rx: Option<Receiver<Delivery>>,
}

impl Assets {
    /// No images at all; everything that needs one is skipped.
    pub fn empty(config: &AssetConfig) -> Self {
        Self {
            background: None,
            character: None,
            frame_size: (config.frame_width as f64, config.frame_height as f64),
            pending: 0,
            rx: None,
        }
    }

    /// Start decoding both images on a worker thread. Call [`Assets::poll`] each frame.
    pub fn load_in_background(config: &AssetConfig) -> Self {
        let mut assets = Self::empty(config);
        let jobs: Vec<(AssetKind, PathBuf)> = vec![
            (AssetKind::Background, config.background.clone()),
            (AssetKind::CharacterSprite, config.character_sprite.clone()),
        ];
        let (tx, rx) = unbounded();
        let pending = jobs.len();

        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                for (kind, path) in jobs {
                    if tx.send((kind, load_sprite(&path))).is_err() {
                        break;
                    }
                }
            });

        match spawned {
            Ok(_) => {
                assets.pending = pending;
                assets.rx = Some(rx);
            }
            Err(e) => tracing::warn!(error = %e, "could not start asset loader, drawing without images"),
        }
        assets
    }

    /// Take whatever the loader has finished. Failures are logged and dropped.
    pub fn poll(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        let arrived: Vec<Delivery> = rx.try_iter().collect();
        for (kind, result) in arrived {
            self.pending = self.pending.saturating_sub(1);
            match result {
                Ok(sprite) => {
                    tracing::info!(?kind, width = sprite.width, height = sprite.height, "asset loaded");
                    self.insert(kind, sprite);
                }
                Err(e) => tracing::warn!(?kind, error = %e, "asset failed to load"),
            }
        }
        if self.pending == 0 {
            self.rx = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn insert(&mut self, kind: AssetKind, sprite: Sprite) {
        match kind {
            AssetKind::Background => self.background = Some(sprite),
            AssetKind::CharacterSprite => self.character = Some(sprite),
        }
    }

    pub fn background(&self) -> Option<&Sprite> {
        self.background.as_ref()
    }

    pub fn character_sprite(&self) -> Option<&Sprite> {
        self.character.as_ref()
    }

    /// Size of one animation frame in the character strip, in sprite pixels.
    pub fn frame_size(&self) -> (f64, f64) {
        self.frame_size
    }
}
