//! The flapping character: gravity, lift, clamping and the sprite cursor.

use crate::config::Tuning;

pub const START_X: f64 = 50.0;
pub const WIDTH: f64 = 150.0;
pub const HEIGHT: f64 = 150.0;

/// Highest allowed `y`; the sprite may poke above the canvas.
pub const MIN_Y: f64 = -100.0;

/// Only `HEIGHT / BOTTOM_OVERHANG` of the sprite must stay on the canvas.
pub const BOTTOM_OVERHANG: f64 = 1.6;

pub const FRAME_COUNT: u32 = 5;
/// Ticks spent on each animation frame.
pub const FRAME_DELAY: u32 = 5;

/// Which bound stopped the character on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct Character {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub width: f64,
    pub height: f64,
    frame_index: u32,
    frame_counter: u32,
    gravity: f64,
    lift: f64,
    max_y: f64,
}

impl Character {
    /// A character resting mid-canvas with no velocity.
    pub fn new(canvas_height: f64, tuning: &Tuning) -> Self {
        Self {
            x: START_X,
            y: canvas_height / 2.0,
            velocity: 0.0,
            width: WIDTH,
            height: HEIGHT,
            frame_index: 0,
            frame_counter: 0,
            gravity: tuning.gravity,
            lift: tuning.lift,
            max_y: canvas_height - HEIGHT / BOTTOM_OVERHANG,
        }
    }

    pub fn min_y(&self) -> f64 {
        MIN_Y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn flap(&mut self) {
        self.velocity += self.lift;
    }

    /// One physics tick. Returns the edge hit, if any; hitting one kills the velocity.
    pub fn advance(&mut self) -> Option<Edge> {
        self.velocity += self.gravity;
        self.y += self.velocity;

        let mut hit = None;
        if self.y < MIN_Y {
            self.y = MIN_Y;
            self.velocity = 0.0;
            hit = Some(Edge::Top);
        }
        if self.y > self.max_y {
            self.y = self.max_y;
            self.velocity = 0.0;
            hit = Some(Edge::Bottom);
        }
        if let Some(edge) = hit {
            tracing::trace!(?edge, y = self.y, "character clamped");
        }

        self.frame_counter += 1;
        if self.frame_counter >= FRAME_DELAY {
            self.frame_counter = 0;
            self.frame_index = (self.frame_index + 1) % FRAME_COUNT;
        }

        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character() -> Character {
        Character::new(600.0, &Tuning::default())
    }

    #[test]
    fn test_new_character_defaults() {
        let c = character();
        assert!((c.x - 50.0).abs() < f64::EPSILON);
        assert!((c.y - 300.0).abs() < f64::EPSILON);
        assert_eq!(c.velocity, 0.0);
        assert_eq!(c.frame_index(), 0);
        assert!((c.max_y() - (600.0 - 150.0 / 1.6)).abs() < 1e-9);
    }

    #[test]
    fn test_gravity_accumulates() {
        let mut c = character();
        c.advance();
        assert!((c.velocity - 0.3).abs() < 1e-9);
        assert!((c.y - 300.3).abs() < 1e-9);
        c.advance();
        assert!((c.velocity - 0.6).abs() < 1e-9);
        assert!((c.y - 300.9).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_flaps_stack() {
        let mut c = character();
        for n in 1..=4 {
            c.flap();
            assert!((c.velocity - (-15.0 * n as f64)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_top_clamp_zeroes_velocity() {
        let mut c = character();
        c.y = -95.0;
        c.velocity = -20.0;
        assert_eq!(c.advance(), Some(Edge::Top));
        assert_eq!(c.y, MIN_Y);
        assert_eq!(c.velocity, 0.0);
    }

    #[test]
    fn test_bottom_clamp_zeroes_velocity() {
        let mut c = character();
        c.velocity = 40.0;
        let mut hit = None;
        for _ in 0..20 {
            hit = c.advance();
            if hit.is_some() {
                break;
            }
        }
        assert_eq!(hit, Some(Edge::Bottom));
        assert_eq!(c.y, c.max_y());
        assert_eq!(c.velocity, 0.0);
    }

    #[test]
    fn test_y_stays_in_bounds_with_random_flaps() {
        let mut c = character();
        for tick in 0..2000u32 {
            if tick % 7 == 0 || tick % 11 == 0 {
                c.flap();
            }
            let hit = c.advance();
            assert!(c.y >= c.min_y() && c.y <= c.max_y());
            if hit.is_some() {
                assert_eq!(c.velocity, 0.0);
            } else {
                assert_ne!(c.velocity, 0.0, "velocity only resets on a clamp (tick {tick})");
            }
        }
    }

    #[test]
    fn test_animation_cycles_every_delay() {
        let mut c = character();
        for _ in 0..FRAME_DELAY - 1 {
            c.advance();
        }
        assert_eq!(c.frame_index(), 0);
        c.advance();
        assert_eq!(c.frame_index(), 1);
        for _ in 0..FRAME_DELAY * (FRAME_COUNT - 1) {
            c.advance();
        }
        assert_eq!(c.frame_index(), 0);
    }
}
