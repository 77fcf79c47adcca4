//! The queue of buildings scrolling across the canvas, oldest first.

use std::collections::VecDeque;

use rand::Rng;

use crate::character::Character;
use crate::config::{CanvasConfig, Tuning};
use crate::obstacle::Obstacle;

#[derive(Debug, Clone)]
pub struct ObstacleStream {
    queue: VecDeque<Obstacle>,
    canvas_width: f64,
    canvas_height: f64,
    speed: f64,
    spacing: f64,
}

impl ObstacleStream {
    pub fn new(canvas: &CanvasConfig, tuning: &Tuning) -> Self {
        Self {
            queue: VecDeque::new(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            speed: tuning.obstacle_speed,
            spacing: tuning.spawn_spacing,
        }
    }

    /// Drop everything and place one fresh building at the right edge.
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue.clear();
        self.spawn(rng);
    }

    fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let obstacle = Obstacle::generate(rng, self.canvas_width, self.canvas_height);
        tracing::trace!(
            width = obstacle.width(),
            height = obstacle.height(),
            roof = ?obstacle.roof(),
            "obstacle spawned"
        );
        self.queue.push_back(obstacle);
    }

    /// Spawn at the right edge once the newest building has opened a full spacing gap.
    ///
    /// An empty stream never spawns here; it has to be seeded.
    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let due = self
            .queue
            .back()
            .is_some_and(|last| last.x < self.canvas_width - self.spacing);
        if due {
            self.spawn(rng);
        }
        due
    }

    /// Move every building, then retire from the front while the front is off-screen.
    ///
    /// Returns how many were retired.
    pub fn advance_and_retire(&mut self) -> u32 {
        for obstacle in self.queue.iter_mut() {
            obstacle.advance(self.speed);
        }
        let mut retired = 0;
        while self.queue.front().is_some_and(Obstacle::is_offscreen) {
            self.queue.pop_front();
            retired += 1;
        }
        retired
    }

    pub fn any_collision(&self, ch: &Character) -> bool {
        self.queue
            .iter()
            .any(|o| o.collides_with(ch, self.canvas_height))
    }

    /// Append behind the newest building. `obstacle` must not sit left of it,
    /// or retirement from the front would skip buildings already off-screen.
    pub fn push(&mut self, obstacle: Obstacle) {
        debug_assert!(
            self.queue.back().is_none_or(|last| last.x <= obstacle.x),
            "obstacle pushed left of the newest one"
        );
        self.queue.push_back(obstacle);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.queue.iter()
    }

    pub fn front(&self) -> Option<&Obstacle> {
        self.queue.front()
    }

    pub fn back(&self) -> Option<&Obstacle> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
