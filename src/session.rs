//! One play session: the state machine, the per-tick sequence and the input queue.
//!
//! Input never touches the entities directly. Handlers send [`Command`]s
//! through a [`Controller`]; the session drains them at the top of each tick,
//! so every mutation happens on the tick's single writer.

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::Rng;

use crate::character::Character;
use crate::config::{CanvasConfig, Config, Tuning};
use crate::error::GameResult;
use crate::stream::ObstacleStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    /// Absorbing until a restart.
    Terminal,
}

/// Where a flap came from. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Key,
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Flap(InputSource),
    Start,
    Restart,
}

/// Cloneable handle input handlers use to talk to a session.
#[derive(Debug, Clone)]
pub struct Controller {
    tx: Sender<Command>,
}

impl Controller {
    pub fn send(&self, cmd: Command) {
        // The session owns the receiver, so this only fails once it is gone.
        let _ = self.tx.send(cmd);
    }

    pub fn flap(&self, source: InputSource) {
        self.send(Command::Flap(source));
    }

    pub fn start(&self) {
        self.send(Command::Start);
    }

    pub fn restart(&self) {
        self.send(Command::Restart);
    }
}

/// What a call to [`Session::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing moved.
    Idle,
    Advanced { scored: u32 },
    /// The character hit a building this tick and the session is now terminal.
    Collided,
}

pub struct Session<R> {
    rng: R,
    canvas: CanvasConfig,
    tuning: Tuning,
    character: Character,
    obstacles: ObstacleStream,
    score: u32,
    best: u32,
    phase: Phase,
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl<R: Rng> Session<R> {
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn new(config: &Config, rng: R) -> GameResult<Self> {
        config.validate()?;
        let (tx, rx) = unbounded();
        Ok(Self {
            rng,
            canvas: config.canvas,
            tuning: config.tuning,
            character: Character::new(config.canvas.height, &config.tuning),
            obstacles: ObstacleStream::new(&config.canvas, &config.tuning),
            score: 0,
            best: 0,
            phase: Phase::Ready,
            tx,
            rx,
        })
    }

    pub fn controller(&self) -> Controller {
        Controller {
            tx: self.tx.clone(),
        }
    }

    /// Reset to a fresh character, a single building and zero score, then run.
    pub fn start(&mut self) {
        let restart = self.phase == Phase::Terminal;
        self.character = Character::new(self.canvas.height, &self.tuning);
        self.obstacles.seed(&mut self.rng);
        self.score = 0;
        self.phase = Phase::Running;
        tracing::info!(restart, best = self.best, "session started");
    }

    /// Drain queued input, then run one frame if the session is running.
    pub fn tick(&mut self) -> TickOutcome {
        self.drain_commands();
        if self.phase != Phase::Running {
            return TickOutcome::Idle;
        }

        self.character.advance();
        self.obstacles.maybe_spawn(&mut self.rng);

        let scored = self.obstacles.advance_and_retire();
        if scored > 0 {
            self.score += scored;
            tracing::debug!(score = self.score, "obstacle passed");
        }

        if self.obstacles.any_collision(&self.character) {
            self.phase = Phase::Terminal;
            self.best = self.best.max(self.score);
            tracing::info!(score = self.score, best = self.best, "collision, game over");
            return TickOutcome::Collided;
        }

        TickOutcome::Advanced { scored }
    }

    fn drain_commands(&mut self) {
        while let Ok(cmd) = self.rx.try_recv() {
            match (cmd, self.phase) {
                (Command::Flap(source), Phase::Running) => {
                    tracing::trace!(?source, "flap");
                    self.character.flap();
                }
                (Command::Flap(source), phase) => {
                    tracing::trace!(?source, ?phase, "flap ignored");
                }
                (Command::Start, Phase::Ready) | (Command::Restart, Phase::Terminal) => {
                    self.start();
                }
                (cmd, phase) => {
                    tracing::debug!(?cmd, ?phase, "command ignored");
                }
            }
        }
    }
}

impl<R> Session<R> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score reached by any run of this session.
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn obstacles(&self) -> &ObstacleStream {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleStream {
        &mut self.obstacles
    }
}
