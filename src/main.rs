use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute, terminal,
};
use rand::{SeedableRng, rngs::StdRng};

use flappy_vibe::assets::Assets;
use flappy_vibe::audio::Audio;
use flappy_vibe::config::LogConfig;
use flappy_vibe::render::{PixelBuf, Viewport, draw_scene};
use flappy_vibe::{Config, GameError, GameResult, InputSource, Phase, Session, TickOutcome};

// ── Logging ─────────────────────────────────────────────────────────────────

fn init_logging(cfg: &LogConfig) -> GameResult<()> {
    let Some(path) = &cfg.file else {
        return Ok(());
    };
    let level: tracing::Level = cfg
        .level
        .parse()
        .map_err(|_| GameError::Logging(format!("unknown log level {:?}", cfg.level)))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| GameError::Logging(format!("{}: {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .try_init()
        .map_err(|e| GameError::Logging(e.to_string()))
}

// ── Frame loop ──────────────────────────────────────────────────────────────

struct Game {
    config: Config,
    session: Session<StdRng>,
    assets: Assets,
    audio: Option<Audio>,
}

impl Game {
    fn run(&mut self, out: &mut io::Stdout) -> GameResult<()> {
        let (cols, rows) = terminal::size()?;
        let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
        let controller = self.session.controller();
        let frame_dur = Duration::from_secs_f64(1.0 / self.config.canvas.frame_rate as f64);

        loop {
            let frame_start = Instant::now();

            // Input. Terminals report taps as mouse presses, so touch arrives as Pointer.
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char(' ') | KeyCode::Up => controller.flap(InputSource::Key),
                        KeyCode::Enter => match self.session.phase() {
                            Phase::Ready => controller.start(),
                            Phase::Terminal => controller.restart(),
                            Phase::Running => {}
                        },
                        KeyCode::Char('r') => controller.restart(),
                        _ => {}
                    },
                    Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                        controller.flap(InputSource::Pointer);
                    }
                    Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                    _ => {}
                }
            }

            self.assets.poll();

            // Update
            if self.session.tick() == TickOutcome::Collided {
                if let Some(audio) = &self.audio {
                    audio.play_crash();
                }
            }

            // Render
            let mut viewport =
                Viewport::new(&mut buf, self.config.canvas.width, self.config.canvas.height);
            draw_scene(&mut viewport, &self.session, &self.assets);
            buf.render(out)?;

            // Frame pacing
            let elapsed = frame_start.elapsed();
            if elapsed < frame_dur {
                std::thread::sleep(frame_dur - elapsed);
            }
        }
    }
}

fn restore_terminal(out: &mut io::Stdout) -> GameResult<()> {
    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    Ok(())
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> GameResult<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    init_logging(&config.log)?;
    tracing::info!(canvas = ?config.canvas, tuning = ?config.tuning, "starting");

    let audio = if config.audio.enabled {
        Audio::open()
            .map_err(|e| tracing::warn!(error = %e, "playing without sound"))
            .ok()
    } else {
        None
    };

    let mut game = Game {
        assets: Assets::load_in_background(&config.assets),
        session: Session::new(&config, StdRng::from_entropy())?,
        audio,
        config,
    };

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    let result = execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )
    .map_err(GameError::from)
    .and_then(|()| game.run(&mut out));

    let restored = restore_terminal(&mut out);
    if let Err(e) = &result {
        tracing::error!(error = %e, "game loop failed");
    }
    tracing::info!(best = game.session.best(), "exiting");
    result.and(restored)
}
