use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flappy_sim::audio::Audio;
use flappy_sim::input::{self, Command, InputMode};
use flappy_sim::render::Renderer;
use flappy_sim::{Config, Engine, JumpOutcome, TickEvent};

#[derive(Parser)]
#[command(name = "flappy-sim")]
#[command(about = "Flappy Bird in your terminal")]
struct Cli {
    /// RON config file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed the pipe generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Disable sound effects
    #[arg(long)]
    mute: bool,
    /// Frame period in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,
    /// Write logs to this file (RUST_LOG filters, default "info")
    #[arg(long)]
    log: Option<PathBuf>,
    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if cli.mute {
        config.frontend.sound = false;
    }
    if let Some(ms) = cli.frame_ms {
        config.frontend.frame_ms = ms;
    }
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        println!("{}", config.to_ron_pretty()?);
        return Ok(());
    }

    let engine = match cli.seed {
        Some(seed) => Engine::with_seed(config.game.clone(), seed),
        None => Engine::new(config.game.clone()),
    }
    .context("building engine")?;
    info!(?config, seed = ?cli.seed, "starting");

    let mut guard = TerminalGuard::enter().context("setting up terminal")?;
    let result = run(engine, &config);
    let restored = guard.restore().context("restoring terminal");
    finish(result, restored)
}

/// The game's own error wins over a failure to restore the terminal.
fn finish(result: Result<()>, restored: Result<()>) -> Result<()> {
    result?;
    restored
}

/// Raw mode, alternate screen and mouse capture for the lifetime of a game.
/// Restores the terminal on drop if `restore` was never reached.
struct TerminalGuard {
    enhanced: bool,
    active: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on a failed step still unwinds through Drop.
        let mut guard = Self {
            enhanced: false,
            active: true,
        };
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            EnableMouseCapture,
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.enhanced = true;
        }
        Ok(guard)
    }

    /// Run every restore step, even after one fails, and report the first
    /// failure.
    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut out = stdout();
        first_error([
            if self.enhanced {
                execute!(out, PopKeyboardEnhancementFlags)
            } else {
                Ok(())
            },
            execute!(out, DisableMouseCapture),
            execute!(out, terminal::LeaveAlternateScreen),
            execute!(out, cursor::Show),
            execute!(out, terminal::EnableLineWrap),
            terminal::disable_raw_mode(),
        ])
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}

fn first_error(steps: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    let mut first = Ok(());
    for step in steps {
        if let Err(e) = step {
            if first.is_ok() {
                first = Err(e);
            }
        }
    }
    first
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// The scheduler: drain input, advance one tick, react, paint, sleep.
fn run(mut engine: Engine, config: &Config) -> Result<()> {
    let mut out = stdout();
    let audio = if config.frontend.sound {
        match Audio::open() {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!(error = %e, "audio unavailable, continuing muted");
                None
            }
        }
    } else {
        None
    };

    let (cols, rows) = terminal::size()?;
    let max_cols = config.frontend.pointer_mode_max_cols;
    let mut mode = InputMode::for_viewport(cols, max_cols);
    info!(?mode, cols, rows, "input mode");
    let mut renderer = Renderer::new(cols, rows);
    let mut best = 0;

    let frame_dur = Duration::from_millis(config.frontend.frame_ms);

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            match input::translate(&ev, mode) {
                Some(Command::Quit) => {
                    info!(best, "quit");
                    return Ok(());
                }
                Some(Command::Jump) => {
                    if engine.jump() == JumpOutcome::Restarted {
                        info!("restarted");
                    }
                }
                Some(Command::Resize { cols, rows }) => {
                    renderer.resize(cols, rows);
                    let next = InputMode::for_viewport(cols, max_cols);
                    if next != mode {
                        info!(from = ?mode, to = ?next, cols, "input mode changed");
                        mode = next;
                    }
                }
                None => {}
            }
        }

        if !engine.is_game_over() {
            for event in engine.tick() {
                match event {
                    TickEvent::Scored { .. } => play(&audio, Audio::play_score),
                    TickEvent::Crashed(cause) => {
                        best = best.max(engine.score());
                        info!(?cause, score = engine.score(), best, "game over");
                        play(&audio, Audio::play_death);
                    }
                    TickEvent::PipeSpawned { .. } => {}
                }
            }
        }

        renderer.draw(&engine, best);
        renderer.flush_to(&mut out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn play(
    audio: &Option<Audio>,
    effect: fn(&Audio) -> Result<(), flappy_sim::AudioError>,
) {
    if let Some(audio) = audio {
        if let Err(e) = effect(audio) {
            warn!(error = %e, "sound effect failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(msg: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, msg.to_string())
    }

    #[test]
    fn test_first_error_keeps_earliest_failure() {
        let err = first_error([Ok(()), Err(failed("pop")), Ok(()), Err(failed("raw"))]).unwrap_err();
        assert_eq!(err.to_string(), "pop");
        assert!(first_error([Ok(()), Ok(())]).is_ok());
    }

    #[test]
    fn test_first_error_consumes_every_step() {
        let mut ran = 0;
        let steps = (0..4).map(|i| {
            ran += 1;
            if i == 0 { Err(failed("first")) } else { Ok(()) }
        });
        assert!(first_error(steps).is_err());
        assert_eq!(ran, 4);
    }

    #[test]
    fn test_game_error_reported_before_restore_error() {
        let err = finish(Err(anyhow::anyhow!("game")), Err(anyhow::anyhow!("restore"))).unwrap_err();
        assert_eq!(err.to_string(), "game");
        let err = finish(Ok(()), Err(anyhow::anyhow!("restore"))).unwrap_err();
        assert_eq!(err.to_string(), "restore");
        assert!(finish(Ok(()), Ok(())).is_ok());
    }
}
