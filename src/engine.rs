//! The simulation engine: one bird, a queue of scrolling pipes, and the
//! per-tick rules that move, spawn, collide and score them.
//!
//! The engine never schedules itself and never draws. A driver calls
//! [`Engine::tick`] once per frame and [`Engine::jump`] once per input event;
//! a renderer reads state through the accessors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    /// Offset of the box's top edge from the top of the screen.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// px/tick, positive is downward.
    pub velocity: f64,
    /// Ticks left before another jump is accepted.
    pub jump_cooldown: u32,
}

impl Bird {
    fn spawn(config: &GameConfig) -> Self {
        Self {
            x: config.bird_x,
            y: config.initial_y,
            width: config.bird_width,
            height: config.bird_height,
            velocity: 0.0,
            jump_cooldown: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub top_height: f64,
    pub bottom_height: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashCause {
    Floor,
    Ceiling,
    Pipe,
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    PipeSpawned { top_height: f64 },
    Scored { score: u32 },
    Crashed(CrashCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Flapped,
    /// Ignored: the cooldown from the previous jump is still running.
    CoolingDown,
    /// The game was over; the press restarted it instead of flapping.
    Restarted,
}

pub struct Engine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
    bird: Bird,
    pipes: Vec<Pipe>,
    score: u32,
    frame_count: u64,
    game_over: bool,
}

impl Engine<StdRng> {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            bird: Bird::spawn(&config),
            config,
            rng,
            pipes: Vec::new(),
            score: 0,
            frame_count: 0,
            game_over: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    /// Active pipes in spawn order.
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else {
            Phase::Running
        }
    }

    pub fn reset(&mut self) {
        debug!(score = self.score, frames = self.frame_count, "reset");
        self.bird = Bird::spawn(&self.config);
        self.pipes.clear();
        self.score = 0;
        self.frame_count = 0;
        self.game_over = false;
    }

    /// Player input. Restarts a finished game, otherwise flaps unless the
    /// cooldown is still running.
    pub fn jump(&mut self) -> JumpOutcome {
        if self.game_over {
            self.reset();
            return JumpOutcome::Restarted;
        }
        if self.bird.jump_cooldown > 0 {
            return JumpOutcome::CoolingDown;
        }
        self.bird.velocity =
            (self.bird.velocity + self.config.lift).max(self.config.max_upward_velocity);
        self.bird.jump_cooldown = self.config.cooldown_ticks;
        JumpOutcome::Flapped
    }

    /// Advance one frame. Does nothing once the game is over.
    ///
    /// A floor or ceiling hit ends the tick immediately: no pipe moves,
    /// spawns or scores and the frame counter stays where it was. A pipe hit
    /// still lets the remaining pipes of the same tick scroll and score.
    pub fn tick(&mut self) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        let bird = &mut self.bird;
        bird.velocity += self.config.gravity;
        bird.y += bird.velocity;
        bird.jump_cooldown = bird.jump_cooldown.saturating_sub(1);

        let bounds_hit = if bird.y + bird.height >= self.config.screen_height {
            Some(CrashCause::Floor)
        } else if bird.y <= 0.0 {
            Some(CrashCause::Ceiling)
        } else {
            None
        };
        if let Some(cause) = bounds_hit {
            self.crash(cause, &mut events);
            return events;
        }

        if self.frame_count % self.config.spawn_period == 0 {
            let top_height = self.spawn_pipe();
            events.push(TickEvent::PipeSpawned { top_height });
        }

        let mut hit_pipe = false;
        let Self {
            config,
            bird,
            pipes,
            score,
            ..
        } = self;
        pipes.retain_mut(|pipe| {
            pipe.x -= config.scroll_speed;

            let overlaps_span = bird.x < pipe.x + config.pipe_width && bird.x + bird.width > pipe.x;
            let outside_gap = bird.y < pipe.top_height
                || bird.y + bird.height > config.screen_height - pipe.bottom_height;
            if overlaps_span && outside_gap {
                hit_pipe = true;
            }

            if !pipe.passed && pipe.x + config.pipe_width < bird.x {
                pipe.passed = true;
                *score += 1;
                trace!(score = *score, "pipe passed");
                events.push(TickEvent::Scored { score: *score });
            }

            pipe.x + config.pipe_width >= 0.0
        });
        if hit_pipe {
            self.crash(CrashCause::Pipe, &mut events);
        }

        self.frame_count += 1;
        events
    }

    fn spawn_pipe(&mut self) -> f64 {
        let span = self.config.screen_height - self.config.pipe_gap;
        let top_height = self.rng.gen_range(0.0..span).floor();
        self.pipes.push(Pipe {
            x: self.config.screen_width,
            top_height,
            bottom_height: self.config.screen_height - top_height - self.config.pipe_gap,
            passed: false,
        });
        trace!(frame = self.frame_count, top_height, "pipe spawned");
        top_height
    }

    fn crash(&mut self, cause: CrashCause, events: &mut Vec<TickEvent>) {
        self.game_over = true;
        debug!(?cause, score = self.score, frame = self.frame_count, "crashed");
        events.push(TickEvent::Crashed(cause));
    }
}
