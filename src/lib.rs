//! Flappy Bird simulation core with a terminal front-end.
//!
//! [`engine::Engine`] owns all game state and advances it one tick at a time.
//! The remaining modules are the collaborators a playable program needs:
//! a half-block renderer, an input-source policy, and synthesized sound.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod render;

pub use config::{Config, FrontendConfig, GameConfig};
pub use engine::{Bird, CrashCause, Engine, JumpOutcome, Phase, Pipe, TickEvent};
pub use error::{AudioError, ConfigError};
