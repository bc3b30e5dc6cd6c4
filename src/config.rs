//! Startup configuration.
//!
//! Game constants are tuned for a fixed tick rate and are never changed
//! while a game runs. Files are RON; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Physics, world and obstacle constants for one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Downward acceleration, px/tick².
    pub gravity: f64,
    /// Velocity added by a jump. Negative is upward.
    pub lift: f64,
    /// Floor on the upward (negative) velocity a jump can produce.
    pub max_upward_velocity: f64,
    /// Ticks between accepted jumps.
    pub cooldown_ticks: u32,
    pub pipe_width: f64,
    /// Height of the gap band between a pipe's two segments.
    pub pipe_gap: f64,
    /// A pipe spawns whenever `frame_count % spawn_period == 0`.
    pub spawn_period: u64,
    /// Leftward pipe motion, px/tick.
    pub scroll_speed: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    pub bird_x: f64,
    pub bird_width: f64,
    pub bird_height: f64,
    pub initial_y: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            lift: -5.0,
            max_upward_velocity: -7.0,
            cooldown_ticks: 15,
            pipe_width: 50.0,
            pipe_gap: 150.0,
            spawn_period: 90,
            scroll_speed: 2.0,
            screen_width: 400.0,
            screen_height: 400.0,
            bird_x: 50.0,
            bird_width: 20.0,
            bird_height: 20.0,
            initial_y: 150.0,
        }
    }
}

impl GameConfig {
    /// Reject configurations that would make spawning or the playfield
    /// ill-defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("gravity", self.gravity),
            ("lift", self.lift),
            ("max_upward_velocity", self.max_upward_velocity),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("scroll_speed", self.scroll_speed),
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("bird_x", self.bird_x),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
            ("initial_y", self.initial_y),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let positive = [
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("scroll_speed", self.scroll_speed),
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.pipe_gap >= self.screen_height {
            return Err(ConfigError::GapTooLarge {
                gap: self.pipe_gap,
                screen_height: self.screen_height,
            });
        }
        if self.spawn_period == 0 {
            return Err(ConfigError::ZeroSpawnPeriod);
        }
        if self.lift >= 0.0 {
            return Err(ConfigError::LiftNotUpward(self.lift));
        }
        if self.max_upward_velocity > 0.0 {
            return Err(ConfigError::UpwardCapPositive(self.max_upward_velocity));
        }
        if self.bird_height >= self.screen_height {
            return Err(ConfigError::BirdTooTall {
                bird_height: self.bird_height,
                screen_height: self.screen_height,
            });
        }
        if self.initial_y <= 0.0 || self.initial_y + self.bird_height >= self.screen_height {
            return Err(ConfigError::BirdOutOfBounds {
                initial_y: self.initial_y,
            });
        }
        Ok(())
    }
}

/// Terminal front-end options. None of these reach the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Nominal frame period in milliseconds.
    pub frame_ms: u64,
    /// Viewports this narrow or narrower take pointer input instead of keys.
    pub pointer_mode_max_cols: u16,
    pub sound: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            pointer_mode_max_cols: 60,
            sound: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub frontend: FrontendConfig,
}

impl Config {
    /// Parse and check the game constants. Front-end options may still be
    /// overridden from the command line, so [`Config::validate`] covers them
    /// once overrides are applied.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(s)?;
        config.game.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frontend.frame_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "frame_ms",
                value: 0.0,
            });
        }
        self.game.validate()
    }

    pub fn to_ron_pretty(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}
