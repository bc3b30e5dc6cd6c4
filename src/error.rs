use std::path::PathBuf;

use thiserror::Error;

/// Configuration rejected before an engine or front-end is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pipe gap {gap} must be smaller than screen height {screen_height}")]
    GapTooLarge { gap: f64, screen_height: f64 },
    #[error("spawn period must be at least one tick")]
    ZeroSpawnPeriod,
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("lift must push the bird upward (negative), got {0}")]
    LiftNotUpward(f64),
    #[error("max upward velocity must not be positive, got {0}")]
    UpwardCapPositive(f64),
    #[error("bird height {bird_height} does not fit on a screen {screen_height} tall")]
    BirdTooTall { bird_height: f64, screen_height: f64 },
    #[error("initial y {initial_y} places the bird outside the playfield")]
    BirdOutOfBounds { initial_y: f64 },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("failed to open audio sink: {0}")]
    Play(#[from] rodio::PlayError),
}
