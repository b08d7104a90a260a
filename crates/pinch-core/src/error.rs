use thiserror::Error;

/// Errors produced by the pure game logic.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A detector frame that cannot be turned into a [`crate::HandLandmarks`].
#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// A tunable outside the range the game logic can work with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("pinch threshold must be positive and finite, got {0}")]
    PinchThreshold(f32),
    #[error("hit tolerance must be positive, got {0}s")]
    HitTolerance(f64),
    #[error("volume bounds must satisfy 0 <= low <= high <= 1, got [{low}, {high}]")]
    VolumeBounds { low: f32, high: f32 },
    #[error("volume decay rate must be non-negative, got {0}")]
    VolumeDecay(f32),
    #[error("spawn interval must be positive, got {0}s")]
    SpawnInterval(f64),
    #[error("spawn probability must be within [0, 1], got {0}")]
    SpawnProbability(f64),
    #[error("chart note {index} has a non-finite time {time_sec}")]
    ChartTime { index: usize, time_sec: f64 },
    #[error("note fall speed must be positive, got {0} px/s")]
    FallSpeed(f32),
    #[error("hit line ({hit_line_y}) must be below the spawn point ({spawn_y})")]
    Geometry { spawn_y: f32, hit_line_y: f32 },
}
