use thiserror::Error;

use crate::state::Channel;

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the simulation core and the source manager.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("grid resolution must be positive, got {0}")]
    InvalidResolution(usize),

    #[error("relaxation iterations must be at least 1, got {0}")]
    InvalidIterations(usize),

    #[error("length scale must be positive and finite, got {0}")]
    InvalidLengthScale(f64),

    #[error("{channel:?} array has {actual} cells, grid holds {expected}")]
    SizeMismatch {
        channel: Channel,
        expected: usize,
        actual: usize,
    },

    #[error("cell index {index} out of range for grid of {size} cells")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("source manager built for N={expected}, simulation has N={actual}")]
    GridMismatch { expected: usize, actual: usize },

    #[error("source manager placed cells for length scale {expected}, simulation now has {actual}")]
    LengthScaleMismatch { expected: f64, actual: f64 },
}

/// Errors raised while loading a scene configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
