//! Simulation errors

use std::path::PathBuf;

use thiserror::Error;

/// Simulation result type
pub type Result<T> = std::result::Result<T, McError>;

/// Errors raised while configuring or running a Monte Carlo simulation
#[derive(Debug, Error)]
pub enum McError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid step count {input:?}: expected a non-negative integer")]
    StepCount { input: String },

    #[error("starting configuration {path}: {message}")]
    StartingConfiguration { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl McError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        McError::Io {
            path: path.into(),
            source,
        }
    }
}
