//! Error types for the collaborators around the engine.
//!
//! The engine itself has no failure modes: every lookup is total and every
//! creation path is idempotent. Only I/O, pattern text, and configuration
//! can fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read or write pattern: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected `x, y`, found {content:?}")]
    Malformed { line: usize, content: String },
}

#[derive(Debug, Error)]
pub enum LifeError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("{path}: {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: PatternError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = LifeError> = std::result::Result<T, E>;
