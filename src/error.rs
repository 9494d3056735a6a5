use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading session exports.
#[derive(Error, Debug)]
pub enum SwimError {
    #[error("{} is missing required columns: {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("{} has no header row after the metadata preamble", path.display())]
    MissingHeader { path: PathBuf },

    #[error("failed to read session export: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read session export: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a duration cell could not be turned into seconds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("invalid duration component {token:?} in {input:?}")]
    InvalidToken { input: String, token: String },
}

pub type Result<T, E = SwimError> = std::result::Result<T, E>;
