//! Roster error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying a roster
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse roster: {0}")]
    Parse(String),

    /// The roster backend could not be reached; the decision may be retried
    #[error("Roster source unavailable: {0}")]
    Unavailable(String),
}

impl RosterError {
    /// Whether retrying the same lookup later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, RosterError::Unavailable(_) | RosterError::Io(_))
    }
}
