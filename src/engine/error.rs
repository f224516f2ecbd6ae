//! Error types for failed decisions

use crate::roster::RosterError;
use crate::ticketing::TicketingError;
use std::fmt;
use thiserror::Error;

/// External call made during a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalCall {
    Roster,
    PreCheck,
    OpenItems,
    PostCheck,
    Commit,
}

impl ExternalCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalCall::Roster => "roster",
            ExternalCall::PreCheck => "pre-check",
            ExternalCall::OpenItems => "open-items",
            ExternalCall::PostCheck => "post-check",
            ExternalCall::Commit => "commit",
        }
    }
}

impl fmt::Display for ExternalCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a decision could not be completed
#[derive(Debug, Error)]
pub enum EngineError {
    /// An external call exceeded its deadline
    #[error("{call} call timed out after {timeout_ms}ms")]
    Timeout { call: ExternalCall, timeout_ms: u64 },

    #[error("roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("ticketing error: {0}")]
    Ticketing(#[from] TicketingError),

    /// The system of record has no such work item
    #[error("work item not found: {0}")]
    WorkItemNotFound(String),
}

impl EngineError {
    /// Whether the whole decision should be retried later
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Timeout { .. } => true,
            EngineError::Roster(e) => e.is_transient(),
            EngineError::Ticketing(e) => e.is_transient(),
            EngineError::WorkItemNotFound(_) => false,
        }
    }

    /// Map a ticketing failure, lifting "not found" out of the transport error
    pub(crate) fn from_ticketing(item_id: &str, error: TicketingError) -> Self {
        match error {
            TicketingError::NotFound(_) => EngineError::WorkItemNotFound(item_id.to_string()),
            other => EngineError::Ticketing(other),
        }
    }
}
