//! Error types for ticketing system operations.

use thiserror::Error;

/// Errors that can occur when talking to the system of record.
#[derive(Error, Debug)]
pub enum TicketingError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Ticketing system returned an error response (4xx, 5xx).
    #[error("Ticketing error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The work item does not exist in the system of record.
    #[error("Work item not found: {0}")]
    NotFound(String),

    /// Response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration error (missing credentials, bad URL).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TicketingError {
    /// Whether the failed call may succeed if the whole decision is retried.
    pub fn is_transient(&self) -> bool {
        match self {
            TicketingError::Network(_) | TicketingError::Timeout(_) => true,
            TicketingError::Upstream { status, .. } => *status >= 500 || *status == 429,
            TicketingError::NotFound(_)
            | TicketingError::InvalidResponse(_)
            | TicketingError::Configuration(_) => false,
        }
    }
}
