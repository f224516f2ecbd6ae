use thiserror::Error;

/// Errors raised while building or persisting a decision record
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize decision record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit store did not respond within {0}ms")]
    Timeout(u64),

    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}
