//! Timeouts for external calls

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-collaborator deadlines. Every external call made during a decision
/// is bounded by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub roster_ms: u64,
    pub ticketing_ms: u64,
    pub audit_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            roster_ms: 5_000,
            ticketing_ms: 10_000,
            audit_ms: 5_000,
        }
    }
}

impl TimeoutConfig {
    pub fn roster(&self) -> Duration {
        Duration::from_millis(self.roster_ms)
    }

    pub fn ticketing(&self) -> Duration {
        Duration::from_millis(self.ticketing_ms)
    }

    pub fn audit(&self) -> Duration {
        Duration::from_millis(self.audit_ms)
    }
}
