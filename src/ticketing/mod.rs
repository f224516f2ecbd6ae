//! Ticketing system abstraction.
//!
//! The ticketing system is the system of record for work items. The engine
//! reads the current holder of an item, lists a candidate's open items for
//! workload scoring, and issues the single mutating call that commits an
//! assignment. No lock is offered by the system of record; callers guard
//! the holder field optimistically (see [`crate::engine`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod memory;
pub mod servicenow;

pub use error::TicketingError;
pub use memory::InMemoryTicketing;
pub use servicenow::ServiceNowTicketing;

/// The unit being routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    /// Owning group; candidates are drawn from this group's roster
    pub group_id: String,
    /// 1 (most urgent) to 5
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,
    pub opened_at: DateTime<Utc>,
    /// Present when the item is already claimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

impl WorkItem {
    pub fn new(
        id: impl Into<String>,
        group_id: impl Into<String>,
        priority: u8,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            priority,
            severity: None,
            opened_at,
            holder: None,
        }
    }

    pub fn with_severity(mut self, severity: u8) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }
}

/// An item currently held by a candidate, as seen for workload scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenItem {
    pub id: String,
    /// Missing priorities are scored as P4
    #[serde(default)]
    pub priority: Option<u8>,
}

impl OpenItem {
    pub fn new(id: impl Into<String>, priority: u8) -> Self {
        Self {
            id: id.into(),
            priority: Some(priority),
        }
    }
}

/// Result of the commit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    Committed,
    /// The system of record rejected the write because of a competing claim
    Conflict { holder: Option<String> },
}

/// Read/write access to the system of record.
///
/// # Cancellation Safety
///
/// `commit_assignment` is the only mutating call and is atomic from the
/// engine's perspective: it either reports success or it does not. Dropping
/// its future never leaves a partially committed item.
#[async_trait]
pub trait TicketingSystem: Send + Sync + 'static {
    /// Current holder of a work item, `None` when unclaimed.
    ///
    /// Returns `Err(TicketingError::NotFound)` for unknown items.
    async fn get_holder(&self, item_id: &str) -> Result<Option<String>, TicketingError>;

    /// Assign the item to the candidate.
    ///
    /// A competing write is reported as `Ok(CommitResult::Conflict)`, never
    /// as an error, so that callers do not mistake it for a retryable
    /// infrastructure failure.
    async fn commit_assignment(
        &self,
        item_id: &str,
        candidate_id: &str,
    ) -> Result<CommitResult, TicketingError>;

    /// Items currently open and held by the candidate.
    async fn list_open_items(&self, candidate_id: &str) -> Result<Vec<OpenItem>, TicketingError>;

    /// Cheap reachability probe.
    async fn health_check(&self) -> Result<(), TicketingError> {
        Ok(())
    }
}
