//! Decision audit trail.
//!
//! Every processing attempt produces exactly one [`DecisionRecord`],
//! whatever its outcome. Records are append-only and carry the full ranked
//! score snapshot so a decision can be replayed and explained later.
//!
//! Persistence goes through [`DecisionRecorder`], which bounds the store
//! call with a timeout and never lets a persistence failure reach the
//! caller: an assignment that was committed stays committed and is
//! reported as such.

pub mod error;
pub mod store;

pub use error::AuditError;
pub use store::{AuditStore, JsonlAuditStore, MemoryAuditStore};

use crate::scoring::{CompositeWeights, ScoredCandidate};
use crate::ticketing::WorkItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Outcome label stored with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOutcome {
    Assigned,
    NoCandidate,
    AlreadyAssigned,
    CommitLostRace,
    Failed,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOutcome::Assigned => "assigned",
            RecordOutcome::NoCandidate => "no-candidate",
            RecordOutcome::AlreadyAssigned => "already-assigned",
            RecordOutcome::CommitLostRace => "commit-lost-race",
            RecordOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable audit entry for one assignment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub record_id: Uuid,
    pub work_item_id: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,
    /// Ranked score snapshot, serialized JSON array, best first
    pub candidates: String,
    pub weights: CompositeWeights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub outcome: RecordOutcome,
    /// Holder, race stage or error message, depending on the outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl DecisionRecord {
    /// Start a record for an item; the candidate snapshot is empty.
    pub fn new(item: &WorkItem, outcome: RecordOutcome, recorded_at: DateTime<Utc>) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            work_item_id: item.id.clone(),
            group_id: item.group_id.clone(),
            winner_id: None,
            winner_name: None,
            priority: item.priority,
            severity: item.severity,
            candidates: "[]".to_string(),
            weights: CompositeWeights::default(),
            rationale: None,
            outcome,
            detail: None,
            recorded_at,
        }
    }

    /// Attach the ranked snapshot.
    ///
    /// Fails only when a score cannot be represented in JSON.
    pub fn with_candidates(
        mut self,
        candidates: &[ScoredCandidate],
        weights: CompositeWeights,
    ) -> Result<Self, AuditError> {
        self.candidates = serde_json::to_string(candidates)?;
        self.weights = weights;
        Ok(self)
    }

    pub fn with_winner(mut self, winner: &ScoredCandidate) -> Self {
        self.winner_id = Some(winner.candidate_id.clone());
        self.winner_name = Some(winner.candidate_name.clone());
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Decode the candidate snapshot
    pub fn scored_candidates(&self) -> Result<Vec<ScoredCandidate>, AuditError> {
        Ok(serde_json::from_str(&self.candidates)?)
    }
}

/// Writes decision records without ever failing the decision.
#[derive(Clone)]
pub struct DecisionRecorder {
    store: Arc<dyn AuditStore>,
    timeout: Duration,
}

impl DecisionRecorder {
    pub fn new(store: Arc<dyn AuditStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Persist a record built by the caller.
    ///
    /// A record that could not be built is an invariant violation; it is
    /// logged at error level and otherwise ignored, like a store failure.
    /// Returns whether the record reached the store.
    pub async fn record(&self, record: Result<DecisionRecord, AuditError>) -> bool {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Invariant violation: decision record could not be constructed"
                );
                metrics::counter!("assignd_audit_failures_total", "reason" => "invariant")
                    .increment(1);
                return false;
            }
        };

        let result = match tokio::time::timeout(self.timeout, self.store.append(&record)).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    record_id = %record.record_id,
                    work_item = %record.work_item_id,
                    outcome = %record.outcome,
                    "Decision recorded"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    record_id = %record.record_id,
                    work_item = %record.work_item_id,
                    outcome = %record.outcome,
                    error = %e,
                    "Failed to persist decision record"
                );
                metrics::counter!("assignd_audit_failures_total", "reason" => "store")
                    .increment(1);
                false
            }
        }
    }
}

impl fmt::Debug for DecisionRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionRecorder")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
