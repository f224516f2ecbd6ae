//! Decision outcomes and their queue dispositions.

use super::error::EngineError;
use crate::audit::RecordOutcome;
use serde::Serialize;
use std::fmt;

/// Point of the commit protocol at which a competing claim was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaceStage {
    /// The holder appeared between pre-check and post-check
    PostCheck,
    /// The system of record rejected the commit
    Commit,
}

impl fmt::Display for RaceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceStage::PostCheck => f.write_str("post-check"),
            RaceStage::Commit => f.write_str("commit"),
        }
    }
}

/// What the queue consumer should do with the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Drop the message; nothing left to do
    Acknowledge,
    /// Leave the item unclaimed and re-check later
    Defer,
    /// Redeliver; the failure may clear up
    Retry,
    /// Park the message; retrying will not help
    DeadLetter,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Disposition::Acknowledge => "acknowledge",
            Disposition::Defer => "defer",
            Disposition::Retry => "retry",
            Disposition::DeadLetter => "dead-letter",
        };
        f.write_str(s)
    }
}

/// Result of one decision. Every variant is a normal return value.
#[derive(Debug)]
pub enum DecisionOutcome {
    Assigned {
        candidate_id: String,
        candidate_name: String,
        final_weight: f64,
        rationale: String,
    },
    /// No eligible candidate after filtering
    NoCandidate,
    /// The item was already held at pre-check
    AlreadyAssigned { holder: String },
    /// Another process claimed the item during this decision
    RaceLost {
        holder: Option<String>,
        stage: RaceStage,
    },
    Failed(EngineError),
}

impl DecisionOutcome {
    pub fn disposition(&self) -> Disposition {
        match self {
            DecisionOutcome::Assigned { .. }
            | DecisionOutcome::AlreadyAssigned { .. }
            | DecisionOutcome::RaceLost { .. } => Disposition::Acknowledge,
            DecisionOutcome::NoCandidate => Disposition::Defer,
            DecisionOutcome::Failed(e) if e.is_transient() => Disposition::Retry,
            DecisionOutcome::Failed(_) => Disposition::DeadLetter,
        }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        self.record_outcome().as_str()
    }

    pub fn record_outcome(&self) -> RecordOutcome {
        match self {
            DecisionOutcome::Assigned { .. } => RecordOutcome::Assigned,
            DecisionOutcome::NoCandidate => RecordOutcome::NoCandidate,
            DecisionOutcome::AlreadyAssigned { .. } => RecordOutcome::AlreadyAssigned,
            DecisionOutcome::RaceLost { .. } => RecordOutcome::CommitLostRace,
            DecisionOutcome::Failed(_) => RecordOutcome::Failed,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, DecisionOutcome::Assigned { .. })
    }

    /// Id of the assigned candidate, if any
    pub fn assignee(&self) -> Option<&str> {
        match self {
            DecisionOutcome::Assigned { candidate_id, .. } => Some(candidate_id),
            _ => None,
        }
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionOutcome::Assigned {
                candidate_name,
                final_weight,
                ..
            } => write!(f, "assigned to {} (weight {:.4})", candidate_name, final_weight),
            DecisionOutcome::NoCandidate => f.write_str("no eligible candidate"),
            DecisionOutcome::AlreadyAssigned { holder } => {
                write!(f, "already assigned to {}", holder)
            }
            DecisionOutcome::RaceLost { holder, stage } => match holder {
                Some(holder) => write!(f, "lost race at {} to {}", stage, holder),
                None => write!(f, "lost race at {}", stage),
            },
            DecisionOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}
