//! Assignment decision engine.
//!
//! Runs one decision per work item:
//!
//! 1. **Pre-check**: read the item's holder. A held item ends the decision
//!    with [`DecisionOutcome::AlreadyAssigned`].
//! 2. **Score**: fetch the group roster, drop inactive members, evaluate
//!    availability, fetch each eligible candidate's open items and rank.
//! 3. **Post-check**: read the holder again right before committing. A
//!    holder that appeared since step 1 ends with
//!    [`DecisionOutcome::RaceLost`].
//! 4. **Commit**: a conflict reported by the system of record is also a
//!    lost race, never a retryable failure.
//! 5. **Record**: exactly one [`DecisionRecord`] per call, whatever the
//!    outcome.
//!
//! The double check narrows the race window but cannot close it; no lock
//! exists on the item. Every external call is bounded by a timeout, and a
//! timeout is a transient failure. External calls within one decision are
//! issued sequentially and in protocol order.

pub mod clock;
pub mod error;
pub mod outcome;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EngineError, ExternalCall};
pub use outcome::{DecisionOutcome, Disposition, RaceStage};

use crate::audit::{AuditError, DecisionRecord, DecisionRecorder};
use crate::config::TimeoutConfig;
use crate::roster::{Candidate, RosterSource};
use crate::scoring::{
    availability, rank, score_candidate, EvaluationReference, Ranking, ScoredCandidate,
    ScoringPolicy, TieBreaker,
};
use crate::ticketing::{CommitResult, TicketingSystem, WorkItem};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Run an external call under a deadline
async fn bounded<T, E, F>(call: ExternalCall, limit: Duration, fut: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, E>>,
    EngineError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(EngineError::from),
        Err(_) => Err(EngineError::Timeout {
            call,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

/// Routes work items to group members.
///
/// Holds only immutable state, so one engine can serve any number of
/// concurrent decisions.
pub struct AssignmentEngine {
    roster: Arc<dyn RosterSource>,
    ticketing: Arc<dyn TicketingSystem>,
    recorder: DecisionRecorder,
    policy: Arc<ScoringPolicy>,
    tie_breaker: Arc<dyn TieBreaker>,
    clock: Arc<dyn Clock>,
    timeouts: TimeoutConfig,
}

impl AssignmentEngine {
    pub fn new(
        roster: Arc<dyn RosterSource>,
        ticketing: Arc<dyn TicketingSystem>,
        recorder: DecisionRecorder,
        policy: Arc<ScoringPolicy>,
    ) -> Self {
        let tie_breaker = policy.tie_breaker();
        Self {
            roster,
            ticketing,
            recorder,
            policy,
            tie_breaker,
            clock: Arc::new(SystemClock),
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_tie_breaker(mut self, tie_breaker: Arc<dyn TieBreaker>) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Instant at which shift windows are evaluated for an item
    pub fn evaluation_instant(&self, item: &WorkItem) -> DateTime<Utc> {
        match self.policy.availability.reference {
            EvaluationReference::Now => self.clock.now(),
            EvaluationReference::OpenedAt => item.opened_at,
        }
    }

    /// Run the full decision protocol for one work item.
    ///
    /// Never returns an error: failures are reported as
    /// [`DecisionOutcome::Failed`] so the caller can pick a disposition.
    pub async fn decide(&self, item: &WorkItem) -> DecisionOutcome {
        let span = tracing::info_span!(
            "decision",
            work_item = %item.id,
            group = %item.group_id,
            priority = item.priority
        );

        async move {
            let started = Instant::now();
            let mut ranking = None;

            let outcome = self.run(item, &mut ranking).await;
            self.record(item, &outcome, ranking.as_ref()).await;

            metrics::counter!("assignd_decisions_total", "outcome" => outcome.kind())
                .increment(1);
            metrics::histogram!("assignd_decision_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            outcome
        }
        .instrument(span)
        .await
    }

    /// Score and rank a group without touching any work item.
    ///
    /// Returns `Ok(None)` when no candidate is eligible.
    pub async fn rank_group(
        &self,
        group_id: &str,
        instant: DateTime<Utc>,
    ) -> Result<Option<Ranking>, EngineError> {
        let scored = self.score_group(group_id, instant).await?;
        Ok(rank(scored, self.tie_breaker.as_ref()).ok())
    }

    async fn run(&self, item: &WorkItem, ranking: &mut Option<Ranking>) -> DecisionOutcome {
        match self.holder(item, ExternalCall::PreCheck).await {
            Err(e) => return self.failed(e),
            Ok(Some(holder)) => {
                tracing::info!(holder = %holder, "Work item already assigned, skipping");
                return DecisionOutcome::AlreadyAssigned { holder };
            }
            Ok(None) => {}
        }

        let instant = self.evaluation_instant(item);
        let scored = match self.score_group(&item.group_id, instant).await {
            Ok(scored) => scored,
            Err(e) => return self.failed(e),
        };

        let ranked = match rank(scored, self.tie_breaker.as_ref()) {
            Ok(ranked) => ranked,
            Err(_) => {
                tracing::info!("No eligible candidate, leaving work item unclaimed");
                return DecisionOutcome::NoCandidate;
            }
        };
        let winner = ranked.winner().clone();
        let rationale = ranked.rationale();
        *ranking = Some(ranked);

        match self.holder(item, ExternalCall::PostCheck).await {
            Err(e) => return self.failed(e),
            Ok(Some(holder)) => {
                tracing::info!(holder = %holder, "Work item claimed during scoring, not committing");
                return DecisionOutcome::RaceLost {
                    holder: Some(holder),
                    stage: RaceStage::PostCheck,
                };
            }
            Ok(None) => {}
        }

        self.commit(item, winner, rationale).await
    }

    async fn commit(
        &self,
        item: &WorkItem,
        winner: ScoredCandidate,
        rationale: String,
    ) -> DecisionOutcome {
        let result = bounded(ExternalCall::Commit, self.timeouts.ticketing(), async {
            self.ticketing
                .commit_assignment(&item.id, &winner.candidate_id)
                .await
                .map_err(|e| EngineError::from_ticketing(&item.id, e))
        })
        .await;

        match result {
            Ok(CommitResult::Committed) => {
                tracing::info!(
                    candidate = %winner.candidate_id,
                    final_weight = winner.final_weight,
                    "Work item assigned"
                );
                DecisionOutcome::Assigned {
                    candidate_id: winner.candidate_id,
                    candidate_name: winner.candidate_name,
                    final_weight: winner.final_weight,
                    rationale,
                }
            }
            Ok(CommitResult::Conflict { holder }) => {
                tracing::info!(
                    candidate = %winner.candidate_id,
                    holder = ?holder,
                    "Commit rejected by system of record, race lost"
                );
                DecisionOutcome::RaceLost {
                    holder,
                    stage: RaceStage::Commit,
                }
            }
            Err(e) => self.failed(e),
        }
    }

    async fn holder(
        &self,
        item: &WorkItem,
        call: ExternalCall,
    ) -> Result<Option<String>, EngineError> {
        bounded(call, self.timeouts.ticketing(), async {
            self.ticketing
                .get_holder(&item.id)
                .await
                .map_err(|e| EngineError::from_ticketing(&item.id, e))
        })
        .await
    }

    async fn score_group(
        &self,
        group_id: &str,
        instant: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let roster = bounded(
            ExternalCall::Roster,
            self.timeouts.roster(),
            self.roster.candidates(group_id),
        )
        .await?;

        let candidates = self.filter_roster(group_id, roster);
        let local = self.policy.availability.local_instant(instant);

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let availability = availability::evaluate(candidate, local, &self.policy.availability);
            if !availability.eligible {
                tracing::debug!(candidate = %candidate.id, "Excluded: not weekend eligible");
                continue;
            }

            let open_items = bounded(
                ExternalCall::OpenItems,
                self.timeouts.ticketing(),
                self.ticketing.list_open_items(&candidate.id),
            )
            .await?;

            scored.push(score_candidate(
                candidate,
                &availability,
                &open_items,
                &self.policy,
            ));
        }

        Ok(scored)
    }

    /// Drop inactive members and apply the candidate cap, keeping roster order
    fn filter_roster(&self, group_id: &str, roster: Vec<Candidate>) -> Vec<Candidate> {
        let max = self.policy.ranking.max_candidates;
        let mut active: Vec<Candidate> = roster
            .into_iter()
            .filter(|c| {
                if !c.active {
                    tracing::debug!(candidate = %c.id, "Excluded: inactive");
                }
                c.active
            })
            .collect();

        if active.len() > max {
            tracing::debug!(
                group = %group_id,
                active = active.len(),
                max_candidates = max,
                "Roster truncated to candidate cap"
            );
            active.truncate(max);
        }
        active
    }

    fn failed(&self, error: EngineError) -> DecisionOutcome {
        if error.is_transient() {
            tracing::warn!(error = %error, "Decision failed, retry later");
        } else {
            tracing::error!(error = %error, "Decision failed permanently");
        }
        DecisionOutcome::Failed(error)
    }

    async fn record(&self, item: &WorkItem, outcome: &DecisionOutcome, ranking: Option<&Ranking>) {
        let record = build_record(item, outcome, ranking, &self.policy, self.clock.now());
        self.recorder.record(record).await;
    }
}

fn build_record(
    item: &WorkItem,
    outcome: &DecisionOutcome,
    ranking: Option<&Ranking>,
    policy: &ScoringPolicy,
    now: DateTime<Utc>,
) -> Result<DecisionRecord, AuditError> {
    let mut record = DecisionRecord::new(item, outcome.record_outcome(), now);
    record.weights = policy.weights;

    if let Some(ranking) = ranking {
        record = record
            .with_candidates(ranking.entries(), policy.weights)?
            .with_winner(ranking.winner())
            .with_rationale(ranking.rationale());
    }

    let detail = match outcome {
        DecisionOutcome::Assigned { .. } | DecisionOutcome::NoCandidate => None,
        DecisionOutcome::AlreadyAssigned { holder } => Some(format!("held by {}", holder)),
        DecisionOutcome::RaceLost { holder, stage } => Some(match holder {
            Some(holder) => format!("claimed by {} before {}", holder, stage),
            None => format!("conflict at {}", stage),
        }),
        DecisionOutcome::Failed(e) => Some(e.to_string()),
    };

    Ok(match detail {
        Some(detail) => record.with_detail(detail),
        None => record,
    })
}
