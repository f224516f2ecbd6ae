//! Candidate scoring.
//!
//! Three independent factor scores are computed per candidate and merged
//! by the composite ranker:
//!
//! - [`availability`]: shift-window evaluation and weekend filtering
//! - [`workload`]: decaying score over the candidate's open items
//! - [`role`]: tier multiplier with a capped experience bonus
//! - [`ranker`]: weighted sum, deterministic ordering and rationale
//!
//! All tuning lives in an immutable [`ScoringPolicy`] handed to the engine
//! at construction, so differently tuned engines can run side by side.

pub mod availability;
pub mod ranker;
pub mod role;
pub mod workload;

pub use availability::{
    Availability, AvailabilityPolicy, BoundaryDistance, DutyStatus, EvaluationReference,
    ShiftWindow, WeekendPolicy,
};
pub use ranker::{
    rank, rationale, CompositeWeights, NoCandidate, NoJitter, RandomJitter, Ranking,
    RankingPolicy, ScoreInputs, ScoredCandidate, TieBreaker, WeightSummary, MAX_JITTER,
};
pub use role::{RolePolicy, RoleScore};
pub use workload::{PriorityWeights, Workload, WorkloadPolicy};

use crate::roster::Candidate;
use crate::ticketing::OpenItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Complete scoring configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: CompositeWeights,
    pub workload: WorkloadPolicy,
    pub role: RolePolicy,
    pub availability: AvailabilityPolicy,
    pub ranking: RankingPolicy,
}

impl ScoringPolicy {
    /// Tie breaker matching the configured jitter
    pub fn tie_breaker(&self) -> Arc<dyn TieBreaker> {
        if self.ranking.jitter > 0.0 {
            Arc::new(RandomJitter::new(self.ranking.jitter))
        } else {
            Arc::new(NoJitter)
        }
    }
}

/// Annotate one eligible candidate with all factor scores.
pub fn score_candidate(
    candidate: &Candidate,
    availability: &Availability,
    open_items: &[OpenItem],
    policy: &ScoringPolicy,
) -> ScoredCandidate {
    let workload = workload::score_workload(&candidate.id, open_items, &policy.workload);
    let role = role::score_role(
        &candidate.id,
        candidate.role,
        candidate.experience_years,
        &policy.role,
    );
    let final_weight = policy
        .weights
        .combine(workload.score, role.score, availability.score);

    tracing::debug!(
        candidate = %candidate.id,
        workload = workload.score,
        role = role.score,
        availability = availability.score,
        final_weight,
        "Candidate scored"
    );

    ScoredCandidate {
        candidate_id: candidate.id.clone(),
        candidate_name: candidate.name.clone(),
        workload_score: workload.score,
        role_score: role.score,
        availability_score: availability.score,
        final_weight,
        tie_break: 0.0,
        inputs: ScoreInputs {
            open_items: workload.open_items,
            weighted_load: workload.weighted_load,
            role: candidate.role,
            experience_years: candidate.experience_years,
            base_multiplier: role.base_multiplier,
            experience_bonus: role.experience_bonus,
            duty_status: availability.status,
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RoleTier;

    fn on_duty() -> Availability {
        Availability {
            status: DutyStatus::OnDuty,
            score: 1.0,
            eligible: true,
        }
    }

    #[test]
    fn score_candidate_combines_factors() {
        let candidate = Candidate::new("alice", "Alice", RoleTier::Tier2, 3, "09:00", "17:00");
        let scored = score_candidate(&candidate, &on_duty(), &[], &ScoringPolicy::default());

        assert_eq!(scored.workload_score, 1.0);
        assert!((scored.role_score - 1.272).abs() < 1e-9);
        assert_eq!(scored.availability_score, 1.0);
        assert!((scored.final_weight - (0.4 + 0.3 * 1.272 + 0.3)).abs() < 1e-9);
        assert_eq!(scored.inputs.duty_status, DutyStatus::OnDuty);
        assert_eq!(scored.inputs.experience_years, 3);
    }

    #[test]
    fn loaded_senior_loses_to_idle_mid_level() {
        let policy = ScoringPolicy::default();
        let alice = Candidate::new("alice", "Alice", RoleTier::Tier2, 3, "09:00", "17:00");
        let carol = Candidate::new("carol", "Carol", RoleTier::Tier3, 10, "09:00", "17:00");
        let carol_items: Vec<OpenItem> = (0..4)
            .map(|i| OpenItem::new(format!("INC{}", i), 1))
            .collect();

        let ranking = rank(
            vec![
                score_candidate(&alice, &on_duty(), &[], &policy),
                score_candidate(&carol, &on_duty(), &carol_items, &policy),
            ],
            &NoJitter,
        )
        .unwrap();

        assert_eq!(ranking.winner().candidate_id, "alice");
    }

    #[test]
    fn policy_without_jitter_is_deterministic() {
        let tie_breaker = ScoringPolicy::default().tie_breaker();
        assert_eq!(tie_breaker.perturbation("anyone"), 0.0);
    }

    #[test]
    fn policy_parses_from_toml_sections() {
        let policy: ScoringPolicy = toml::from_str(
            r#"
            [weights]
            workload = 0.5

            [workload.priority_weights]
            p1 = 6.0

            [availability]
            weekend_policy = "penalize"
            reference = "opened_at"
            "#,
        )
        .unwrap();
        assert_eq!(policy.weights.workload, 0.5);
        assert_eq!(policy.weights.role, 0.3);
        assert_eq!(policy.workload.priority_weights.p1, 6.0);
        assert_eq!(policy.workload.priority_weights.p2, 3.0);
        assert_eq!(policy.availability.weekend_policy, WeekendPolicy::Penalize);
        assert_eq!(policy.availability.reference, EvaluationReference::OpenedAt);
    }
}
