//! Composite ranking and rationale.
//!
//! Final weight is a plain weighted sum of the three factor scores; the
//! coefficients are not normalised. Candidates are ordered by descending
//! weight with a stable sort, so equal weights keep roster order.

use super::availability::DutyStatus;
use crate::roster::RoleTier;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use thiserror::Error;

/// Upper bound for tie-break jitter: 1% of the 1e-4 precision at which
/// weights are reported.
pub const MAX_JITTER: f64 = 1e-6;

/// Coefficients of the weighted sum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub workload: f64,
    pub role: f64,
    pub availability: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            workload: 0.4,
            role: 0.3,
            availability: 0.3,
        }
    }
}

impl CompositeWeights {
    pub fn combine(&self, workload: f64, role: f64, availability: f64) -> f64 {
        workload * self.workload + role * self.role + availability * self.availability
    }
}

/// Ranking tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    /// Magnitude of random tie-break jitter, 0 disables it
    pub jitter: f64,
    /// Roster entries considered per decision, in roster order
    pub max_candidates: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            jitter: 0.0,
            max_candidates: 50,
        }
    }
}

/// Raw inputs behind a candidate's scores, kept for audit replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub open_items: usize,
    pub weighted_load: f64,
    pub role: RoleTier,
    pub experience_years: u32,
    pub base_multiplier: f64,
    pub experience_bonus: f64,
    pub duty_status: DutyStatus,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// A candidate annotated with all factor scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_id: String,
    pub candidate_name: String,
    pub workload_score: f64,
    pub role_score: f64,
    pub availability_score: f64,
    pub final_weight: f64,
    /// Jitter added to the sort key only, never to `final_weight`
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tie_break: f64,
    pub inputs: ScoreInputs,
}

impl ScoredCandidate {
    fn sort_key(&self) -> f64 {
        self.final_weight + self.tie_break
    }
}

/// Source of ranking jitter.
pub trait TieBreaker: Send + Sync {
    /// Perturbation added to a candidate's sort key, in `[0, MAX_JITTER]`
    fn perturbation(&self, candidate_id: &str) -> f64;
}

/// Deterministic ranking
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl TieBreaker for NoJitter {
    fn perturbation(&self, _candidate_id: &str) -> f64 {
        0.0
    }
}

/// Bounded random jitter for spreading deep ties across equally loaded
/// candidates.
#[derive(Debug, Clone)]
pub struct RandomJitter {
    magnitude: f64,
    state: RandomState,
}

impl RandomJitter {
    pub fn new(magnitude: f64) -> Self {
        Self {
            magnitude: magnitude.clamp(0.0, MAX_JITTER),
            state: RandomState::new(),
        }
    }
}

impl TieBreaker for RandomJitter {
    fn perturbation(&self, candidate_id: &str) -> f64 {
        let hash = self.state.hash_one((candidate_id, std::time::SystemTime::now()));
        (hash as f64 / u64::MAX as f64) * self.magnitude
    }
}

/// Zero eligible candidates survived filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no eligible candidates")]
pub struct NoCandidate;

/// One row of the weight distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub candidate_id: String,
    pub candidate_name: String,
    pub final_weight: f64,
    pub workload_score: f64,
    pub role_score: f64,
    pub availability_score: f64,
}

/// Candidates ordered best first; never empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<ScoredCandidate>,
}

impl Ranking {
    pub fn winner(&self) -> &ScoredCandidate {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[ScoredCandidate] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScoredCandidate> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rationale for the winner
    pub fn rationale(&self) -> String {
        rationale(self.winner())
    }

    pub fn summary(&self) -> Vec<WeightSummary> {
        self.entries
            .iter()
            .map(|c| WeightSummary {
                candidate_id: c.candidate_id.clone(),
                candidate_name: c.candidate_name.clone(),
                final_weight: c.final_weight,
                workload_score: c.workload_score,
                role_score: c.role_score,
                availability_score: c.availability_score,
            })
            .collect()
    }
}

/// Order candidates by descending weight.
///
/// Ties keep input order; with [`NoJitter`] the result is fully
/// determined by the input.
pub fn rank(
    mut scored: Vec<ScoredCandidate>,
    tie_breaker: &dyn TieBreaker,
) -> Result<Ranking, NoCandidate> {
    if scored.is_empty() {
        return Err(NoCandidate);
    }

    for candidate in &mut scored {
        candidate.tie_break = tie_breaker
            .perturbation(&candidate.candidate_id)
            .clamp(0.0, MAX_JITTER);
    }
    scored.sort_by(|a, b| b.sort_key().total_cmp(&a.sort_key()));

    Ok(Ranking { entries: scored })
}

/// Human-readable justification built from score thresholds.
///
/// Pure in the candidate's scores; jitter never appears in the text.
pub fn rationale(winner: &ScoredCandidate) -> String {
    let mut reasons = Vec::new();

    if winner.workload_score > 0.8 {
        reasons.push("low current workload");
    } else if winner.workload_score > 0.5 {
        reasons.push("moderate workload");
    } else {
        reasons.push("manageable workload");
    }

    if winner.role_score > 1.2 {
        reasons.push("high experience level");
    } else if winner.role_score > 1.0 {
        reasons.push("suitable experience");
    }

    if winner.availability_score > 0.9 {
        reasons.push("currently available");
    } else if winner.availability_score > 0.5 {
        reasons.push("partially available");
    }

    format!(
        "Selected {} due to: {}. Final weight: {:.4}",
        winner.candidate_name,
        reasons.join(", "),
        winner.final_weight
    )
}
