//! Workload scoring.
//!
//! A candidate's open items are summed through a priority weight table and
//! mapped onto `1 / (1 + weighted * decay)`. The curve is convex and
//! strictly decreasing, so a single urgent item costs much more than
//! several low-priority ones.

use crate::ticketing::OpenItem;
use serde::{Deserialize, Serialize};

/// Weight used for priorities outside 1..=5
const UNKNOWN_PRIORITY_WEIGHT: f64 = 1.0;

/// Load contributed by one open item per priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub p4: f64,
    pub p5: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            p1: 5.0,
            p2: 3.0,
            p3: 2.0,
            p4: 1.0,
            p5: 0.5,
        }
    }
}

impl PriorityWeights {
    /// Weight for a priority in 1..=5, `None` otherwise
    pub fn weight(&self, priority: u8) -> Option<f64> {
        match priority {
            1 => Some(self.p1),
            2 => Some(self.p2),
            3 => Some(self.p3),
            4 => Some(self.p4),
            5 => Some(self.p5),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> {
        [
            (1, self.p1),
            (2, self.p2),
            (3, self.p3),
            (4, self.p4),
            (5, self.p5),
        ]
        .into_iter()
    }
}

/// Workload tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadPolicy {
    /// Steepness of the decay curve
    pub decay: f64,
    pub priority_weights: PriorityWeights,
}

impl Default for WorkloadPolicy {
    fn default() -> Self {
        Self {
            decay: 0.5,
            priority_weights: PriorityWeights::default(),
        }
    }
}

/// Workload of one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workload {
    pub open_items: usize,
    /// Sum of priority weights over open items
    pub weighted_load: f64,
    /// In `(0, 1]`
    pub score: f64,
}

/// The decay curve. `weighted_load == 0` yields exactly 1.0.
pub fn workload_curve(weighted_load: f64, decay: f64) -> f64 {
    1.0 / (1.0 + weighted_load * decay)
}

/// Score a candidate's open items.
pub fn score_workload(
    candidate_id: &str,
    items: &[OpenItem],
    policy: &WorkloadPolicy,
) -> Workload {
    if items.is_empty() {
        return Workload {
            open_items: 0,
            weighted_load: 0.0,
            score: 1.0,
        };
    }

    let weights = &policy.priority_weights;
    let weighted_load: f64 = items
        .iter()
        .map(|item| match item.priority {
            None => weights.p4,
            Some(p) => weights.weight(p).unwrap_or_else(|| {
                tracing::warn!(
                    candidate = %candidate_id,
                    item = %item.id,
                    priority = p,
                    "Open item has out-of-range priority, using default weight"
                );
                UNKNOWN_PRIORITY_WEIGHT
            }),
        })
        .sum();

    let score = workload_curve(weighted_load, policy.decay);

    tracing::debug!(
        candidate = %candidate_id,
        open_items = items.len(),
        weighted_load,
        score,
        "Workload scored"
    );

    Workload {
        open_items: items.len(),
        weighted_load,
        score,
    }
}
