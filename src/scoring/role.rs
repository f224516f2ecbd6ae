//! Role and experience scoring.

use crate::roster::RoleTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base multiplier used when a tier has no configured multiplier
const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Role tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePolicy {
    /// Base multiplier per tier, keyed by tier name (`trainee`, `tier1`, ...)
    pub multipliers: BTreeMap<String, f64>,
    /// Experience bonus per year
    pub bonus_per_year: f64,
    /// Upper bound on the experience bonus
    pub bonus_cap: f64,
}

impl Default for RolePolicy {
    fn default() -> Self {
        let multipliers = [
            (RoleTier::Trainee, 0.8),
            (RoleTier::Tier1, 1.0),
            (RoleTier::Tier2, 1.2),
            (RoleTier::Tier3, 1.5),
        ]
        .into_iter()
        .map(|(tier, m)| (tier.as_str().to_string(), m))
        .collect();

        Self {
            multipliers,
            bonus_per_year: 0.02,
            bonus_cap: 0.20,
        }
    }
}

impl RolePolicy {
    pub fn multiplier(&self, role: RoleTier) -> Option<f64> {
        self.multipliers.get(role.as_str()).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleScore {
    pub base_multiplier: f64,
    pub experience_bonus: f64,
    pub score: f64,
}

/// Linear bonus per year, capped
pub fn experience_bonus(years: u32, policy: &RolePolicy) -> f64 {
    (f64::from(years) * policy.bonus_per_year).min(policy.bonus_cap)
}

/// `base * (1 + bonus)`
pub fn score_role(candidate_id: &str, role: RoleTier, years: u32, policy: &RolePolicy) -> RoleScore {
    let base_multiplier = policy.multiplier(role).unwrap_or_else(|| {
        tracing::warn!(
            candidate = %candidate_id,
            role = %role,
            "No multiplier configured for role, using default"
        );
        DEFAULT_MULTIPLIER
    });
    let bonus = experience_bonus(years, policy);

    RoleScore {
        base_multiplier,
        experience_bonus: bonus,
        score: base_multiplier * (1.0 + bonus),
    }
}
