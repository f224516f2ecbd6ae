//! Validation of scoring policy values

use crate::config::error::ConfigError;
use crate::scoring::{ScoringPolicy, MAX_JITTER};

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be a finite non-negative number, got {}", value),
        ));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be a finite positive number, got {}", value),
        ));
    }
    Ok(())
}

fn unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}

/// Check a scoring policy for values that would make ranking meaningless
pub fn validate_policy(policy: &ScoringPolicy) -> Result<(), ConfigError> {
    let w = &policy.weights;
    non_negative("weights.workload", w.workload)?;
    non_negative("weights.role", w.role)?;
    non_negative("weights.availability", w.availability)?;
    if w.workload + w.role + w.availability == 0.0 {
        return Err(ConfigError::invalid(
            "weights",
            "at least one weight must be non-zero",
        ));
    }

    non_negative("workload.decay", policy.workload.decay)?;
    for (priority, weight) in policy.workload.priority_weights.iter() {
        positive(&format!("workload.priority_weights.p{}", priority), weight)?;
    }

    for (role, multiplier) in &policy.role.multipliers {
        positive(&format!("role.multipliers.{}", role), *multiplier)?;
    }
    non_negative("role.bonus_per_year", policy.role.bonus_per_year)?;
    non_negative("role.bonus_cap", policy.role.bonus_cap)?;

    let availability = &policy.availability;
    if availability.horizon_minutes == 0 {
        return Err(ConfigError::invalid(
            "availability.horizon_minutes",
            "must be non-zero",
        ));
    }
    unit_interval("availability.floor", availability.floor)?;
    unit_interval(
        "availability.malformed_shift_score",
        availability.malformed_shift_score,
    )?;
    if availability.utc_offset_minutes.abs() > 14 * 60 {
        return Err(ConfigError::invalid(
            "availability.utc_offset_minutes",
            "must be within ±14 hours",
        ));
    }

    let ranking = &policy.ranking;
    if !(0.0..=MAX_JITTER).contains(&ranking.jitter) {
        return Err(ConfigError::invalid(
            "ranking.jitter",
            format!("must be within [0, {}], got {}", MAX_JITTER, ranking.jitter),
        ));
    }
    if ranking.max_candidates == 0 {
        return Err(ConfigError::invalid(
            "ranking.max_candidates",
            "must be non-zero",
        ));
    }

    Ok(())
}
