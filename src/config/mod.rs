//! Configuration module for assignd
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ASSIGND_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use assignd::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.weights.workload, 0.4);
//!
//! let toml = r#"
//! [weights]
//! workload = 0.5
//! "#;
//! let config: EngineConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.weights.workload, 0.5);
//! assert_eq!(config.weights.role, 0.3);
//! ```

pub mod backends;
pub mod error;
pub mod logging;
pub mod scoring;
pub mod timeouts;

pub use backends::{
    AuditConfig, AuditKind, RosterConfig, ServiceNowConfig, TicketingConfig, TicketingKind,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use timeouts::TimeoutConfig;

use crate::scoring::{
    AvailabilityPolicy, CompositeWeights, RankingPolicy, RolePolicy, ScoringPolicy,
    WorkloadPolicy,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the assignment engine and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Composite factor weights
    pub weights: CompositeWeights,
    /// Workload curve and priority weights
    pub workload: WorkloadPolicy,
    /// Role multipliers and experience bonus
    pub role: RolePolicy,
    /// Shift proximity and weekend handling
    pub availability: AvailabilityPolicy,
    /// Tie breaking and candidate cap
    pub ranking: RankingPolicy,
    /// External call deadlines
    pub timeouts: TimeoutConfig,
    pub roster: RosterConfig,
    pub ticketing: TicketingConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (file or default values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("ASSIGND_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ASSIGND_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Some(w) = env_f64("ASSIGND_WORKLOAD_WEIGHT") {
            self.weights.workload = w;
        }
        if let Some(w) = env_f64("ASSIGND_ROLE_WEIGHT") {
            self.weights.role = w;
        }
        if let Some(w) = env_f64("ASSIGND_AVAILABILITY_WEIGHT") {
            self.weights.availability = w;
        }

        if let Ok(path) = std::env::var("ASSIGND_ROSTER_PATH") {
            self.roster.path = path.into();
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        scoring::validate_policy(&self.scoring_policy())?;

        let timeouts = [
            ("timeouts.roster_ms", self.timeouts.roster_ms),
            ("timeouts.ticketing_ms", self.timeouts.ticketing_ms),
            ("timeouts.audit_ms", self.timeouts.audit_ms),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::invalid(field, "timeout must be non-zero"));
            }
        }

        if self.ticketing.kind == TicketingKind::ServiceNow {
            let sn = &self.ticketing.servicenow;
            if sn.instance_url.is_empty() {
                return Err(ConfigError::invalid(
                    "ticketing.servicenow.instance_url",
                    "URL cannot be empty",
                ));
            }
            if !sn.instance_url.starts_with("http://") && !sn.instance_url.starts_with("https://")
            {
                return Err(ConfigError::invalid(
                    "ticketing.servicenow.instance_url",
                    "URL must start with http:// or https://",
                ));
            }
            if sn.username.is_empty() {
                return Err(ConfigError::invalid(
                    "ticketing.servicenow.username",
                    "username cannot be empty",
                ));
            }
        }

        if self.audit.kind == AuditKind::Jsonl && self.audit.path.is_none() {
            return Err(ConfigError::invalid(
                "audit.path",
                "jsonl audit store requires a path",
            ));
        }

        self.logging.validate()?;

        Ok(())
    }

    /// Immutable scoring policy for one engine instance
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            weights: self.weights,
            workload: self.workload.clone(),
            role: self.role.clone(),
            availability: self.availability.clone(),
            ranking: self.ranking.clone(),
        }
    }
}

impl From<ScoringPolicy> for EngineConfig {
    fn from(policy: ScoringPolicy) -> Self {
        Self {
            weights: policy.weights,
            workload: policy.workload,
            role: policy.role,
            availability: policy.availability,
            ranking: policy.ranking,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{EvaluationReference, WeekendPolicy};
    use std::path::{Path, PathBuf};

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.weights.workload, 0.4);
        assert_eq!(config.weights.role, 0.3);
        assert_eq!(config.weights.availability, 0.3);
        assert_eq!(config.ranking.max_candidates, 50);
        assert_eq!(config.ticketing.kind, TicketingKind::Fixture);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [availability]
        weekend_policy = "penalize"
        "#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.availability.weekend_policy, WeekendPolicy::Penalize);
        assert_eq!(config.availability.horizon_minutes, 240);
    }

    #[test]
    fn test_config_parse_full_toml() {
        let toml = include_str!("../../assignd.example.toml");
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.availability.reference, EvaluationReference::Now);
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[roster]\npath = \"team.toml\"").unwrap();

        let config = EngineConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.roster.path, PathBuf::from("team.toml"));
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = EngineConfig::load(Some(Path::new("/nonexistent/assignd.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_malformed_file_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[weights\nworkload = ").unwrap();

        let result = EngineConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config.scoring_policy(), ScoringPolicy::default());
    }

    // Env overrides share process state, so they run in a single test.
    #[test]
    fn test_config_env_overrides() {
        std::env::set_var("ASSIGND_WORKLOAD_WEIGHT", "0.6");
        std::env::set_var("ASSIGND_ROLE_WEIGHT", "not-a-number");
        std::env::set_var("ASSIGND_LOG_LEVEL", "debug");
        std::env::set_var("ASSIGND_LOG_FORMAT", "xml");
        let config = EngineConfig::default().with_env_overrides();
        std::env::remove_var("ASSIGND_WORKLOAD_WEIGHT");
        std::env::remove_var("ASSIGND_ROLE_WEIGHT");
        std::env::remove_var("ASSIGND_LOG_LEVEL");
        std::env::remove_var("ASSIGND_LOG_FORMAT");

        assert_eq!(config.weights.workload, 0.6);
        assert_eq!(config.weights.role, 0.3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = EngineConfig::default();
        config.timeouts.ticketing_ms = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "timeouts.ticketing_ms"
        ));
    }

    #[test]
    fn test_config_validation_scoring_values() {
        let mut config = EngineConfig::default();
        config.ranking.jitter = 0.5;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "ranking.jitter"
        ));
    }

    #[test]
    fn test_config_validation_servicenow_url() {
        let mut config = EngineConfig::default();
        config.ticketing.kind = TicketingKind::ServiceNow;
        config.ticketing.servicenow.username = "svc".to_string();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field.contains("instance_url")
        ));

        config.ticketing.servicenow.instance_url = "example.service-now.com".to_string();
        assert!(config.validate().is_err());

        config.ticketing.servicenow.instance_url = "https://example.service-now.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_log_level() {
        let config: EngineConfig = toml::from_str("[logging]\nlevel = \"chatty\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_config_validation_jsonl_needs_path() {
        let mut config = EngineConfig::default();
        config.audit.path = None;
        assert!(config.validate().is_err());

        config.audit.kind = AuditKind::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_scoring_policy() {
        let mut policy = ScoringPolicy::default();
        policy.weights.availability = 0.5;
        let config = EngineConfig::from(policy.clone());
        assert_eq!(config.scoring_policy(), policy);
    }
}
