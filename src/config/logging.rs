//! `[logging]` section: verbosity and output format for the decision log

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Levels accepted for `logging.level` and per-component overrides
pub const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Modules that can be given their own level in `component_levels`
pub const COMPONENTS: [&str; 8] = [
    "audit",
    "cli",
    "config",
    "engine",
    "logging",
    "roster",
    "scoring",
    "ticketing",
];

/// Where decision logs are meant to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines on a terminal
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}', expected pretty or json", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for every `assignd` module
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. `scoring = "debug"` to see every candidate score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

fn check_level(field: &str, level: &str) -> Result<(), ConfigError> {
    if LEVELS.contains(&level.trim().to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("unknown level '{}', expected one of {}", level, LEVELS.join(", ")),
        ))
    }
}

impl LoggingConfig {
    /// Reject levels and component names the filter would silently ignore.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_level("logging.level", &self.level)?;

        let Some(components) = &self.component_levels else {
            return Ok(());
        };
        let mut names: Vec<&String> = components.keys().collect();
        names.sort();
        for name in names {
            let field = format!("logging.component_levels.{}", name);
            if !COMPONENTS.contains(&name.as_str()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("unknown component, expected one of {}", COMPONENTS.join(", ")),
                ));
            }
            check_level(&field, &components[name])?;
        }
        Ok(())
    }
}
