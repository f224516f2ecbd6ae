//! Collaborator backend configuration: roster, ticketing and audit store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Roster file location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub path: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("roster.toml"),
        }
    }
}

/// Ticketing backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketingKind {
    /// In-memory system of record, optionally seeded from a JSON fixture
    #[default]
    Fixture,
    /// ServiceNow Table API
    #[serde(rename = "servicenow")]
    ServiceNow,
}

/// ServiceNow connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNowConfig {
    /// e.g. `https://example.service-now.com`
    pub instance_url: String,
    pub username: String,
    /// Environment variable holding the password
    pub password_env: String,
}

impl Default for ServiceNowConfig {
    fn default() -> Self {
        Self {
            instance_url: String::new(),
            username: String::new(),
            password_env: "ASSIGND_SERVICENOW_PASSWORD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketingConfig {
    pub kind: TicketingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_path: Option<PathBuf>,
    pub servicenow: ServiceNowConfig,
}

/// Audit store type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// Keep records in process memory only
    Memory,
    /// Append one JSON record per line to a file
    #[default]
    Jsonl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub kind: AuditKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            kind: AuditKind::Jsonl,
            path: Some(PathBuf::from("decisions.jsonl")),
        }
    }
}
