//! Roster module.
//!
//! Candidates are the members of a responsible group that may receive
//! work. The roster is read-only from the engine's point of view: it is
//! maintained by an external process and queried per decision through the
//! [`RosterSource`] trait.

mod error;

pub use error::RosterError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Seniority tier of a candidate, ordered from least to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    #[serde(alias = "TRAINEE")]
    Trainee,
    #[serde(alias = "L1")]
    Tier1,
    #[serde(alias = "L2")]
    Tier2,
    #[serde(alias = "L3")]
    Tier3,
}

impl RoleTier {
    /// Key used in the `role.multipliers` configuration table
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTier::Trainee => "trainee",
            RoleTier::Tier1 => "tier1",
            RoleTier::Tier2 => "tier2",
            RoleTier::Tier3 => "tier3",
        }
    }
}

impl FromStr for RoleTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trainee" => Ok(RoleTier::Trainee),
            "tier1" | "l1" => Ok(RoleTier::Tier1),
            "tier2" | "l2" => Ok(RoleTier::Tier2),
            "tier3" | "l3" => Ok(RoleTier::Tier3),
            _ => Err(format!("Unknown role tier: {}", s)),
        }
    }
}

impl fmt::Display for RoleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

/// A roster entry.
///
/// Shift boundaries are kept as the raw `HH:MM[:SS]` strings found in the
/// roster so that malformed data reaches the availability evaluator, which
/// degrades it to a neutral score instead of rejecting the whole roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Identifier, unique within a group
    pub id: String,
    /// Display name used in rationale text
    pub name: String,
    pub role: RoleTier,
    /// Experience in whole years
    #[serde(default)]
    pub experience_years: u32,
    pub shift_start: String,
    pub shift_end: String,
    #[serde(default)]
    pub weekend_eligible: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: RoleTier,
        experience_years: u32,
        shift_start: impl Into<String>,
        shift_end: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            experience_years,
            shift_start: shift_start.into(),
            shift_end: shift_end.into(),
            weekend_eligible: false,
            active: true,
        }
    }

    pub fn with_weekend_eligible(mut self, eligible: bool) -> Self {
        self.weekend_eligible = eligible;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Read access to group membership.
///
/// Implementations may be eventually consistent; stale membership is a
/// data-quality concern of the roster owner.
#[async_trait]
pub trait RosterSource: Send + Sync + 'static {
    /// Return the candidates of a group, in roster order.
    ///
    /// An unknown group yields an empty list, not an error.
    async fn candidates(&self, group_id: &str) -> Result<Vec<Candidate>, RosterError>;
}

#[derive(Debug, Default, Deserialize)]
struct RosterFile {
    #[serde(default)]
    groups: HashMap<String, Vec<Candidate>>,
}

/// Roster held in memory, usually loaded from a TOML file.
///
/// ```toml
/// [[groups.network-ops]]
/// id = "alice"
/// name = "Alice Moreau"
/// role = "tier2"
/// experience_years = 3
/// shift_start = "09:00"
/// shift_end = "17:00"
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticRoster {
    groups: HashMap<String, Vec<Candidate>>,
}

impl StaticRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a roster from a TOML file
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        if !path.exists() {
            return Err(RosterError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, RosterError> {
        let file: RosterFile =
            toml::from_str(content).map_err(|e| RosterError::Parse(e.to_string()))?;
        Ok(Self {
            groups: file.groups,
        })
    }

    /// Add or replace a group's membership
    pub fn with_group(mut self, group_id: impl Into<String>, members: Vec<Candidate>) -> Self {
        self.groups.insert(group_id.into(), members);
        self
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.groups.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn candidates(&self, group_id: &str) -> Result<Vec<Candidate>, RosterError> {
        Ok(self.groups.get(group_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
        [[groups.network-ops]]
        id = "alice"
        name = "Alice Moreau"
        role = "tier2"
        experience_years = 3
        shift_start = "09:00"
        shift_end = "17:00"

        [[groups.network-ops]]
        id = "bruno"
        name = "Bruno Sato"
        role = "L3"
        shift_start = "22:00"
        shift_end = "06:00"
        weekend_eligible = true
        active = false
    "#;

    #[test]
    fn role_tier_is_ordered_by_seniority() {
        assert!(RoleTier::Trainee < RoleTier::Tier1);
        assert!(RoleTier::Tier1 < RoleTier::Tier2);
        assert!(RoleTier::Tier2 < RoleTier::Tier3);
    }

    #[test]
    fn role_tier_from_str_accepts_legacy_names() {
        assert_eq!(RoleTier::from_str("L1").unwrap(), RoleTier::Tier1);
        assert_eq!(RoleTier::from_str("tier3").unwrap(), RoleTier::Tier3);
        assert_eq!(RoleTier::from_str("TRAINEE").unwrap(), RoleTier::Trainee);
        assert!(RoleTier::from_str("sme").is_err());
    }

    #[test]
    fn parses_roster_file() {
        let roster = StaticRoster::from_toml(ROSTER).unwrap();
        assert_eq!(roster.group_count(), 1);
        assert_eq!(roster.group_ids(), vec!["network-ops".to_string()]);
    }

    #[test]
    fn candidate_defaults_apply() {
        let roster = StaticRoster::from_toml(ROSTER).unwrap();
        let members = &roster.groups["network-ops"];
        assert!(members[0].active);
        assert!(!members[0].weekend_eligible);
        assert_eq!(members[1].role, RoleTier::Tier3);
        assert_eq!(members[1].experience_years, 0);
        assert!(!members[1].active);
    }

    #[test]
    fn unknown_group_is_empty() {
        let roster = StaticRoster::from_toml(ROSTER).unwrap();
        let members = tokio_test::block_on(roster.candidates("database")).unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn candidates_preserve_roster_order() {
        let roster = StaticRoster::from_toml(ROSTER).unwrap();
        let members = roster.candidates("network-ops").await.unwrap();
        let ids: Vec<&str> = members.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bruno"]);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let result = StaticRoster::load(Path::new("/nonexistent/roster.toml"));
        assert!(matches!(result, Err(RosterError::NotFound(_))));
    }

    #[test]
    fn invalid_role_is_parse_error() {
        let toml = r#"
            [[groups.g]]
            id = "x"
            name = "X"
            role = "principal"
            shift_start = "09:00"
            shift_end = "17:00"
        "#;
        assert!(matches!(
            StaticRoster::from_toml(toml),
            Err(RosterError::Parse(_))
        ));
    }
}
