//! In-memory ticketing backend.
//!
//! Used for fixtures, dry runs and tests. Commits are compare-and-set on
//! the item's holder under the map's shard lock, so concurrent commits for
//! the same item resolve to exactly one winner.

use super::{CommitResult, OpenItem, TicketingError, TicketingSystem, WorkItem};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct ItemState {
    holder: Option<String>,
    priority: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct FixtureItem {
    id: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    holder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    items: Vec<FixtureItem>,
    #[serde(default)]
    open_items: HashMap<String, Vec<OpenItem>>,
}

/// Ticketing system held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryTicketing {
    items: DashMap<String, ItemState>,
    open_items: DashMap<String, Vec<OpenItem>>,
    commit_calls: AtomicUsize,
}

impl InMemoryTicketing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load items and per-candidate open items from a JSON fixture.
    ///
    /// ```json
    /// {
    ///   "items": [{"id": "INC0001", "priority": 2}],
    ///   "open_items": {"carol": [{"id": "INC0042", "priority": 1}]}
    /// }
    /// ```
    pub fn from_fixture_file(path: &Path) -> Result<Self, TicketingError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TicketingError::Configuration(format!(
                "failed to read fixture {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_fixture_json(&content)
    }

    pub fn from_fixture_json(content: &str) -> Result<Self, TicketingError> {
        let fixture: Fixture = serde_json::from_str(content)
            .map_err(|e| TicketingError::Configuration(format!("invalid fixture: {}", e)))?;

        let ticketing = Self::new();
        for item in fixture.items {
            ticketing.items.insert(
                item.id,
                ItemState {
                    holder: item.holder,
                    priority: item.priority,
                },
            );
        }
        for (candidate, items) in fixture.open_items {
            ticketing.open_items.insert(candidate, items);
        }
        Ok(ticketing)
    }

    /// Register a work item; an existing entry is left untouched.
    pub fn insert_item(&self, item: &WorkItem) {
        self.items
            .entry(item.id.clone())
            .or_insert_with(|| ItemState {
                holder: item.holder.clone(),
                priority: Some(item.priority),
            });
    }

    /// Set an item's holder directly, bypassing the commit path.
    ///
    /// Simulates another process claiming the item.
    pub fn set_holder(&self, item_id: &str, holder: Option<&str>) {
        self.items
            .entry(item_id.to_string())
            .and_modify(|state| state.holder = holder.map(str::to_string))
            .or_insert_with(|| ItemState {
                holder: holder.map(str::to_string),
                priority: None,
            });
    }

    pub fn add_open_item(&self, candidate_id: &str, item: OpenItem) {
        self.open_items
            .entry(candidate_id.to_string())
            .or_default()
            .push(item);
    }

    pub fn holder_of(&self, item_id: &str) -> Option<String> {
        self.items
            .get(item_id)
            .and_then(|state| state.holder.clone())
    }

    /// Number of `commit_assignment` calls received, successful or not.
    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TicketingSystem for InMemoryTicketing {
    async fn get_holder(&self, item_id: &str) -> Result<Option<String>, TicketingError> {
        self.items
            .get(item_id)
            .map(|state| state.holder.clone())
            .ok_or_else(|| TicketingError::NotFound(item_id.to_string()))
    }

    async fn commit_assignment(
        &self,
        item_id: &str,
        candidate_id: &str,
    ) -> Result<CommitResult, TicketingError> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);

        let priority = {
            let mut state = self
                .items
                .get_mut(item_id)
                .ok_or_else(|| TicketingError::NotFound(item_id.to_string()))?;
            if let Some(holder) = &state.holder {
                return Ok(CommitResult::Conflict {
                    holder: Some(holder.clone()),
                });
            }
            state.holder = Some(candidate_id.to_string());
            state.priority
        };

        self.add_open_item(
            candidate_id,
            OpenItem {
                id: item_id.to_string(),
                priority,
            },
        );
        Ok(CommitResult::Committed)
    }

    async fn list_open_items(&self, candidate_id: &str) -> Result<Vec<OpenItem>, TicketingError> {
        Ok(self
            .open_items
            .get(candidate_id)
            .map(|items| items.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const FIXTURE: &str = r#"{
        "items": [
            {"id": "INC0001", "priority": 2},
            {"id": "INC0002", "priority": 3, "holder": "dana"}
        ],
        "open_items": {
            "carol": [{"id": "INC0042", "priority": 1}, {"id": "INC0043"}]
        }
    }"#;

    #[tokio::test]
    async fn fixture_loads_holders_and_open_items() {
        let ticketing = InMemoryTicketing::from_fixture_json(FIXTURE).unwrap();
        assert_eq!(ticketing.get_holder("INC0001").await.unwrap(), None);
        assert_eq!(
            ticketing.get_holder("INC0002").await.unwrap(),
            Some("dana".to_string())
        );
        let open = ticketing.list_open_items("carol").await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[1].priority, None);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let ticketing = InMemoryTicketing::new();
        let result = ticketing.get_holder("INC404").await;
        assert!(matches!(result, Err(TicketingError::NotFound(_))));
    }

    #[tokio::test]
    async fn commit_sets_holder_and_workload() {
        let ticketing = InMemoryTicketing::from_fixture_json(FIXTURE).unwrap();
        let result = ticketing
            .commit_assignment("INC0001", "alice")
            .await
            .unwrap();
        assert_eq!(result, CommitResult::Committed);
        assert_eq!(ticketing.holder_of("INC0001"), Some("alice".to_string()));
        let open = ticketing.list_open_items("alice").await.unwrap();
        assert_eq!(open, vec![OpenItem::new("INC0001", 2)]);
    }

    #[tokio::test]
    async fn commit_on_held_item_conflicts() {
        let ticketing = InMemoryTicketing::from_fixture_json(FIXTURE).unwrap();
        let result = ticketing
            .commit_assignment("INC0002", "alice")
            .await
            .unwrap();
        assert_eq!(
            result,
            CommitResult::Conflict {
                holder: Some("dana".to_string())
            }
        );
        assert_eq!(ticketing.commit_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_commits_have_one_winner() {
        let ticketing = Arc::new(InMemoryTicketing::from_fixture_json(FIXTURE).unwrap());
        let mut handles = Vec::new();
        for i in 0..16 {
            let ticketing = Arc::clone(&ticketing);
            handles.push(tokio::spawn(async move {
                ticketing
                    .commit_assignment("INC0001", &format!("worker-{}", i))
                    .await
                    .unwrap()
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap() == CommitResult::Committed {
                committed += 1;
            }
        }
        assert_eq!(committed, 1);
        assert_eq!(ticketing.commit_calls(), 16);
    }

    #[test]
    fn insert_item_keeps_existing_state() {
        let ticketing = InMemoryTicketing::from_fixture_json(FIXTURE).unwrap();
        let opened = chrono::Utc::now();
        ticketing.insert_item(&WorkItem::new("INC0002", "network-ops", 1, opened));
        assert_eq!(ticketing.holder_of("INC0002"), Some("dana".to_string()));
    }

    #[test]
    fn invalid_fixture_is_configuration_error() {
        let result = InMemoryTicketing::from_fixture_json("{ not json");
        assert!(matches!(result, Err(TicketingError::Configuration(_))));
    }
}
