//! Shared test utilities for assignd integration tests.
//!
//! Provides fixed instants, roster builders, scripted collaborator doubles
//! and an engine harness wired to an in-memory audit store.

#![allow(dead_code)]

use assignd::audit::{AuditStore, DecisionRecorder, MemoryAuditStore};
use assignd::config::TimeoutConfig;
use assignd::engine::{AssignmentEngine, FixedClock};
use assignd::roster::{Candidate, RoleTier, RosterError, RosterSource, StaticRoster};
use assignd::scoring::ScoringPolicy;
use assignd::ticketing::{
    CommitResult, InMemoryTicketing, OpenItem, TicketingError, TicketingSystem, WorkItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Well-Known Instants
// =============================================================================

/// 2026-10-14 is a Wednesday
pub const WEDNESDAY_10AM: &str = "2026-10-14T10:00:00Z";
pub const WEDNESDAY_2330: &str = "2026-10-14T23:30:00Z";
/// 2026-10-17 is a Saturday
pub const SATURDAY_10AM: &str = "2026-10-17T10:00:00Z";

pub const GROUP: &str = "network-ops";

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

// =============================================================================
// Roster Builders
// =============================================================================

pub fn candidate(id: &str, role: RoleTier, years: u32, start: &str, end: &str) -> Candidate {
    let name = format!("{}{}", id[..1].to_uppercase(), &id[1..]);
    Candidate::new(id, name, role, years, start, end)
}

/// A on duty with no load, B weekend-ineligible, C on duty and senior.
pub fn saturday_trio() -> Vec<Candidate> {
    vec![
        candidate("alice", RoleTier::Tier2, 3, "09:00", "17:00").with_weekend_eligible(true),
        candidate("bob", RoleTier::Tier1, 5, "08:00", "18:00"),
        candidate("carol", RoleTier::Tier3, 10, "09:00", "17:00").with_weekend_eligible(true),
    ]
}

pub fn p1_items(prefix: &str, count: usize) -> Vec<OpenItem> {
    (0..count)
        .map(|i| OpenItem::new(format!("{}{}", prefix, i), 1))
        .collect()
}

pub fn work_item(id: &str, priority: u8, opened_at: &str) -> WorkItem {
    WorkItem::new(id, GROUP, priority, utc(opened_at))
}

// =============================================================================
// Scripted Ticketing
// =============================================================================

/// In-memory ticketing with hooks that simulate competing workers and slow
/// calls. Every call is appended to a log for ordering assertions.
#[derive(Default)]
pub struct ScriptedTicketing {
    pub inner: InMemoryTicketing,
    log: Mutex<Vec<String>>,
    claim_during_scoring: Mutex<Option<(String, String)>>,
    claim_before_commit: Mutex<Option<(String, String)>>,
    open_items_delay: Option<Duration>,
    commit_delay: Option<Duration>,
    unavailable: bool,
}

impl ScriptedTicketing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unclaimed work item
    pub fn with_item(self, item: &WorkItem) -> Self {
        self.inner.insert_item(item);
        self
    }

    pub fn with_open_items(self, candidate_id: &str, items: Vec<OpenItem>) -> Self {
        for item in items {
            self.inner.add_open_item(candidate_id, item);
        }
        self
    }

    /// Another worker claims the item while candidates are being scored
    pub fn claim_during_scoring(self, item_id: &str, holder: &str) -> Self {
        *self.claim_during_scoring.lock().unwrap() = Some((item_id.into(), holder.into()));
        self
    }

    /// Another worker claims the item between post-check and commit
    pub fn claim_before_commit(self, item_id: &str, holder: &str) -> Self {
        *self.claim_before_commit.lock().unwrap() = Some((item_id.into(), holder.into()));
        self
    }

    pub fn with_open_items_delay(mut self, delay: Duration) -> Self {
        self.open_items_delay = Some(delay);
        self
    }

    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// Every call fails with HTTP 503
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn commit_calls(&self) -> usize {
        self.inner.commit_calls()
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn check_available(&self) -> Result<(), TicketingError> {
        if self.unavailable {
            return Err(TicketingError::Upstream {
                status: 503,
                message: "maintenance".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TicketingSystem for ScriptedTicketing {
    async fn get_holder(&self, item_id: &str) -> Result<Option<String>, TicketingError> {
        self.push(format!("get_holder:{}", item_id));
        self.check_available()?;
        self.inner.get_holder(item_id).await
    }

    async fn commit_assignment(
        &self,
        item_id: &str,
        candidate_id: &str,
    ) -> Result<CommitResult, TicketingError> {
        self.push(format!("commit:{}:{}", item_id, candidate_id));
        self.check_available()?;
        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        let claim = self.claim_before_commit.lock().unwrap().take();
        if let Some((item, holder)) = claim {
            self.inner.set_holder(&item, Some(&holder));
        }
        self.inner.commit_assignment(item_id, candidate_id).await
    }

    async fn list_open_items(&self, candidate_id: &str) -> Result<Vec<OpenItem>, TicketingError> {
        self.push(format!("list_open_items:{}", candidate_id));
        self.check_available()?;
        if let Some(delay) = self.open_items_delay {
            tokio::time::sleep(delay).await;
        }
        let claim = self.claim_during_scoring.lock().unwrap().take();
        if let Some((item, holder)) = claim {
            self.inner.set_holder(&item, Some(&holder));
        }
        self.inner.list_open_items(candidate_id).await
    }
}

// =============================================================================
// Roster Doubles
// =============================================================================

/// Roster source that answers after a delay, or not at all
pub struct SlowRoster {
    pub delay: Duration,
    pub members: Vec<Candidate>,
}

#[async_trait]
impl RosterSource for SlowRoster {
    async fn candidates(&self, _group_id: &str) -> Result<Vec<Candidate>, RosterError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.members.clone())
    }
}

/// Roster source whose backend is down
pub struct DownRoster;

#[async_trait]
impl RosterSource for DownRoster {
    async fn candidates(&self, _group_id: &str) -> Result<Vec<Candidate>, RosterError> {
        Err(RosterError::Unavailable("connection refused".into()))
    }
}

// =============================================================================
// Audit Doubles
// =============================================================================

pub struct FailingAuditStore;

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn append(
        &self,
        _record: &assignd::audit::DecisionRecord,
    ) -> Result<(), assignd::audit::AuditError> {
        Err(assignd::audit::AuditError::Unavailable("disk full".into()))
    }
}

// =============================================================================
// Log Capture
// =============================================================================

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Route WARN and above on the current thread into a buffer until the
/// guard is dropped. Tests using it must run on a current-thread runtime.
pub fn capture_warnings() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

// =============================================================================
// Engine Harness
// =============================================================================

/// Short deadlines so timeout tests finish quickly
pub fn test_timeouts() -> TimeoutConfig {
    TimeoutConfig {
        roster_ms: 200,
        ticketing_ms: 200,
        audit_ms: 200,
    }
}

pub struct Harness {
    pub engine: AssignmentEngine,
    pub ticketing: Arc<ScriptedTicketing>,
    pub audit: Arc<MemoryAuditStore>,
}

pub fn harness_with(
    roster: Arc<dyn RosterSource>,
    ticketing: ScriptedTicketing,
    audit_store: Option<Arc<dyn AuditStore>>,
    policy: ScoringPolicy,
    now: &str,
) -> Harness {
    let ticketing = Arc::new(ticketing);
    let audit = Arc::new(MemoryAuditStore::new());
    let store: Arc<dyn AuditStore> = audit_store.unwrap_or_else(|| audit.clone());
    let recorder = DecisionRecorder::new(store, Duration::from_millis(200));

    let engine = AssignmentEngine::new(roster, ticketing.clone(), recorder, Arc::new(policy))
        .with_clock(Arc::new(FixedClock(utc(now))))
        .with_timeouts(test_timeouts());

    Harness {
        engine,
        ticketing,
        audit,
    }
}

/// Engine over a static roster for [`GROUP`] with default scoring
pub fn harness(members: Vec<Candidate>, ticketing: ScriptedTicketing, now: &str) -> Harness {
    let roster = StaticRoster::new().with_group(GROUP, members);
    harness_with(
        Arc::new(roster),
        ticketing,
        None,
        ScoringPolicy::default(),
        now,
    )
}
