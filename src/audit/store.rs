//! Audit store backends.

use super::{AuditError, DecisionRecord};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// Append-only sink for decision records.
///
/// Implementations must accept unordered concurrent appends from parallel
/// decisions; each append is a distinct record.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    async fn append(&self, record: &DecisionRecord) -> Result<(), AuditError>;
}

/// Records kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, in append order
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, record: &DecisionRecord) -> Result<(), AuditError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AuditError::Unavailable("memory store lock poisoned".to_string()))?;
        records.push(record.clone());
        Ok(())
    }
}

/// One JSON record per line, appended to a file.
#[derive(Debug)]
pub struct JsonlAuditStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlAuditStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back from a JSON-lines file. Blank lines are skipped.
    pub async fn read_all(path: &Path) -> Result<Vec<DecisionRecord>, AuditError> {
        let content = tokio::fs::read_to_string(path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AuditError::from))
            .collect()
    }
}

#[async_trait]
impl AuditStore for JsonlAuditStore {
    async fn append(&self, record: &DecisionRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        // One writer per process; O_APPEND keeps whole lines across processes.
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
