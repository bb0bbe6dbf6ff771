//! Append-only audit log store port and its in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use common::AuditLogId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::entry::AuditLogEntry;

/// Errors surfaced by the audit log store.
#[derive(Debug, Error)]
pub enum AuditStoreError {
    /// The underlying log storage rejected or failed the write.
    #[error("audit log backend error: {0}")]
    Backend(String),
}

/// Result type for audit log store operations.
pub type Result<T> = std::result::Result<T, AuditStoreError>;

/// Outbound port for the audit log.
///
/// The log is append-only; there is deliberately no update or delete.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Appends an entry, returning it with its assigned id.
    async fn append(&self, entry: AuditLogEntry) -> Result<AuditLogEntry>;

    /// Returns the entries for one record, oldest first.
    async fn find_by_record(&self, table_name: &str, record_id: i64) -> Result<Vec<AuditLogEntry>>;

    /// Returns all entries, oldest first.
    async fn find_all(&self) -> Result<Vec<AuditLogEntry>>;
}

/// In-memory audit log for tests and in-process use.
#[derive(Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of entries.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLog {
    async fn append(&self, mut entry: AuditLogEntry) -> Result<AuditLogEntry> {
        entry.id = Some(AuditLogId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_record(&self, table_name: &str, record_id: i64) -> Result<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.table_name == table_name && e.record_id == record_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<AuditLogEntry>> {
        Ok(self.entries.read().await.clone())
    }
}
