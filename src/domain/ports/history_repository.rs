//! History ledger port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{HistoryEntry, HistoryTarget};

/// Append-only storage of history entries.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a new entry.
    async fn append(&self, entry: &HistoryEntry) -> DomainResult<()>;

    /// Get an entry by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<HistoryEntry>>;

    /// List entries recorded for an entity, newest first.
    async fn list_for(&self, target_type: HistoryTarget, target_id: Uuid) -> DomainResult<Vec<HistoryEntry>>;
}
