//! Persistence port for history-tracked entities.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Insert and update for one entity type.
///
/// The history ledger is the only caller: it links the history entry onto the
/// entity before handing it over. Versioned entities arrive with `version`
/// already incremented, so an update must match the stored row against
/// `version - 1` and fail with `DomainError::ConcurrencyConflict` otherwise.
#[async_trait]
pub trait EntityStore<E: Send + Sync>: Send + Sync {
    /// Persist an entity that does not exist yet.
    async fn insert(&self, entity: &E) -> DomainResult<()>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: &E) -> DomainResult<()>;
}
