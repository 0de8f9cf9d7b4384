//! Checklist repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Checklist, TargetType};

use super::EntityStore;

/// Repository interface for checklists.
///
/// Inserting a second checklist for the same target must fail with
/// `DomainError::ChecklistAlreadyAssigned`.
#[async_trait]
pub trait ChecklistRepository: EntityStore<Checklist> + Send + Sync {
    /// Get a checklist by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Checklist>>;

    /// Find the checklist attached to a target.
    async fn find_by_target(&self, target_type: TargetType, target_id: Uuid) -> DomainResult<Option<Checklist>>;
}
