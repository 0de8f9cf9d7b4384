//! Status repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::ChecklistStatus;

use super::EntityStore;

/// Repository interface for checklist statuses.
///
/// There is at most one status per `(checklist_id, subject_name)`. Statuses
/// are never deleted.
#[async_trait]
pub trait StatusRepository: EntityStore<ChecklistStatus> + Send + Sync {
    /// All statuses of a checklist.
    async fn list(&self, checklist_id: Uuid) -> DomainResult<Vec<ChecklistStatus>>;

    /// The status of one subject.
    async fn get(&self, checklist_id: Uuid, subject_name: &str) -> DomainResult<Option<ChecklistStatus>>;
}
