//! Subject repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ChecklistSubject, ChecklistType, SubjectOverride};

use super::EntityStore;

/// Repository interface for checklist subjects and their overrides.
#[async_trait]
pub trait SubjectRepository:
    EntityStore<ChecklistSubject> + EntityStore<SubjectOverride> + Send + Sync
{
    /// Default subjects of a checklist type, ordered by `order`.
    async fn list_defaults(&self, checklist_type: ChecklistType) -> DomainResult<Vec<ChecklistSubject>>;

    /// Custom subjects of one checklist, ordered by `order`.
    async fn list_custom(&self, checklist_id: Uuid) -> DomainResult<Vec<ChecklistSubject>>;

    /// Delete a subject by ID.
    async fn delete_subject(&self, id: Uuid) -> DomainResult<()>;

    /// Overrides recorded for one checklist.
    async fn list_overrides(&self, checklist_id: Uuid) -> DomainResult<Vec<SubjectOverride>>;

    /// Get the override of one subject on one checklist.
    async fn get_override(&self, checklist_id: Uuid, subject_name: &str) -> DomainResult<Option<SubjectOverride>>;

    /// Delete an override by ID.
    async fn delete_override(&self, id: Uuid) -> DomainResult<()>;
}
