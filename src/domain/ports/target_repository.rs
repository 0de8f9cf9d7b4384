//! Target repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Device, Group, Slot, Target, TargetType};

use super::EntityStore;

/// Repository interface for devices, slots and groups.
#[async_trait]
pub trait TargetRepository:
    EntityStore<Device> + EntityStore<Slot> + EntityStore<Group> + Send + Sync
{
    async fn get_device(&self, id: Uuid) -> DomainResult<Option<Device>>;

    async fn get_slot(&self, id: Uuid) -> DomainResult<Option<Slot>>;

    async fn get_group(&self, id: Uuid) -> DomainResult<Option<Group>>;

    /// Get any target by type and ID.
    async fn get_target(&self, target_type: TargetType, id: Uuid) -> DomainResult<Option<Target>> {
        Ok(match target_type {
            TargetType::Device => self.get_device(id).await?.map(Target::Device),
            TargetType::Slot => self.get_slot(id).await?.map(Target::Slot),
            TargetType::Group => self.get_group(id).await?.map(Target::Group),
        })
    }

    /// List the members of a group.
    async fn list_group_members(&self, group_id: Uuid) -> DomainResult<Vec<Target>>;
}
