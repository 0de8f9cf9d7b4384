//! Target registry: devices, slots and groups.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::history_ledger::HistoryLedger;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Actor, Device, Group, Slot, Target, TargetType, Tracked, WatchedFields};
use crate::domain::ports::TargetRepository;

pub struct TargetService {
    targets: Arc<dyn TargetRepository>,
    ledger: Arc<HistoryLedger>,
}

impl TargetService {
    pub fn new(targets: Arc<dyn TargetRepository>, ledger: Arc<HistoryLedger>) -> Self {
        Self { targets, ledger }
    }

    /// Register a new device.
    pub async fn create_device(&self, actor: &Actor, device: Device) -> DomainResult<Device> {
        require_field("Device name", &device.name)?;
        require_field("Device department", &device.dept)?;

        let mut tracked = Tracked::new(device);
        self.ledger
            .save(&mut tracked, actor.username(), &WatchedFields::All, &*self.targets)
            .await?;
        info!(device_id = %tracked.id, name = %tracked.name, actor = actor.username(), "device created");
        Ok(tracked.into_inner())
    }

    /// Register a new slot.
    pub async fn create_slot(&self, actor: &Actor, slot: Slot) -> DomainResult<Slot> {
        require_field("Slot name", &slot.name)?;
        require_field("Slot area", &slot.area)?;

        let mut tracked = Tracked::new(slot);
        self.ledger
            .save(&mut tracked, actor.username(), &WatchedFields::All, &*self.targets)
            .await?;
        info!(slot_id = %tracked.id, name = %tracked.name, actor = actor.username(), "slot created");
        Ok(tracked.into_inner())
    }

    /// Register a new group of slots or devices.
    pub async fn create_group(&self, actor: &Actor, group: Group) -> DomainResult<Group> {
        group.validate().map_err(DomainError::ValidationFailed)?;
        require_field("Group owner", &group.owner)?;

        let mut tracked = Tracked::new(group);
        self.ledger
            .save(&mut tracked, actor.username(), &WatchedFields::All, &*self.targets)
            .await?;
        info!(group_id = %tracked.id, name = %tracked.name, actor = actor.username(), "group created");
        Ok(tracked.into_inner())
    }

    pub async fn get_device(&self, id: Uuid) -> DomainResult<Device> {
        self.targets
            .get_device(id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type: TargetType::Device, id })
    }

    pub async fn get_slot(&self, id: Uuid) -> DomainResult<Slot> {
        self.targets
            .get_slot(id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type: TargetType::Slot, id })
    }

    pub async fn get_group(&self, id: Uuid) -> DomainResult<Group> {
        self.targets
            .get_group(id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type: TargetType::Group, id })
    }

    pub async fn get_target(&self, target_type: TargetType, id: Uuid) -> DomainResult<Target> {
        self.targets
            .get_target(target_type, id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type, id })
    }
}

fn require_field(label: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{label} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteHistoryRepository, SqliteTargetRepository};

    async fn setup_service() -> TargetService {
        let pool = create_migrated_test_pool().await.unwrap();
        let ledger = Arc::new(HistoryLedger::new(Arc::new(SqliteHistoryRepository::new(pool.clone()))));
        TargetService::new(Arc::new(SqliteTargetRepository::new(pool)), ledger)
    }

    #[tokio::test]
    async fn test_create_and_get_slot() {
        let service = setup_service().await;
        let actor = Actor::new("alice", ["SYS:ADMIN"]);
        let slot = service
            .create_slot(&actor, Slot::new("FS1_CSS:BPM_D1000", "ARR01").with_dept("FRIB"))
            .await
            .unwrap();
        assert_eq!(slot.history.len(), 1);

        let fetched = service.get_slot(slot.id).await.unwrap();
        assert_eq!(fetched.area, "ARR01");
        assert_eq!(fetched.dept.as_deref(), Some("FRIB"));

        let target = service.get_target(TargetType::Slot, slot.id).await.unwrap();
        assert_eq!(target.name(), "FS1_CSS:BPM_D1000");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let service = setup_service().await;
        let actor = Actor::new("alice", Vec::<String>::new());

        let err = service.create_device(&actor, Device::new("FE_MAG_01", "magnet", " ")).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));

        let err = service
            .create_group(&actor, Group::new("Nested", "ARR01", TargetType::Group))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_unknown_target_not_found() {
        let service = setup_service().await;
        let err = service.get_device(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
