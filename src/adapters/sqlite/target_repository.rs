//! SQLite implementation of the TargetRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_updated, parse_datetime, parse_history, parse_optional_uuid, parse_uuid, version_to_i64};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Device, Group, SafetyLevel, Slot, Target, TargetType};
use crate::domain::ports::{EntityStore, TargetRepository};

#[derive(Clone)]
pub struct SqliteTargetRepository {
    pool: SqlitePool,
}

impl SqliteTargetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve an update that matched no row into a stale-version conflict or a missing target.
    async fn stale_or_missing(&self, table: &str, target_type: TargetType, id: Uuid) -> DomainResult<()> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            return Err(DomainError::TargetNotFound { target_type, id });
        }
        ensure_updated(0, &target_type.as_str().to_lowercase(), id)
    }
}

const DEVICE_COLUMNS: &str =
    "id, name, description, device_type, dept, group_id, checklist_id, created_at, history, version";
const SLOT_COLUMNS: &str =
    "id, name, description, area, dept, safety_level, group_id, checklist_id, created_at, history, version";
const GROUP_COLUMNS: &str =
    "id, name, description, owner, member_type, safety_level, checklist_id, created_at, history, version";

#[async_trait]
impl EntityStore<Device> for SqliteTargetRepository {
    async fn insert(&self, device: &Device) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO devices (id, name, description, device_type, dept, group_id, checklist_id, created_at, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(device.id.to_string())
        .bind(&device.name)
        .bind(&device.desc)
        .bind(&device.device_type)
        .bind(&device.dept)
        .bind(device.group_id.map(|id| id.to_string()))
        .bind(device.checklist_id.map(|id| id.to_string()))
        .bind(device.created_at.to_rfc3339())
        .bind(serde_json::to_string(&device.history)?)
        .bind(version_to_i64(device.version))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, device: &Device) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE devices SET name = ?, description = ?, device_type = ?, dept = ?,
               group_id = ?, checklist_id = ?, history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(&device.name)
        .bind(&device.desc)
        .bind(&device.device_type)
        .bind(&device.dept)
        .bind(device.group_id.map(|id| id.to_string()))
        .bind(device.checklist_id.map(|id| id.to_string()))
        .bind(serde_json::to_string(&device.history)?)
        .bind(version_to_i64(device.version))
        .bind(device.id.to_string())
        .bind(version_to_i64(device.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return self.stale_or_missing("devices", TargetType::Device, device.id).await;
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Slot> for SqliteTargetRepository {
    async fn insert(&self, slot: &Slot) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO slots (id, name, description, area, dept, safety_level, group_id, checklist_id, created_at, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(slot.id.to_string())
        .bind(&slot.name)
        .bind(&slot.desc)
        .bind(&slot.area)
        .bind(slot.dept.as_deref())
        .bind(slot.safety_level.as_str())
        .bind(slot.group_id.map(|id| id.to_string()))
        .bind(slot.checklist_id.map(|id| id.to_string()))
        .bind(slot.created_at.to_rfc3339())
        .bind(serde_json::to_string(&slot.history)?)
        .bind(version_to_i64(slot.version))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, slot: &Slot) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE slots SET name = ?, description = ?, area = ?, dept = ?, safety_level = ?,
               group_id = ?, checklist_id = ?, history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(&slot.name)
        .bind(&slot.desc)
        .bind(&slot.area)
        .bind(slot.dept.as_deref())
        .bind(slot.safety_level.as_str())
        .bind(slot.group_id.map(|id| id.to_string()))
        .bind(slot.checklist_id.map(|id| id.to_string()))
        .bind(serde_json::to_string(&slot.history)?)
        .bind(version_to_i64(slot.version))
        .bind(slot.id.to_string())
        .bind(version_to_i64(slot.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return self.stale_or_missing("slots", TargetType::Slot, slot.id).await;
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Group> for SqliteTargetRepository {
    async fn insert(&self, group: &Group) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO target_groups (id, name, description, owner, member_type, safety_level, checklist_id, created_at, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(group.id.to_string())
        .bind(&group.name)
        .bind(&group.desc)
        .bind(&group.owner)
        .bind(group.member_type.as_str())
        .bind(group.safety_level.as_str())
        .bind(group.checklist_id.map(|id| id.to_string()))
        .bind(group.created_at.to_rfc3339())
        .bind(serde_json::to_string(&group.history)?)
        .bind(version_to_i64(group.version))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, group: &Group) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE target_groups SET name = ?, description = ?, owner = ?, member_type = ?,
               safety_level = ?, checklist_id = ?, history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(&group.name)
        .bind(&group.desc)
        .bind(&group.owner)
        .bind(group.member_type.as_str())
        .bind(group.safety_level.as_str())
        .bind(group.checklist_id.map(|id| id.to_string()))
        .bind(serde_json::to_string(&group.history)?)
        .bind(version_to_i64(group.version))
        .bind(group.id.to_string())
        .bind(version_to_i64(group.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return self.stale_or_missing("target_groups", TargetType::Group, group.id).await;
        }
        Ok(())
    }
}

#[async_trait]
impl TargetRepository for SqliteTargetRepository {
    async fn get_device(&self, id: Uuid) -> DomainResult<Option<Device>> {
        let row: Option<DeviceRow> = sqlx::query_as(&format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_slot(&self, id: Uuid) -> DomainResult<Option<Slot>> {
        let row: Option<SlotRow> = sqlx::query_as(&format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_group(&self, id: Uuid) -> DomainResult<Option<Group>> {
        let row: Option<GroupRow> = sqlx::query_as(&format!("SELECT {GROUP_COLUMNS} FROM target_groups WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_group_members(&self, group_id: Uuid) -> DomainResult<Vec<Target>> {
        let devices: Vec<DeviceRow> = sqlx::query_as(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE group_id = ? ORDER BY name"
        ))
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let slots: Vec<SlotRow> = sqlx::query_as(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE group_id = ? ORDER BY name"
        ))
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut members = Vec::with_capacity(devices.len() + slots.len());
        for row in devices {
            members.push(Target::Device(row.try_into()?));
        }
        for row in slots {
            members.push(Target::Slot(row.try_into()?));
        }
        Ok(members)
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: String,
    name: String,
    description: String,
    device_type: String,
    dept: String,
    group_id: Option<String>,
    checklist_id: Option<String>,
    created_at: String,
    history: String,
    version: i64,
}

impl TryFrom<DeviceRow> for Device {
    type Error = DomainError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        Ok(Device {
            id: parse_uuid(&row.id)?,
            name: row.name,
            desc: row.description,
            device_type: row.device_type,
            dept: row.dept,
            group_id: parse_optional_uuid(row.group_id)?,
            checklist_id: parse_optional_uuid(row.checklist_id)?,
            created_at: parse_datetime(&row.created_at)?,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: String,
    name: String,
    description: String,
    area: String,
    dept: Option<String>,
    safety_level: String,
    group_id: Option<String>,
    checklist_id: Option<String>,
    created_at: String,
    history: String,
    version: i64,
}

impl TryFrom<SlotRow> for Slot {
    type Error = DomainError;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        let safety_level = SafetyLevel::from_str(&row.safety_level)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid safety level: {}", row.safety_level)))?;

        Ok(Slot {
            id: parse_uuid(&row.id)?,
            name: row.name,
            desc: row.description,
            area: row.area,
            dept: row.dept,
            safety_level,
            group_id: parse_optional_uuid(row.group_id)?,
            checklist_id: parse_optional_uuid(row.checklist_id)?,
            created_at: parse_datetime(&row.created_at)?,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: String,
    name: String,
    description: String,
    owner: String,
    member_type: String,
    safety_level: String,
    checklist_id: Option<String>,
    created_at: String,
    history: String,
    version: i64,
}

impl TryFrom<GroupRow> for Group {
    type Error = DomainError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        let member_type = TargetType::from_str(&row.member_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid member type: {}", row.member_type)))?;
        let safety_level = SafetyLevel::from_str(&row.safety_level)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid safety level: {}", row.safety_level)))?;

        Ok(Group {
            id: parse_uuid(&row.id)?,
            name: row.name,
            desc: row.description,
            owner: row.owner,
            member_type,
            safety_level,
            checklist_id: parse_optional_uuid(row.checklist_id)?,
            created_at: parse_datetime(&row.created_at)?,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteTargetRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteTargetRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_slot() {
        let repo = setup_test_repo().await;
        let slot = Slot::new("FE_LEBT:BPM_D0001", "LINAC")
            .with_safety_level(SafetyLevel::CreditedEsh)
            .with_dept("EE");

        EntityStore::<Slot>::insert(&repo, &slot).await.unwrap();

        let retrieved = repo.get_slot(slot.id).await.unwrap().unwrap();
        assert_eq!(retrieved.name, "FE_LEBT:BPM_D0001");
        assert_eq!(retrieved.safety_level, SafetyLevel::CreditedEsh);
        assert_eq!(retrieved.dept.as_deref(), Some("EE"));
        assert!(retrieved.checklist_id.is_none());
    }

    #[tokio::test]
    async fn test_update_device_link() {
        let repo = setup_test_repo().await;
        let mut device = Device::new("D1", "magnet", "EE");
        EntityStore::<Device>::insert(&repo, &device).await.unwrap();

        let checklist_id = Uuid::new_v4();
        device.checklist_id = Some(checklist_id);
        device.history.push(Uuid::new_v4());
        device.version += 1;
        EntityStore::<Device>::update(&repo, &device).await.unwrap();

        let retrieved = repo.get_device(device.id).await.unwrap().unwrap();
        assert_eq!(retrieved.checklist_id, Some(checklist_id));
        assert_eq!(retrieved.history.len(), 1);
        assert_eq!(retrieved.version, 2);
    }

    #[tokio::test]
    async fn test_stale_slot_update_conflicts() {
        let repo = setup_test_repo().await;
        let slot = Slot::new("S1", "LINAC");
        EntityStore::<Slot>::insert(&repo, &slot).await.unwrap();

        let mut first = repo.get_slot(slot.id).await.unwrap().unwrap();
        let mut second = first.clone();

        first.checklist_id = Some(Uuid::new_v4());
        first.version += 1;
        EntityStore::<Slot>::update(&repo, &first).await.unwrap();

        second.group_id = Some(Uuid::new_v4());
        second.version += 1;
        let err = EntityStore::<Slot>::update(&repo, &second).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let stored = repo.get_slot(slot.id).await.unwrap().unwrap();
        assert_eq!(stored.checklist_id, first.checklist_id);
        assert!(stored.group_id.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_group_fails() {
        let repo = setup_test_repo().await;
        let group = Group::new("G1", "EE", TargetType::Slot);
        let err = EntityStore::<Group>::update(&repo, &group).await.unwrap_err();
        assert!(matches!(err, DomainError::TargetNotFound { target_type: TargetType::Group, .. }));
    }

    #[tokio::test]
    async fn test_get_target_and_members() {
        let repo = setup_test_repo().await;
        let group = Group::new("G1", "LINAC", TargetType::Slot);
        EntityStore::<Group>::insert(&repo, &group).await.unwrap();

        let mut slot = Slot::new("S1", "LINAC");
        slot.group_id = Some(group.id);
        EntityStore::<Slot>::insert(&repo, &slot).await.unwrap();
        EntityStore::<Slot>::insert(&repo, &Slot::new("S2", "LINAC")).await.unwrap();

        let target = repo.get_target(TargetType::Group, group.id).await.unwrap().unwrap();
        assert_eq!(target.name(), "G1");
        assert!(repo.get_target(TargetType::Device, group.id).await.unwrap().is_none());

        let members = repo.list_group_members(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id(), slot.id);
    }
}
