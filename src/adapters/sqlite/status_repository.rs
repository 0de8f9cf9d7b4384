//! SQLite implementation of the StatusRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_updated, map_unique_violation, parse_datetime, parse_history, parse_uuid, version_to_i64};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChecklistStatus, StatusValue};
use crate::domain::ports::{EntityStore, StatusRepository};

#[derive(Clone)]
pub struct SqliteStatusRepository {
    pool: SqlitePool,
}

impl SqliteStatusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const STATUS_COLUMNS: &str = "id, checklist_id, subject_name, value, comment, input_by, input_on, history, version";

#[async_trait]
impl EntityStore<ChecklistStatus> for SqliteStatusRepository {
    async fn insert(&self, status: &ChecklistStatus) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO checklist_statuses (id, checklist_id, subject_name, value, comment, input_by, input_on, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(status.id.to_string())
        .bind(status.checklist_id.to_string())
        .bind(&status.subject_name)
        .bind(status.value.as_str())
        .bind(&status.comment)
        .bind(&status.input_by)
        .bind(status.input_on.to_rfc3339())
        .bind(serde_json::to_string(&status.history)?)
        .bind(version_to_i64(status.version))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent first submission for the same subject won the race.
            map_unique_violation(e, || DomainError::ConcurrencyConflict {
                entity: "status".to_string(),
                id: status.subject_name.clone(),
            })
        })?;

        Ok(())
    }

    async fn update(&self, status: &ChecklistStatus) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE checklist_statuses SET value = ?, comment = ?, input_by = ?, input_on = ?,
               history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(status.value.as_str())
        .bind(&status.comment)
        .bind(&status.input_by)
        .bind(status.input_on.to_rfc3339())
        .bind(serde_json::to_string(&status.history)?)
        .bind(version_to_i64(status.version))
        .bind(status.id.to_string())
        .bind(version_to_i64(status.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), "status", status.id)
    }
}

#[async_trait]
impl StatusRepository for SqliteStatusRepository {
    async fn list(&self, checklist_id: Uuid) -> DomainResult<Vec<ChecklistStatus>> {
        let rows: Vec<StatusRow> = sqlx::query_as(&format!(
            "SELECT {STATUS_COLUMNS} FROM checklist_statuses WHERE checklist_id = ? ORDER BY subject_name"
        ))
        .bind(checklist_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get(&self, checklist_id: Uuid, subject_name: &str) -> DomainResult<Option<ChecklistStatus>> {
        let row: Option<StatusRow> = sqlx::query_as(&format!(
            "SELECT {STATUS_COLUMNS} FROM checklist_statuses WHERE checklist_id = ? AND subject_name = ?"
        ))
        .bind(checklist_id.to_string())
        .bind(subject_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    id: String,
    checklist_id: String,
    subject_name: String,
    value: String,
    comment: String,
    input_by: String,
    input_on: String,
    history: String,
    version: i64,
}

impl TryFrom<StatusRow> for ChecklistStatus {
    type Error = DomainError;

    fn try_from(row: StatusRow) -> Result<Self, Self::Error> {
        let value = StatusValue::from_str(&row.value)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid status value: {}", row.value)))?;

        Ok(ChecklistStatus {
            id: parse_uuid(&row.id)?,
            checklist_id: parse_uuid(&row.checklist_id)?,
            subject_name: row.subject_name,
            value,
            comment: row.comment,
            input_by: row.input_by,
            input_on: parse_datetime(&row.input_on)?,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteChecklistRepository};
    use crate::domain::models::{Checklist, ChecklistType, TargetType};

    async fn setup() -> (SqliteStatusRepository, Checklist) {
        let pool = create_migrated_test_pool().await.unwrap();
        let checklists = SqliteChecklistRepository::new(pool.clone());
        let checklist = Checklist::new(TargetType::Device, Uuid::new_v4(), ChecklistType::DeviceDefault);
        checklists.insert(&checklist).await.unwrap();
        (SqliteStatusRepository::new(pool), checklist)
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let (repo, checklist) = setup().await;
        let mut status = ChecklistStatus::new(checklist.id, "EE");
        status.value = StatusValue::YC;
        status.comment = "cable pending".to_string();
        status.input_by = "alice".to_string();

        repo.insert(&status).await.unwrap();
        let stored = repo.get(checklist.id, "EE").await.unwrap().unwrap();
        assert_eq!(stored.value, StatusValue::YC);
        assert_eq!(stored.comment, "cable pending");

        status.value = StatusValue::Y;
        status.version += 1;
        repo.update(&status).await.unwrap();

        let all = repo.list(checklist.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, StatusValue::Y);
        assert_eq!(all[0].version, 2);
    }

    #[tokio::test]
    async fn test_second_insert_for_subject_conflicts() {
        let (repo, checklist) = setup().await;
        repo.insert(&ChecklistStatus::new(checklist.id, "EE")).await.unwrap();

        let err = repo.insert(&ChecklistStatus::new(checklist.id, "EE")).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));
    }
}
