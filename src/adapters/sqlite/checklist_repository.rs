//! SQLite implementation of the ChecklistRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_updated, map_unique_violation, parse_datetime, parse_history, parse_uuid, version_to_i64};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Checklist, ChecklistType, TargetType};
use crate::domain::ports::{ChecklistRepository, EntityStore};

#[derive(Clone)]
pub struct SqliteChecklistRepository {
    pool: SqlitePool,
}

impl SqliteChecklistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Checklist> for SqliteChecklistRepository {
    async fn insert(&self, checklist: &Checklist) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO checklists (id, target_type, target_id, checklist_type, created_at, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(checklist.id.to_string())
        .bind(checklist.target_type.as_str())
        .bind(checklist.target_id.to_string())
        .bind(checklist.checklist_type.as_str())
        .bind(checklist.created_at.to_rfc3339())
        .bind(serde_json::to_string(&checklist.history)?)
        .bind(version_to_i64(checklist.version))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::ChecklistAlreadyAssigned {
                target_type: checklist.target_type,
                target_id: checklist.target_id,
            })
        })?;

        Ok(())
    }

    async fn update(&self, checklist: &Checklist) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE checklists SET checklist_type = ?, history = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(checklist.checklist_type.as_str())
        .bind(serde_json::to_string(&checklist.history)?)
        .bind(version_to_i64(checklist.version))
        .bind(checklist.id.to_string())
        .bind(version_to_i64(checklist.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && self.get(checklist.id).await?.is_none() {
            return Err(DomainError::ChecklistNotFound(checklist.id));
        }
        ensure_updated(result.rows_affected(), "checklist", checklist.id)
    }
}

#[async_trait]
impl ChecklistRepository for SqliteChecklistRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Checklist>> {
        let row: Option<ChecklistRow> = sqlx::query_as(
            "SELECT id, target_type, target_id, checklist_type, created_at, history, version FROM checklists WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn find_by_target(&self, target_type: TargetType, target_id: Uuid) -> DomainResult<Option<Checklist>> {
        let row: Option<ChecklistRow> = sqlx::query_as(
            "SELECT id, target_type, target_id, checklist_type, created_at, history, version FROM checklists WHERE target_type = ? AND target_id = ?"
        )
        .bind(target_type.as_str())
        .bind(target_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct ChecklistRow {
    id: String,
    target_type: String,
    target_id: String,
    checklist_type: String,
    created_at: String,
    history: String,
    version: i64,
}

impl TryFrom<ChecklistRow> for Checklist {
    type Error = DomainError;

    fn try_from(row: ChecklistRow) -> Result<Self, Self::Error> {
        let target_type = TargetType::from_str(&row.target_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid target type: {}", row.target_type)))?;
        let checklist_type = ChecklistType::from_str(&row.checklist_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid checklist type: {}", row.checklist_type)))?;

        Ok(Checklist {
            id: parse_uuid(&row.id)?,
            target_type,
            target_id: parse_uuid(&row.target_id)?,
            checklist_type,
            created_at: parse_datetime(&row.created_at)?,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}
