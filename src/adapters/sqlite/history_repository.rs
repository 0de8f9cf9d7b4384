//! SQLite implementation of the HistoryRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{HistoryEntry, HistoryTarget};
use crate::domain::ports::HistoryRepository;

#[derive(Clone)]
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, entry: &HistoryEntry) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO history (id, recorded_at, actor, target_type, target_id, changes)
               VALUES (?, ?, ?, ?, ?, ?)"#
        )
        .bind(entry.id.to_string())
        .bind(entry.at.to_rfc3339())
        .bind(&entry.by)
        .bind(entry.target_type.as_str())
        .bind(entry.target_id.to_string())
        .bind(serde_json::to_string(&entry.changes)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<HistoryEntry>> {
        let row: Option<HistoryRow> = sqlx::query_as(
            "SELECT id, recorded_at, actor, target_type, target_id, changes FROM history WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list_for(&self, target_type: HistoryTarget, target_id: Uuid) -> DomainResult<Vec<HistoryEntry>> {
        // rowid breaks ties between entries recorded within the same instant.
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"SELECT id, recorded_at, actor, target_type, target_id, changes FROM history
               WHERE target_type = ? AND target_id = ?
               ORDER BY recorded_at DESC, rowid DESC"#
        )
        .bind(target_type.as_str())
        .bind(target_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    recorded_at: String,
    actor: String,
    target_type: String,
    target_id: String,
    changes: String,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = DomainError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let target_type = HistoryTarget::from_str(&row.target_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid history target: {}", row.target_type)))?;

        Ok(HistoryEntry {
            id: parse_uuid(&row.id)?,
            at: parse_datetime(&row.recorded_at)?,
            by: row.actor,
            target_type,
            target_id: parse_uuid(&row.target_id)?,
            changes: serde_json::from_str(&row.changes)?,
        })
    }
}
