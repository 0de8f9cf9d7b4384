//! SQLite implementation of the SubjectRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{
    ensure_updated, map_unique_violation, parse_history, parse_optional_uuid, parse_uuid, version_to_i64,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChecklistSubject, ChecklistType, FieldOverride, SubjectOverride};
use crate::domain::ports::{EntityStore, SubjectRepository};

#[derive(Clone)]
pub struct SqliteSubjectRepository {
    pool: SqlitePool,
}

impl SqliteSubjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SUBJECT_COLUMNS: &str = "id, name, description, checklist_id, checklist_type, sort_order, assignees, mandatory, required, is_final, history, version";
const OVERRIDE_COLUMNS: &str = "id, checklist_id, subject_name, description, required, assignees, history, version";

#[async_trait]
impl EntityStore<ChecklistSubject> for SqliteSubjectRepository {
    async fn insert(&self, subject: &ChecklistSubject) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO checklist_subjects (id, name, description, checklist_id, checklist_type, sort_order, assignees, mandatory, required, is_final, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(subject.id.to_string())
        .bind(&subject.name)
        .bind(&subject.desc)
        .bind(subject.checklist_id.map(|id| id.to_string()))
        .bind(subject.checklist_type.as_str())
        .bind(subject.order)
        .bind(serde_json::to_string(&subject.assignees)?)
        .bind(subject.mandatory)
        .bind(subject.required)
        .bind(subject.is_final)
        .bind(serde_json::to_string(&subject.history)?)
        .bind(version_to_i64(subject.version))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::ValidationFailed(format!("Subject name already in use: {}", subject.name))
            })
        })?;

        Ok(())
    }

    async fn update(&self, subject: &ChecklistSubject) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE checklist_subjects SET description = ?, sort_order = ?, assignees = ?,
               mandatory = ?, required = ?, is_final = ?, history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(&subject.desc)
        .bind(subject.order)
        .bind(serde_json::to_string(&subject.assignees)?)
        .bind(subject.mandatory)
        .bind(subject.required)
        .bind(subject.is_final)
        .bind(serde_json::to_string(&subject.history)?)
        .bind(version_to_i64(subject.version))
        .bind(subject.id.to_string())
        .bind(version_to_i64(subject.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), "subject", subject.id)
    }
}

#[async_trait]
impl EntityStore<SubjectOverride> for SqliteSubjectRepository {
    async fn insert(&self, ovr: &SubjectOverride) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO checklist_subject_overrides (id, checklist_id, subject_name, description, required, assignees, history, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(ovr.id.to_string())
        .bind(ovr.checklist_id.to_string())
        .bind(&ovr.subject_name)
        .bind(ovr.desc.as_option().map(String::as_str))
        .bind(ovr.required.as_option().copied())
        .bind(ovr.assignees.as_option().map(serde_json::to_string).transpose()?)
        .bind(serde_json::to_string(&ovr.history)?)
        .bind(version_to_i64(ovr.version))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::ConcurrencyConflict {
                entity: "subject override".to_string(),
                id: ovr.subject_name.clone(),
            })
        })?;

        Ok(())
    }

    async fn update(&self, ovr: &SubjectOverride) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE checklist_subject_overrides SET description = ?, required = ?, assignees = ?,
               history = ?, version = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(ovr.desc.as_option().map(String::as_str))
        .bind(ovr.required.as_option().copied())
        .bind(ovr.assignees.as_option().map(serde_json::to_string).transpose()?)
        .bind(serde_json::to_string(&ovr.history)?)
        .bind(version_to_i64(ovr.version))
        .bind(ovr.id.to_string())
        .bind(version_to_i64(ovr.version.saturating_sub(1)))
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), "subject override", ovr.id)
    }
}

#[async_trait]
impl SubjectRepository for SqliteSubjectRepository {
    async fn list_defaults(&self, checklist_type: ChecklistType) -> DomainResult<Vec<ChecklistSubject>> {
        let rows: Vec<SubjectRow> = sqlx::query_as(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM checklist_subjects WHERE checklist_id IS NULL AND checklist_type = ? ORDER BY sort_order, name"
        ))
        .bind(checklist_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn list_custom(&self, checklist_id: Uuid) -> DomainResult<Vec<ChecklistSubject>> {
        let rows: Vec<SubjectRow> = sqlx::query_as(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM checklist_subjects WHERE checklist_id = ? ORDER BY sort_order, name"
        ))
        .bind(checklist_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn delete_subject(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM checklist_subjects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SubjectNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_overrides(&self, checklist_id: Uuid) -> DomainResult<Vec<SubjectOverride>> {
        let rows: Vec<OverrideRow> = sqlx::query_as(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM checklist_subject_overrides WHERE checklist_id = ? ORDER BY subject_name"
        ))
        .bind(checklist_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_override(&self, checklist_id: Uuid, subject_name: &str) -> DomainResult<Option<SubjectOverride>> {
        let row: Option<OverrideRow> = sqlx::query_as(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM checklist_subject_overrides WHERE checklist_id = ? AND subject_name = ?"
        ))
        .bind(checklist_id.to_string())
        .bind(subject_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn delete_override(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("DELETE FROM checklist_subject_overrides WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SubjectRow {
    id: String,
    name: String,
    description: String,
    checklist_id: Option<String>,
    checklist_type: String,
    sort_order: i64,
    assignees: String,
    mandatory: bool,
    required: bool,
    is_final: bool,
    history: String,
    version: i64,
}

impl TryFrom<SubjectRow> for ChecklistSubject {
    type Error = DomainError;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        let checklist_type = ChecklistType::from_str(&row.checklist_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid checklist type: {}", row.checklist_type)))?;

        Ok(ChecklistSubject {
            id: parse_uuid(&row.id)?,
            name: row.name,
            desc: row.description,
            checklist_id: parse_optional_uuid(row.checklist_id)?,
            checklist_type,
            order: row.sort_order,
            assignees: serde_json::from_str(&row.assignees)?,
            mandatory: row.mandatory,
            required: row.required,
            is_final: row.is_final,
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct OverrideRow {
    id: String,
    checklist_id: String,
    subject_name: String,
    description: Option<String>,
    required: Option<bool>,
    assignees: Option<String>,
    history: String,
    version: i64,
}

impl TryFrom<OverrideRow> for SubjectOverride {
    type Error = DomainError;

    fn try_from(row: OverrideRow) -> Result<Self, Self::Error> {
        let assignees: Option<Vec<String>> = row.assignees.map(|s| serde_json::from_str(&s)).transpose()?;

        Ok(SubjectOverride {
            id: parse_uuid(&row.id)?,
            checklist_id: parse_uuid(&row.checklist_id)?,
            subject_name: row.subject_name,
            desc: FieldOverride::from_option(row.description),
            required: FieldOverride::from_option(row.required),
            assignees: FieldOverride::from_option(assignees),
            history: parse_history(&row.history)?,
            version: u64::try_from(row.version).unwrap_or_default(),
        })
    }
}
