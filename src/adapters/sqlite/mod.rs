//! SQLite database adapters for the runcheck checklist system.

pub mod checklist_repository;
pub mod connection;
pub mod history_repository;
pub mod migrations;
pub mod status_repository;
pub mod subject_repository;
pub mod target_repository;

pub use checklist_repository::SqliteChecklistRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use history_repository::SqliteHistoryRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use status_repository::SqliteStatusRepository;
pub use subject_repository::SqliteSubjectRepository;
pub use target_repository::SqliteTargetRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::services::Repositories;

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an optional UUID string from a SQLite row field.
pub fn parse_optional_uuid(s: Option<String>) -> DomainResult<Option<Uuid>> {
    s.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a JSON array of history entry IDs.
pub fn parse_history(s: &str) -> DomainResult<Vec<Uuid>> {
    serde_json::from_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Map a unique-constraint violation to `conflict`, any other error to a storage error.
pub(crate) fn map_unique_violation(err: sqlx::Error, conflict: impl FnOnce() -> DomainError) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict(),
        _ => err.into(),
    }
}

/// Fail with a concurrency conflict when an optimistic update touched no row.
pub(crate) fn ensure_updated(rows_affected: u64, entity: &str, id: Uuid) -> DomainResult<()> {
    if rows_affected == 0 {
        return Err(DomainError::ConcurrencyConflict {
            entity: entity.to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// SQLite stores the `u64` version as a signed integer.
pub(crate) fn version_to_i64(version: u64) -> i64 {
    i64::try_from(version).unwrap_or(i64::MAX)
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(database_url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// SQLite implementations of every storage port sharing one pool.
pub fn repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        targets: Arc::new(SqliteTargetRepository::new(pool.clone())),
        checklists: Arc::new(SqliteChecklistRepository::new(pool.clone())),
        subjects: Arc::new(SqliteSubjectRepository::new(pool.clone())),
        statuses: Arc::new(SqliteStatusRepository::new(pool.clone())),
        history: Arc::new(SqliteHistoryRepository::new(pool)),
    }
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
