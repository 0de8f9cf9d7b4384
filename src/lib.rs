//! runcheck - checklist approval tracking for devices, slots and groups
//!
//! Every slot, device or group of them can carry a checklist of subjects. Each
//! subject is approved by the roles assigned to it, and the checklist as a whole
//! is approved once its final subjects are. All changes are recorded in an
//! append-only history ledger.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and storage ports
//! - **Service Layer** (`services`): The checklist engine
//! - **Adapters** (`adapters`): SQLite implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use runcheck::adapters::sqlite::{initialize_database, repositories};
//! use runcheck::{Config, Engine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let pool = initialize_database("sqlite:.runcheck/runcheck.db", None).await?;
//!     let engine = Engine::new(repositories(pool), &config);
//!     engine.catalog.seed_defaults("setup").await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, ErrorKind};
pub use domain::models::{
    Actor, Checklist, ChecklistStatus, ChecklistSubject, ChecklistSummary, ChecklistType,
    ChecklistView, Config, Device, Group, HistoryEntry, HistoryTarget, SafetyLevel, Slot,
    StatusValue, SubjectUpdate, Target, TargetType,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ChecklistService, Engine, Repositories, StatusOutcome};
