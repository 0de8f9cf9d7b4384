//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that storage adapters must implement:
//! - EntityStore: Insert/update of history-tracked entities
//! - HistoryRepository: Append-only change ledger
//! - TargetRepository: Devices, slots and groups
//! - ChecklistRepository: Checklists keyed by target
//! - SubjectRepository: Default and custom subjects plus overrides
//! - StatusRepository: Per-subject statuses
//!
//! Repositories always read current state; adapters must not cache.

pub mod checklist_repository;
pub mod entity_store;
pub mod history_repository;
pub mod status_repository;
pub mod subject_repository;
pub mod target_repository;

pub use checklist_repository::ChecklistRepository;
pub use entity_store::EntityStore;
pub use history_repository::HistoryRepository;
pub use status_repository::StatusRepository;
pub use subject_repository::SubjectRepository;
pub use target_repository::TargetRepository;
