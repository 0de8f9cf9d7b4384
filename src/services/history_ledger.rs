//! History ledger: records field-level changes alongside every save.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Change, HistoryEntry, Trackable, Tracked, WatchedFields};
use crate::domain::ports::{EntityStore, HistoryRepository};

/// Saves tracked entities and appends one history entry per real change set.
pub struct HistoryLedger {
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryLedger {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// Persist `tracked` through `store`, recording its watched changes.
    ///
    /// When the watched fields changed, the history entry is appended first and
    /// linked onto the entity before the entity itself is persisted. An entity
    /// with no change at all is not written. If the entity write fails after the
    /// entry was appended, the error is returned and the entry stays orphaned;
    /// [`HistoryLedger::history_of`] never returns unlinked entries.
    pub async fn save<E, S>(
        &self,
        tracked: &mut Tracked<E>,
        actor: &str,
        watched: &WatchedFields,
        store: &S,
    ) -> DomainResult<Option<HistoryEntry>>
    where
        E: Trackable,
        S: EntityStore<E> + ?Sized,
    {
        let actor = checked_actor(actor)?;
        if !tracked.is_dirty() {
            debug!(entity_id = %tracked.entity_id(), "no changes, skipping save");
            return Ok(None);
        }

        let changes = tracked.changes(watched);
        self.persist(tracked, actor, changes, store).await
    }

    /// Record changes made on behalf of `tracked` outside its own fields,
    /// such as dependent rows that were deleted, and persist it with the link.
    pub async fn record<E, S>(
        &self,
        tracked: &mut Tracked<E>,
        actor: &str,
        changes: Vec<Change>,
        store: &S,
    ) -> DomainResult<Option<HistoryEntry>>
    where
        E: Trackable,
        S: EntityStore<E> + ?Sized,
    {
        let actor = checked_actor(actor)?;
        if changes.is_empty() {
            return Ok(None);
        }
        self.persist(tracked, actor, changes, store).await
    }

    async fn persist<E, S>(
        &self,
        tracked: &mut Tracked<E>,
        actor: &str,
        changes: Vec<Change>,
        store: &S,
    ) -> DomainResult<Option<HistoryEntry>>
    where
        E: Trackable,
        S: EntityStore<E> + ?Sized,
    {
        let entry = if changes.is_empty() {
            None
        } else {
            let entry = HistoryEntry::new(actor, tracked.history_target(), tracked.entity_id(), changes);
            self.repository.append(&entry).await?;
            tracked.history_mut().push(entry.id);
            Some(entry)
        };

        if tracked.is_new() {
            store.insert(&**tracked).await?;
        } else {
            tracked.bump_version();
            store.update(&**tracked).await?;
        }
        tracked.mark_persisted();

        if let Some(entry) = &entry {
            debug!(
                entity_id = %entry.target_id,
                target_type = entry.target_type.as_str(),
                changes = entry.changes.len(),
                actor,
                "recorded history entry"
            );
        }
        Ok(entry)
    }

    /// History entries linked from `entity`, newest first.
    pub async fn history_of<E: Trackable>(&self, entity: &E) -> DomainResult<Vec<HistoryEntry>> {
        let linked: HashSet<Uuid> = entity.history().iter().copied().collect();
        let entries = self
            .repository
            .list_for(entity.history_target(), entity.entity_id())
            .await?;
        Ok(entries.into_iter().filter(|e| linked.contains(&e.id)).collect())
    }
}

fn checked_actor(actor: &str) -> DomainResult<&str> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(DomainError::validation("An actor is required to record changes"));
    }
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteHistoryRepository, SqliteTargetRepository};
    use crate::domain::models::{Device, HistoryTarget, Slot};
    use crate::domain::ports::TargetRepository;
    use serde_json::json;

    async fn setup() -> (HistoryLedger, SqliteTargetRepository, Arc<SqliteHistoryRepository>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let history = Arc::new(SqliteHistoryRepository::new(pool.clone()));
        (HistoryLedger::new(history.clone()), SqliteTargetRepository::new(pool), history)
    }

    #[tokio::test]
    async fn test_save_new_entity_records_non_empty_fields() {
        let (ledger, targets, _) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "ee"));

        let entry = ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap().unwrap();
        assert_eq!(entry.by, "alice");
        assert!(entry.changes.iter().any(|c| c.path == "name" && c.value == json!("FE_MAG_01")));
        assert!(!entry.changes.iter().any(|c| c.path == "desc"));

        let stored = targets.get_device(device.id).await.unwrap().unwrap();
        assert_eq!(stored.history, vec![entry.id]);
    }

    #[tokio::test]
    async fn test_repeated_save_without_change_records_once() {
        let (ledger, targets, history) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));
        ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();

        device.desc = "Quadrupole".to_string();
        let first = ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();
        let second = ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let entries = history.list_for(HistoryTarget::Device, device.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].changes, vec![crate::domain::models::Change {
            path: "desc".to_string(),
            value: json!("Quadrupole"),
        }]);
    }

    #[tokio::test]
    async fn test_unwatched_change_persists_without_entry() {
        let (ledger, targets, _) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));
        ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();

        device.desc = "Quadrupole".to_string();
        let entry = ledger
            .save(&mut device, "alice", &WatchedFields::paths(["name"]), &targets)
            .await
            .unwrap();
        assert!(entry.is_none());

        let stored = targets.get_device(device.id).await.unwrap().unwrap();
        assert_eq!(stored.desc, "Quadrupole");
        assert_eq!(stored.history.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_actor_rejected() {
        let (ledger, targets, _) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));

        let err = ledger.save(&mut device, "  ", &WatchedFields::All, &targets).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
        assert!(targets.get_device(device.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_of_ignores_unlinked_entries() {
        let (ledger, targets, history) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));
        ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();

        let orphan = HistoryEntry::new("mallory", HistoryTarget::Device, device.id, vec![]);
        history.append(&orphan).await.unwrap();

        let entries = ledger.history_of(&*device).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].by, "alice");
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_one_entity_conflict() {
        let (ledger, targets, _) = setup().await;
        let mut slot = Tracked::new(Slot::new("FS1_CSS", "ARR01"));
        ledger.save(&mut slot, "alice", &WatchedFields::All, &targets).await.unwrap();

        let loaded = targets.get_slot(slot.id).await.unwrap().unwrap();
        let mut first = Tracked::loaded(loaded.clone());
        let mut second = Tracked::loaded(loaded);

        first.checklist_id = Some(Uuid::new_v4());
        let linked = ledger.save(&mut first, "alice", &WatchedFields::All, &targets).await.unwrap().unwrap();

        second.group_id = Some(Uuid::new_v4());
        let err = ledger.save(&mut second, "bob", &WatchedFields::All, &targets).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));
        assert_eq!(err.status_code(), 409);

        let stored = targets.get_slot(slot.id).await.unwrap().unwrap();
        assert_eq!(stored.checklist_id, first.checklist_id);
        assert!(stored.group_id.is_none());
        assert!(stored.history.contains(&linked.id));
        assert_eq!(ledger.history_of(&stored).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_record_links_external_changes() {
        let (ledger, targets, _) = setup().await;
        let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));
        ledger.save(&mut device, "alice", &WatchedFields::All, &targets).await.unwrap();

        let none = ledger.record(&mut device, "alice", vec![], &targets).await.unwrap();
        assert!(none.is_none());

        let change = Change { path: "cables.C1".to_string(), value: serde_json::Value::Null };
        let entry = ledger.record(&mut device, "bob", vec![change], &targets).await.unwrap().unwrap();

        let stored = targets.get_device(device.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        let entries = ledger.history_of(&stored).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entry.id);
        assert_eq!(entries[0].changes[0].path, "cables.C1");
    }
}
