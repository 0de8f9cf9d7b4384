//! Checklist assignment, resolution and views.
//!
//! This is the entry point the operator surface calls: it loads the checklist
//! and its owning target, then hands the scope to the subject catalog or the
//! status service.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::approval_engine::summarize;
use super::authorization::Authorizer;
use super::history_ledger::HistoryLedger;
use super::status_service::{StatusOutcome, StatusService};
use super::subject_catalog::SubjectCatalog;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Actor, Checklist, ChecklistSubject, ChecklistView, HistoryEntry, HistoryTarget, SubjectUpdate,
    Target, TargetType, Tracked, WatchedFields,
};
use crate::domain::ports::{ChecklistRepository, StatusRepository, TargetRepository};

/// A checklist together with the target that owns it.
#[derive(Debug, Clone)]
pub struct ChecklistScope {
    pub checklist: Checklist,
    pub target: Target,
}

pub struct ChecklistService {
    targets: Arc<dyn TargetRepository>,
    checklists: Arc<dyn ChecklistRepository>,
    statuses: Arc<dyn StatusRepository>,
    catalog: Arc<SubjectCatalog>,
    status_service: StatusService,
    ledger: Arc<HistoryLedger>,
    authorizer: Arc<Authorizer>,
}

impl ChecklistService {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        checklists: Arc<dyn ChecklistRepository>,
        statuses: Arc<dyn StatusRepository>,
        catalog: Arc<SubjectCatalog>,
        ledger: Arc<HistoryLedger>,
        authorizer: Arc<Authorizer>,
    ) -> Self {
        let status_service = StatusService::new(
            catalog.clone(),
            statuses.clone(),
            ledger.clone(),
            authorizer.clone(),
        );
        Self {
            targets,
            checklists,
            statuses,
            catalog,
            status_service,
            ledger,
            authorizer,
        }
    }

    /// Assign a new checklist to a target.
    ///
    /// The checklist type follows the target's classification. Fails with a
    /// conflict if the target already has a checklist.
    pub async fn create_checklist(
        &self,
        actor: &Actor,
        target_type: TargetType,
        target_id: Uuid,
    ) -> DomainResult<ChecklistView> {
        let target = self
            .targets
            .get_target(target_type, target_id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type, id: target_id })?;
        self.authorizer.ensure_can_manage(actor, &target)?;

        if target.checklist_id().is_some() {
            return Err(DomainError::ChecklistAlreadyAssigned { target_type, target_id });
        }

        // An unlinked row is an earlier assignment whose link step failed.
        let checklist = match self.checklists.find_by_target(target_type, target_id).await? {
            Some(existing) => {
                warn!(checklist_id = %existing.id, %target_id, "completing interrupted checklist assignment");
                existing
            }
            None => {
                let mut checklist = Tracked::new(Checklist::new(target_type, target_id, target.checklist_type()));
                self.ledger
                    .save(&mut checklist, actor.username(), &WatchedFields::All, &*self.checklists)
                    .await?;
                checklist.into_inner()
            }
        };
        self.link_checklist(actor, target, checklist.id).await?;

        info!(
            checklist_id = %checklist.id,
            target_type = target_type.as_str(),
            %target_id,
            checklist_type = checklist.checklist_type.as_str(),
            actor = actor.username(),
            "checklist created"
        );
        self.view(&checklist).await
    }

    async fn link_checklist(&self, actor: &Actor, target: Target, checklist_id: Uuid) -> DomainResult<()> {
        let actor = actor.username();
        let watched = WatchedFields::All;
        let store = &*self.targets;
        match target {
            Target::Device(device) => {
                let mut tracked = Tracked::loaded(device);
                tracked.checklist_id = Some(checklist_id);
                self.ledger.save(&mut tracked, actor, &watched, store).await?;
            }
            Target::Slot(slot) => {
                let mut tracked = Tracked::loaded(slot);
                tracked.checklist_id = Some(checklist_id);
                self.ledger.save(&mut tracked, actor, &watched, store).await?;
            }
            Target::Group(group) => {
                let mut tracked = Tracked::loaded(group);
                tracked.checklist_id = Some(checklist_id);
                self.ledger.save(&mut tracked, actor, &watched, store).await?;
            }
        }
        Ok(())
    }

    /// Load a checklist and its owning target.
    pub async fn scope(&self, checklist_id: Uuid) -> DomainResult<ChecklistScope> {
        let checklist = self.load_checklist(checklist_id).await?;
        let target = self
            .targets
            .get_target(checklist.target_type, checklist.target_id)
            .await?
            .ok_or(DomainError::TargetNotFound {
                target_type: checklist.target_type,
                id: checklist.target_id,
            })?;
        Ok(ChecklistScope { checklist, target })
    }

    /// The derived view of one checklist.
    pub async fn get_checklist(&self, checklist_id: Uuid) -> DomainResult<ChecklistView> {
        let checklist = self.load_checklist(checklist_id).await?;
        self.view(&checklist).await
    }

    async fn view(&self, checklist: &Checklist) -> DomainResult<ChecklistView> {
        let subjects = self
            .catalog
            .effective_subjects(checklist.id, checklist.checklist_type)
            .await?;
        let statuses = self.statuses.list(checklist.id).await?;
        let summary = summarize(&subjects, &statuses);
        Ok(ChecklistView::new(checklist, subjects, statuses, summary))
    }

    /// The checklist governing `target`.
    ///
    /// A member of a group that has a checklist defers to the group's
    /// checklist; otherwise the target's own checklist applies. A reference to
    /// a group or checklist that does not exist is reported as not found.
    pub async fn resolve_checklist(&self, target: &Target) -> DomainResult<Option<Checklist>> {
        if let Some(group_id) = target.group_id() {
            let group = self
                .targets
                .get_group(group_id)
                .await?
                .ok_or(DomainError::TargetNotFound { target_type: TargetType::Group, id: group_id })?;
            if let Some(checklist) = self.own_checklist(TargetType::Group, group_id, group.checklist_id).await? {
                debug!(target_id = %target.id(), %group_id, "deferring to group checklist");
                return Ok(Some(checklist));
            }
        }

        self.own_checklist(target.target_type(), target.id(), target.checklist_id())
            .await
    }

    /// A target's own checklist: the linked one, or an unlinked row assigned to it.
    async fn own_checklist(
        &self,
        target_type: TargetType,
        target_id: Uuid,
        linked: Option<Uuid>,
    ) -> DomainResult<Option<Checklist>> {
        match linked {
            Some(checklist_id) => self.load_checklist(checklist_id).await.map(Some),
            None => self.checklists.find_by_target(target_type, target_id).await,
        }
    }

    async fn load_checklist(&self, checklist_id: Uuid) -> DomainResult<Checklist> {
        self.checklists
            .get(checklist_id)
            .await?
            .ok_or(DomainError::ChecklistNotFound(checklist_id))
    }

    /// The view of the checklist governing a target, if it has one.
    pub async fn get_checklist_for_target(
        &self,
        target_type: TargetType,
        target_id: Uuid,
    ) -> DomainResult<Option<ChecklistView>> {
        let target = self
            .targets
            .get_target(target_type, target_id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type, id: target_id })?;
        match self.resolve_checklist(&target).await? {
            Some(checklist) => self.view(&checklist).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn create_custom_subject(
        &self,
        actor: &Actor,
        checklist_id: Uuid,
        desc: &str,
        assignees: &[String],
    ) -> DomainResult<ChecklistSubject> {
        let scope = self.scope(checklist_id).await?;
        self.catalog.create_custom_subject(&scope, desc, assignees, actor).await
    }

    pub async fn update_subject(
        &self,
        actor: &Actor,
        checklist_id: Uuid,
        subject_name: &str,
        update: &SubjectUpdate,
    ) -> DomainResult<ChecklistSubject> {
        let scope = self.scope(checklist_id).await?;
        self.catalog.update_subject(&scope, subject_name, update, actor).await
    }

    pub async fn remove_custom_subject(
        &self,
        actor: &Actor,
        checklist_id: Uuid,
        subject_name: &str,
    ) -> DomainResult<()> {
        let scope = self.scope(checklist_id).await?;
        self.catalog.remove_custom_subject(&scope, subject_name, actor).await
    }

    pub async fn set_status(
        &self,
        actor: &Actor,
        checklist_id: Uuid,
        subject_name: &str,
        value: &str,
        comment: &str,
    ) -> DomainResult<StatusOutcome> {
        let scope = self.scope(checklist_id).await?;
        self.status_service
            .set_status(&scope, subject_name, value, comment, actor)
            .await
    }

    /// History of a target or checklist, newest first.
    pub async fn history_for(&self, target_type: HistoryTarget, id: Uuid) -> DomainResult<Vec<HistoryEntry>> {
        match target_type {
            HistoryTarget::Device | HistoryTarget::Slot | HistoryTarget::Group => {
                let kind = match target_type {
                    HistoryTarget::Device => TargetType::Device,
                    HistoryTarget::Slot => TargetType::Slot,
                    _ => TargetType::Group,
                };
                let target = self
                    .targets
                    .get_target(kind, id)
                    .await?
                    .ok_or(DomainError::TargetNotFound { target_type: kind, id })?;
                match &target {
                    Target::Device(d) => self.ledger.history_of(d).await,
                    Target::Slot(s) => self.ledger.history_of(s).await,
                    Target::Group(g) => self.ledger.history_of(g).await,
                }
            }
            HistoryTarget::Checklist => {
                let checklist = self.load_checklist(id).await?;
                self.ledger.history_of(&checklist).await
            }
            other => Err(DomainError::validation(format!(
                "History lookup by id is not available for {}; use the status history of a checklist",
                other.as_str()
            ))),
        }
    }

    /// History of one subject's status on a checklist, newest first.
    pub async fn status_history(&self, checklist_id: Uuid, subject_name: &str) -> DomainResult<Vec<HistoryEntry>> {
        let status = self
            .statuses
            .get(checklist_id, subject_name)
            .await?
            .ok_or_else(|| DomainError::SubjectNotFound(subject_name.to_string()))?;
        self.ledger.history_of(&status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, repositories};
    use crate::domain::models::{ChecklistType, Config, Device, SafetyLevel, Slot};
    use crate::domain::ports::EntityStore;
    use crate::services::Engine;

    async fn engine() -> Engine {
        let pool = create_migrated_test_pool().await.unwrap();
        let engine = Engine::new(repositories(pool), &Config::default());
        engine.catalog.seed_defaults("setup").await.unwrap();
        engine
    }

    fn admin() -> Actor {
        Actor::new("root", ["SYS:ADMIN"])
    }

    #[tokio::test]
    async fn test_checklist_type_follows_safety_level() {
        let engine = engine().await;
        let slot = engine
            .targets
            .create_slot(&admin(), Slot::new("FS1_CSS:PPS", "ARR01").with_safety_level(SafetyLevel::CreditedPps))
            .await
            .unwrap();

        let view = engine.checklists.create_checklist(&admin(), TargetType::Slot, slot.id).await.unwrap();
        assert_eq!(view.checklist_type, ChecklistType::SlotSafety);
        assert!(view.subjects.iter().any(|s| s.name == "PPS" && s.mandatory));

        let linked = engine.targets.get_slot(slot.id).await.unwrap();
        assert_eq!(linked.checklist_id, Some(view.id));
    }

    #[tokio::test]
    async fn test_second_checklist_conflicts() {
        let engine = engine().await;
        let device = engine
            .targets
            .create_device(&admin(), Device::new("FE_MAG_01", "magnet", "EE"))
            .await
            .unwrap();

        engine.checklists.create_checklist(&admin(), TargetType::Device, device.id).await.unwrap();
        let err = engine
            .checklists
            .create_checklist(&admin(), TargetType::Device, device.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_create_requires_manage_permission() {
        let engine = engine().await;
        let device = engine
            .targets
            .create_device(&admin(), Device::new("FE_MAG_01", "magnet", "EE"))
            .await
            .unwrap();

        let outsider = Actor::new("mallory", ["GRP:ME#LEADER"]);
        let err = engine
            .checklists
            .create_checklist(&outsider, TargetType::Device, device.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let leader = Actor::new("lee", ["GRP:EE#LEADER"]);
        assert!(engine.checklists.create_checklist(&leader, TargetType::Device, device.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unassigned_target_resolves_to_none() {
        let engine = engine().await;
        let slot = engine.targets.create_slot(&admin(), Slot::new("FS1_CSS", "ARR01")).await.unwrap();

        let view = engine
            .checklists
            .get_checklist_for_target(TargetType::Slot, slot.id)
            .await
            .unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_dangling_checklist_reference_is_not_found() {
        let engine = engine().await;
        let mut slot = Slot::new("FS1_CSS", "ARR01");
        slot.checklist_id = Some(Uuid::new_v4());
        let slot = engine.targets.create_slot(&admin(), slot).await.unwrap();

        let err = engine
            .checklists
            .get_checklist_for_target(TargetType::Slot, slot.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ChecklistNotFound(_)));
    }

    #[tokio::test]
    async fn test_checklist_history_records_creation() {
        let engine = engine().await;
        let device = engine
            .targets
            .create_device(&admin(), Device::new("FE_MAG_01", "magnet", "EE"))
            .await
            .unwrap();
        let view = engine.checklists.create_checklist(&admin(), TargetType::Device, device.id).await.unwrap();

        let history = engine.checklists.history_for(HistoryTarget::Checklist, view.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].changes.iter().any(|c| c.path == "checklist_type"));

        let device_history = engine.checklists.history_for(HistoryTarget::Device, device.id).await.unwrap();
        assert_eq!(device_history.len(), 2);
        assert_eq!(device_history[0].changes[0].path, "checklist_id");
    }

    #[tokio::test]
    async fn test_unlinked_checklist_resolves_and_assignment_completes() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repos = repositories(pool);
        let engine = Engine::new(repos.clone(), &Config::default());
        engine.catalog.seed_defaults("setup").await.unwrap();
        let slot = engine.targets.create_slot(&admin(), Slot::new("FS1_CSS", "ARR01")).await.unwrap();

        // The checklist row exists but the slot was never linked to it.
        let orphan = Checklist::new(TargetType::Slot, slot.id, ChecklistType::SlotDefault);
        repos.checklists.insert(&orphan).await.unwrap();

        let view = engine
            .checklists
            .get_checklist_for_target(TargetType::Slot, slot.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.id, orphan.id);

        let view = engine.checklists.create_checklist(&admin(), TargetType::Slot, slot.id).await.unwrap();
        assert_eq!(view.id, orphan.id);
        assert_eq!(engine.targets.get_slot(slot.id).await.unwrap().checklist_id, Some(orphan.id));

        let err = engine
            .checklists
            .create_checklist(&admin(), TargetType::Slot, slot.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ChecklistAlreadyAssigned { .. }));
    }
}
