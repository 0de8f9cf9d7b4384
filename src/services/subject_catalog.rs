//! Checklist subject catalog.
//!
//! Resolves the effective subject list of a checklist from the shared default
//! template, the checklist's overrides and its custom subjects, and manages
//! those custom subjects and overrides.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::authorization::Authorizer;
use super::checklist_service::ChecklistScope;
use super::history_ledger::HistoryLedger;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    default_subjects, normalize_role, Actor, Change, Checklist, ChecklistSubject, ChecklistType,
    FieldOverride, HistoryConfig, SubjectOverride, SubjectUpdate, Tracked, WatchedFields,
};
use crate::domain::ports::{ChecklistRepository, SubjectRepository};

/// Fields recorded when only the editable subject fields are watched.
const SUBJECT_FIELDS: [&str; 3] = ["desc", "required", "assignees"];

/// Apply overrides to the defaults and append the custom subjects.
///
/// The result is sorted by `order`; within one order value defaults come
/// before custom subjects.
pub fn resolve_effective_subjects(
    defaults: Vec<ChecklistSubject>,
    customs: Vec<ChecklistSubject>,
    overrides: &[SubjectOverride],
) -> Vec<ChecklistSubject> {
    let mut subjects: Vec<ChecklistSubject> = defaults
        .into_iter()
        .map(|subject| match overrides.iter().find(|o| o.subject_name == subject.name) {
            Some(ovr) => ovr.apply(&subject),
            None => subject,
        })
        .chain(customs)
        .collect();
    subjects.sort_by_key(|s| (s.order, s.is_custom()));
    subjects
}

pub struct SubjectCatalog {
    subjects: Arc<dyn SubjectRepository>,
    checklists: Arc<dyn ChecklistRepository>,
    ledger: Arc<HistoryLedger>,
    authorizer: Arc<Authorizer>,
    watched: WatchedFields,
}

impl SubjectCatalog {
    pub fn new(
        subjects: Arc<dyn SubjectRepository>,
        checklists: Arc<dyn ChecklistRepository>,
        ledger: Arc<HistoryLedger>,
        authorizer: Arc<Authorizer>,
        history: &HistoryConfig,
    ) -> Self {
        let watched = if history.watch_all_subject_fields {
            WatchedFields::All
        } else {
            WatchedFields::paths(SUBJECT_FIELDS)
        };
        Self {
            subjects,
            checklists,
            ledger,
            authorizer,
            watched,
        }
    }

    /// Effective subjects of one checklist, ordered for evaluation.
    pub async fn effective_subjects(
        &self,
        checklist_id: Uuid,
        checklist_type: ChecklistType,
    ) -> DomainResult<Vec<ChecklistSubject>> {
        let defaults = self.subjects.list_defaults(checklist_type).await?;
        let customs = self.subjects.list_custom(checklist_id).await?;
        let overrides = self.subjects.list_overrides(checklist_id).await?;
        debug!(
            %checklist_id,
            defaults = defaults.len(),
            customs = customs.len(),
            overrides = overrides.len(),
            "resolving effective subjects"
        );
        Ok(resolve_effective_subjects(defaults, customs, &overrides))
    }

    /// Insert the built-in templates for every checklist type that has none.
    ///
    /// Returns the number of subjects inserted.
    pub async fn seed_defaults(&self, actor: &str) -> DomainResult<usize> {
        let mut inserted = 0;
        for checklist_type in ChecklistType::ALL {
            if !self.subjects.list_defaults(checklist_type).await?.is_empty() {
                debug!(checklist_type = checklist_type.as_str(), "defaults already present");
                continue;
            }
            for subject in default_subjects(checklist_type) {
                let mut tracked = Tracked::new(subject);
                self.ledger
                    .save(&mut tracked, actor, &WatchedFields::All, &*self.subjects)
                    .await?;
                inserted += 1;
            }
            info!(checklist_type = checklist_type.as_str(), "seeded default subjects");
        }
        Ok(inserted)
    }

    /// Create a subject visible only to the scoped checklist.
    pub async fn create_custom_subject(
        &self,
        scope: &ChecklistScope,
        desc: &str,
        assignees: &[String],
        actor: &Actor,
    ) -> DomainResult<ChecklistSubject> {
        let desc = desc.trim();
        if desc.is_empty() {
            return Err(DomainError::validation("Subject description cannot be empty"));
        }
        let assignees = normalize_assignees(assignees)?;
        self.authorizer.ensure_can_manage(actor, &scope.target)?;

        let checklist = &scope.checklist;
        let existing = self
            .effective_subjects(checklist.id, checklist.checklist_type)
            .await?;
        let taken: HashSet<&str> = existing.iter().map(|s| s.name.as_str()).collect();
        let name = unique_subject_name(&taken);
        let order = existing.iter().map(|s| s.order).max().map_or(0, |max| max + 1);

        let subject = ChecklistSubject::custom(checklist.id, checklist.checklist_type, name, desc, order)
            .with_assignees(assignees);
        let mut tracked = Tracked::new(subject);
        self.ledger
            .save(&mut tracked, actor.username(), &self.watched, &*self.subjects)
            .await?;

        info!(checklist_id = %checklist.id, subject = %tracked.name, actor = actor.username(), "created custom subject");
        Ok(tracked.into_inner())
    }

    /// Update one subject of the scoped checklist and return its effective form.
    ///
    /// Default subjects are changed through the checklist's override, which only
    /// keeps fields that differ from the default. Custom subjects are edited
    /// directly.
    pub async fn update_subject(
        &self,
        scope: &ChecklistScope,
        subject_name: &str,
        update: &SubjectUpdate,
        actor: &Actor,
    ) -> DomainResult<ChecklistSubject> {
        let checklist = &scope.checklist;
        let effective = self
            .effective_subjects(checklist.id, checklist.checklist_type)
            .await?
            .into_iter()
            .find(|s| s.name == subject_name)
            .ok_or_else(|| DomainError::SubjectNotFound(subject_name.to_string()))?;

        if effective.is_final {
            warn!(checklist_id = %checklist.id, subject = subject_name, "rejected final subject update");
            return Err(DomainError::validation(format!(
                "Subject {subject_name} is final and cannot be modified"
            )));
        }
        if effective.mandatory && update.required.is_some() {
            warn!(checklist_id = %checklist.id, subject = subject_name, "rejected mandatory requiredness update");
            return Err(DomainError::validation(format!(
                "Subject {subject_name} is mandatory; its requiredness cannot be changed"
            )));
        }
        let desc = match &update.desc {
            Some(desc) if desc.trim().is_empty() => {
                return Err(DomainError::validation("Subject description cannot be empty"));
            }
            Some(desc) => Some(desc.trim().to_string()),
            None => None,
        };
        let assignees = update.assignees.as_deref().map(normalize_assignees).transpose()?;
        self.authorizer.ensure_can_manage(actor, &scope.target)?;

        if update.is_empty() {
            return Ok(effective);
        }

        if effective.is_custom() {
            let mut tracked = Tracked::loaded(effective);
            if let Some(desc) = desc {
                tracked.desc = desc;
            }
            if let Some(required) = update.required {
                tracked.required = required;
            }
            if let Some(assignees) = assignees {
                tracked.assignees = assignees;
            }
            self.ledger
                .save(&mut tracked, actor.username(), &self.watched, &*self.subjects)
                .await?;
            info!(checklist_id = %checklist.id, subject = subject_name, "updated custom subject");
            return Ok(tracked.into_inner());
        }

        let default = self
            .subjects
            .list_defaults(checklist.checklist_type)
            .await?
            .into_iter()
            .find(|s| s.name == subject_name)
            .ok_or_else(|| DomainError::SubjectNotFound(subject_name.to_string()))?;

        let mut tracked = match self.subjects.get_override(checklist.id, subject_name).await? {
            Some(existing) => Tracked::loaded(existing),
            None => Tracked::new(SubjectOverride::new(checklist.id, subject_name)),
        };
        if let Some(desc) = desc {
            tracked.desc = FieldOverride::against_default(desc, &default.desc);
        }
        if let Some(required) = update.required {
            tracked.required = FieldOverride::against_default(required, &default.required);
        }
        if let Some(assignees) = assignees {
            tracked.assignees = FieldOverride::against_default(assignees, &default.assignees);
        }

        if tracked.is_empty() {
            if !tracked.is_new() {
                self.subjects.delete_override(tracked.id).await?;
                self.record_removal(checklist, format!("overrides.{subject_name}"), actor)
                    .await?;
                info!(checklist_id = %checklist.id, subject = subject_name, "override collapsed to default");
            }
            return Ok(default);
        }

        self.ledger
            .save(&mut tracked, actor.username(), &self.watched, &*self.subjects)
            .await?;
        info!(checklist_id = %checklist.id, subject = subject_name, "updated subject override");
        Ok(tracked.apply(&default))
    }

    /// Remove a custom subject from the scoped checklist.
    ///
    /// Statuses already recorded for it stay in storage and stop counting.
    pub async fn remove_custom_subject(
        &self,
        scope: &ChecklistScope,
        subject_name: &str,
        actor: &Actor,
    ) -> DomainResult<()> {
        let checklist = &scope.checklist;
        let custom = self
            .subjects
            .list_custom(checklist.id)
            .await?
            .into_iter()
            .find(|s| s.name == subject_name);

        let Some(custom) = custom else {
            let is_default = self
                .subjects
                .list_defaults(checklist.checklist_type)
                .await?
                .iter()
                .any(|s| s.name == subject_name);
            return Err(if is_default {
                DomainError::validation(format!("Subject {subject_name} is a default subject and cannot be removed"))
            } else {
                DomainError::SubjectNotFound(subject_name.to_string())
            });
        };
        self.authorizer.ensure_can_manage(actor, &scope.target)?;

        self.subjects.delete_subject(custom.id).await?;
        self.record_removal(checklist, format!("subjects.{subject_name}"), actor)
            .await?;
        info!(checklist_id = %checklist.id, subject = subject_name, actor = actor.username(), "removed custom subject");
        Ok(())
    }

    /// Record on the checklist that the row at `path` was deleted.
    async fn record_removal(&self, checklist: &Checklist, path: String, actor: &Actor) -> DomainResult<()> {
        let mut tracked = Tracked::loaded(checklist.clone());
        let change = Change { path, value: serde_json::Value::Null };
        self.ledger
            .record(&mut tracked, actor.username(), vec![change], &*self.checklists)
            .await?;
        Ok(())
    }
}

/// Validate and normalize an assignee list.
fn normalize_assignees(assignees: &[String]) -> DomainResult<Vec<String>> {
    if assignees.is_empty() {
        return Err(DomainError::validation("At least one assignee is required"));
    }
    let mut normalized: Vec<String> = Vec::with_capacity(assignees.len());
    for raw in assignees {
        let role = normalize_role(raw)
            .ok_or_else(|| DomainError::validation(format!("Malformed role identifier: {raw}")))?;
        if !normalized.contains(&role) {
            normalized.push(role);
        }
    }
    Ok(normalized)
}

/// An opaque subject name not present in `taken`.
fn unique_subject_name(taken: &HashSet<&str>) -> String {
    loop {
        let token = Uuid::new_v4().simple().to_string();
        let name = format!("C{}", token[..8].to_uppercase());
        if !taken.contains(name.as_str()) {
            return name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_overrides_and_orders_customs_last() {
        let t = ChecklistType::SlotDefault;
        let checklist_id = Uuid::new_v4();
        let defaults = vec![
            ChecklistSubject::standard(t, "AM", "Area Manager", 10).mandatory().final_subject(),
            ChecklistSubject::standard(t, "EE", "EE", 0).required(),
            ChecklistSubject::standard(t, "CRYO", "Cryogenics", 2),
        ];
        let customs = vec![ChecklistSubject::custom(checklist_id, t, "C1", "Vacuum", 10)];
        let mut ovr = SubjectOverride::new(checklist_id, "CRYO");
        ovr.required = FieldOverride::Set(true);

        let resolved = resolve_effective_subjects(defaults, customs, &[ovr]);
        let names: Vec<&str> = resolved.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EE", "CRYO", "AM", "C1"]);
        assert!(resolved[1].required);
    }

    #[test]
    fn test_normalize_assignees() {
        let normalized =
            normalize_assignees(&["grp:ee#leader".to_string(), "GRP:EE#LEADER".to_string(), "usr:bob".to_string()])
                .unwrap();
        assert_eq!(normalized, vec!["GRP:EE#LEADER", "USR:BOB"]);

        assert!(normalize_assignees(&[]).is_err());
        assert!(normalize_assignees(&["bob".to_string()]).is_err());
    }

    #[test]
    fn test_unique_subject_name_avoids_taken() {
        let taken: HashSet<&str> = ["EE", "ME"].into_iter().collect();
        let name = unique_subject_name(&taken);
        assert!(name.starts_with('C'));
        assert_eq!(name.len(), 9);
        assert!(!taken.contains(name.as_str()));
    }
}
