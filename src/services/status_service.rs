//! Checklist status store: validated, history-tracked status submissions.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::approval_engine::{is_locked, summarize};
use super::authorization::Authorizer;
use super::checklist_service::ChecklistScope;
use super::history_ledger::HistoryLedger;
use super::subject_catalog::SubjectCatalog;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Actor, ChecklistStatus, ChecklistSummary, StatusValue, Tracked, WatchedFields,
};
use crate::domain::ports::StatusRepository;

/// Fields of a status recorded in its history.
const STATUS_FIELDS: [&str; 2] = ["value", "comment"];

/// A stored status together with the checklist summary it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOutcome {
    pub status: ChecklistStatus,
    pub summary: ChecklistSummary,
}

pub struct StatusService {
    catalog: Arc<SubjectCatalog>,
    statuses: Arc<dyn StatusRepository>,
    ledger: Arc<HistoryLedger>,
    authorizer: Arc<Authorizer>,
}

impl StatusService {
    pub fn new(
        catalog: Arc<SubjectCatalog>,
        statuses: Arc<dyn StatusRepository>,
        ledger: Arc<HistoryLedger>,
        authorizer: Arc<Authorizer>,
    ) -> Self {
        Self {
            catalog,
            statuses,
            ledger,
            authorizer,
        }
    }

    /// Set the status of one subject of the scoped checklist.
    ///
    /// Checks run in order: the subject exists and is required, the value is
    /// valid, `YC` carries a comment, the actor is an assignee, and the subject
    /// is not locked by an approved checklist. The final subject is never
    /// locked.
    pub async fn set_status(
        &self,
        scope: &ChecklistScope,
        subject_name: &str,
        value: &str,
        comment: &str,
        actor: &Actor,
    ) -> DomainResult<StatusOutcome> {
        let checklist = &scope.checklist;
        let subjects = self
            .catalog
            .effective_subjects(checklist.id, checklist.checklist_type)
            .await?;
        let subject = subjects
            .iter()
            .find(|s| s.name == subject_name)
            .ok_or_else(|| DomainError::SubjectNotFound(subject_name.to_string()))?;

        if !subject.is_required() {
            return Err(DomainError::validation(format!("Subject {subject_name} is not required")));
        }
        let value = StatusValue::from_str(value)
            .ok_or_else(|| DomainError::validation(format!("Invalid status value: {value}")))?;
        let comment = comment.trim();
        if value == StatusValue::YC && comment.is_empty() {
            return Err(DomainError::validation("A comment is required when approving with comment"));
        }
        if !self
            .authorizer
            .can_assign_status(actor, subject, &scope.target.role_context())
        {
            warn!(checklist_id = %checklist.id, subject = subject_name, actor = actor.username(), "status change forbidden");
            return Err(DomainError::forbidden(format!(
                "{} is not an assignee of subject {subject_name}",
                actor.username()
            )));
        }

        let mut statuses = self.statuses.list(checklist.id).await?;
        if is_locked(subject, &summarize(&subjects, &statuses)) {
            warn!(checklist_id = %checklist.id, subject = subject_name, "subject locked by approval");
            return Err(DomainError::validation(format!(
                "Subject {subject_name} is locked while the checklist is approved"
            )));
        }

        let position = statuses.iter().position(|s| s.subject_name == subject_name);
        let mut tracked = match position {
            Some(i) => Tracked::loaded(statuses[i].clone()),
            None => Tracked::new(ChecklistStatus::new(checklist.id, subject_name)),
        };
        tracked.value = value;
        tracked.comment = comment.to_string();
        tracked.input_by = actor.username().to_string();
        tracked.input_on = Utc::now();

        self.ledger
            .save(&mut tracked, actor.username(), &WatchedFields::paths(STATUS_FIELDS), &*self.statuses)
            .await?;

        let status = tracked.into_inner();
        match position {
            Some(i) => statuses[i] = status.clone(),
            None => statuses.push(status.clone()),
        }
        let summary = summarize(&subjects, &statuses);

        info!(
            checklist_id = %checklist.id,
            subject = subject_name,
            value = value.as_str(),
            actor = actor.username(),
            approved = summary.approved,
            "status updated"
        );
        Ok(StatusOutcome { status, summary })
    }
}
