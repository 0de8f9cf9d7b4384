//! Checklist engine services.

pub mod approval_engine;
pub mod authorization;
pub mod checklist_service;
pub mod group_service;
pub mod history_ledger;
pub mod status_service;
pub mod subject_catalog;
pub mod target_service;

pub use approval_engine::{is_locked, summarize};
pub use authorization::Authorizer;
pub use checklist_service::{ChecklistScope, ChecklistService};
pub use group_service::GroupService;
pub use history_ledger::HistoryLedger;
pub use status_service::{StatusOutcome, StatusService};
pub use subject_catalog::{resolve_effective_subjects, SubjectCatalog};
pub use target_service::TargetService;

use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::{
    ChecklistRepository, HistoryRepository, StatusRepository, SubjectRepository, TargetRepository,
};

/// One implementation of every storage port.
#[derive(Clone)]
pub struct Repositories {
    pub targets: Arc<dyn TargetRepository>,
    pub checklists: Arc<dyn ChecklistRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub statuses: Arc<dyn StatusRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

/// All services wired over one set of repositories.
pub struct Engine {
    pub targets: TargetService,
    pub groups: GroupService,
    pub checklists: ChecklistService,
    pub catalog: Arc<SubjectCatalog>,
    pub ledger: Arc<HistoryLedger>,
}

impl Engine {
    pub fn new(repos: Repositories, config: &Config) -> Self {
        let ledger = Arc::new(HistoryLedger::new(repos.history));
        let authorizer = Arc::new(Authorizer::new(&config.auth));
        let catalog = Arc::new(SubjectCatalog::new(
            repos.subjects,
            repos.checklists.clone(),
            ledger.clone(),
            authorizer.clone(),
            &config.history,
        ));

        Self {
            targets: TargetService::new(repos.targets.clone(), ledger.clone()),
            groups: GroupService::new(repos.targets.clone(), ledger.clone(), authorizer.clone()),
            checklists: ChecklistService::new(
                repos.targets,
                repos.checklists,
                repos.statuses,
                catalog.clone(),
                ledger.clone(),
                authorizer,
            ),
            catalog,
            ledger,
        }
    }
}
