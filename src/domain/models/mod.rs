pub mod actor;
pub mod checklist;
pub mod config;
pub mod history;
pub mod role;
pub mod subject_templates;
pub mod target;

pub use actor::Actor;
pub use checklist::{
    Checklist, ChecklistStatus, ChecklistSubject, ChecklistSummary, ChecklistType, ChecklistView,
    FieldOverride, StatusValue, SubjectOverride, SubjectUpdate,
};
pub use config::{AuthConfig, Config, DatabaseConfig, HistoryConfig, LoggingConfig};
pub use history::{Change, HistoryEntry, HistoryTarget, Trackable, Tracked, WatchedFields};
pub use role::{
    normalize_role, resolve_roles, Role, RoleContext, RoleScheme, LEADER_QUALIFIER, VAR_AREA_LEADER,
    VAR_DEPT_LEADER,
};
pub use subject_templates::default_subjects;
pub use target::{Device, Group, SafetyLevel, Slot, Target, TargetType};
