//! Change history domain model.
//!
//! Every mutable entity composes with the history ledger by implementing
//! [`Trackable`]. The ledger diffs a [`Tracked`] entity against the snapshot
//! taken when it was loaded and records the field-level changes as one
//! append-only [`HistoryEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};
use uuid::Uuid;

use super::target::TargetType;

/// Kind of entity a history entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTarget {
    Device,
    Slot,
    Group,
    Checklist,
    ChecklistSubject,
    ChecklistSubjectOverride,
    ChecklistStatus,
}

impl HistoryTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Slot => "slot",
            Self::Group => "group",
            Self::Checklist => "checklist",
            Self::ChecklistSubject => "checklist_subject",
            Self::ChecklistSubjectOverride => "checklist_subject_override",
            Self::ChecklistStatus => "checklist_status",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "device" => Some(Self::Device),
            "slot" => Some(Self::Slot),
            "group" => Some(Self::Group),
            "checklist" => Some(Self::Checklist),
            "checklist_subject" => Some(Self::ChecklistSubject),
            "checklist_subject_override" => Some(Self::ChecklistSubjectOverride),
            "checklist_status" => Some(Self::ChecklistStatus),
            _ => None,
        }
    }
}

impl From<TargetType> for HistoryTarget {
    fn from(t: TargetType) -> Self {
        match t {
            TargetType::Device => Self::Device,
            TargetType::Slot => Self::Slot,
            TargetType::Group => Self::Group,
        }
    }
}

/// A single field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub value: Value,
}

/// One append-only history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub by: String,
    pub target_type: HistoryTarget,
    pub target_id: Uuid,
    pub changes: Vec<Change>,
}

impl HistoryEntry {
    pub fn new(
        by: impl Into<String>,
        target_type: HistoryTarget,
        target_id: Uuid,
        changes: Vec<Change>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            by: by.into(),
            target_type,
            target_id,
            changes,
        }
    }
}

/// Fields that never appear in a change set.
pub const BOOKKEEPING_FIELDS: &[&str] = &["id", "history", "version"];

/// Which fields of an entity are watched for changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchedFields {
    /// Every field except bookkeeping fields.
    All,
    /// Only the listed top-level paths.
    Paths(Vec<String>),
}

impl WatchedFields {
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Paths(paths.into_iter().map(Into::into).collect())
    }

    pub fn is_watched(&self, path: &str) -> bool {
        if BOOKKEEPING_FIELDS.contains(&path) {
            return false;
        }
        match self {
            Self::All => true,
            Self::Paths(paths) => paths.iter().any(|p| p == path),
        }
    }
}

/// Capability shared by every entity whose changes are recorded in the ledger.
pub trait Trackable: Serialize + Send + Sync {
    /// Ledger category of this entity.
    fn history_target(&self) -> HistoryTarget;

    fn entity_id(&self) -> Uuid;

    /// Identifiers of history entries linked to this entity, oldest first.
    fn history(&self) -> &[Uuid];

    fn history_mut(&mut self) -> &mut Vec<Uuid>;

    /// Advance the optimistic version before an update. No-op for unversioned entities.
    fn bump_version(&mut self) {}

    /// Current field values keyed by top-level path.
    fn field_values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// An entity paired with the snapshot it had when it was last persisted.
#[derive(Debug, Clone)]
pub struct Tracked<E> {
    entity: E,
    persisted: Option<Map<String, Value>>,
}

impl<E: Trackable> Tracked<E> {
    /// Wrap an entity that has never been persisted.
    pub fn new(entity: E) -> Self {
        Self {
            entity,
            persisted: None,
        }
    }

    /// Wrap an entity freshly loaded from storage.
    pub fn loaded(entity: E) -> Self {
        let persisted = Some(entity.field_values());
        Self { entity, persisted }
    }

    pub fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    /// Changes between the persisted snapshot and the current values.
    pub fn changes(&self, watched: &WatchedFields) -> Vec<Change> {
        diff_fields(self.persisted.as_ref(), &self.entity.field_values(), watched)
    }

    /// Whether any field at all (watched or not) differs from the snapshot.
    pub fn is_dirty(&self) -> bool {
        match &self.persisted {
            None => true,
            Some(snapshot) => *snapshot != self.entity.field_values(),
        }
    }

    /// Record the current values as the persisted snapshot.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.entity.field_values());
    }

    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E> Deref for Tracked<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E> DerefMut for Tracked<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

/// Compute the change set between a previous snapshot and current values.
///
/// With no previous snapshot (a new entity), every watched field holding a
/// non-empty value is reported. Paths come out in the order of `current`.
pub fn diff_fields(
    previous: Option<&Map<String, Value>>,
    current: &Map<String, Value>,
    watched: &WatchedFields,
) -> Vec<Change> {
    current
        .iter()
        .filter(|(path, _)| watched.is_watched(path))
        .filter(|(path, value)| match previous {
            None => !is_empty_value(value),
            Some(prev) => prev.get(path.as_str()).unwrap_or(&Value::Null) != *value,
        })
        .map(|(path, value)| Change {
            path: path.clone(),
            value: value.clone(),
        })
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
