//! Checklist domain model.
//!
//! A checklist is attached to exactly one target. Its subjects are not stored
//! on the checklist: the effective subject list is derived on every read from
//! the default subjects of the checklist's type, the per-checklist overrides of
//! those defaults, and the checklist's own custom subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::history::{HistoryTarget, Trackable};
use super::target::TargetType;

/// Checklist type, selecting which default subjects apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChecklistType {
    DeviceDefault,
    SlotDefault,
    SlotSafety,
}

impl ChecklistType {
    pub const ALL: [Self; 3] = [Self::DeviceDefault, Self::SlotDefault, Self::SlotSafety];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceDefault => "device-default",
            Self::SlotDefault => "slot-default",
            Self::SlotSafety => "slot-safety",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "device-default" => Some(Self::DeviceDefault),
            "slot-default" => Some(Self::SlotDefault),
            "slot-safety" => Some(Self::SlotSafety),
            _ => None,
        }
    }
}

/// A checklist attached to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: Uuid,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub checklist_type: ChecklistType,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Uuid>,
    pub version: u64,
}

impl Checklist {
    pub fn new(target_type: TargetType, target_id: Uuid, checklist_type: ChecklistType) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_type,
            target_id,
            checklist_type,
            created_at: Utc::now(),
            history: Vec::new(),
            version: 1,
        }
    }
}

/// One line item of a checklist.
///
/// With `checklist_id` unset the subject is a default shared by every
/// checklist of `checklist_type`; otherwise it is custom to that checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSubject {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    pub checklist_id: Option<Uuid>,
    pub checklist_type: ChecklistType,
    pub order: i64,
    pub assignees: Vec<String>,
    pub mandatory: bool,
    pub required: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub history: Vec<Uuid>,
    #[serde(default)]
    pub version: u64,
}

impl ChecklistSubject {
    /// A default subject for a checklist type.
    pub fn standard(
        checklist_type: ChecklistType,
        name: impl Into<String>,
        desc: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            desc: desc.into(),
            checklist_id: None,
            checklist_type,
            order,
            assignees: Vec::new(),
            mandatory: false,
            required: false,
            is_final: false,
            history: Vec::new(),
            version: 1,
        }
    }

    /// A subject visible only to one checklist.
    pub fn custom(
        checklist_id: Uuid,
        checklist_type: ChecklistType,
        name: impl Into<String>,
        desc: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            checklist_id: Some(checklist_id),
            required: true,
            ..Self::standard(checklist_type, name, desc, order)
        }
    }

    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignees = assignees.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self.required = true;
        self
    }

    pub fn final_subject(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn is_custom(&self) -> bool {
        self.checklist_id.is_some()
    }

    /// Whether a status is expected for this subject.
    pub fn is_required(&self) -> bool {
        self.mandatory || self.required
    }
}

/// A per-checklist override field.
///
/// `Inherit` defers to the default subject's value; it is stored as NULL and is
/// distinct from any concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOverride<T> {
    #[default]
    Inherit,
    Set(T),
}

impl<T: Clone + PartialEq> FieldOverride<T> {
    /// Override with `value`, collapsing to `Inherit` when it equals the default.
    pub fn against_default(value: T, default: &T) -> Self {
        if &value == default {
            Self::Inherit
        } else {
            Self::Set(value)
        }
    }

    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Inherit, Self::Set)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Inherit => None,
            Self::Set(v) => Some(v),
        }
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Self::Inherit)
    }

    /// The effective value given the default's value.
    pub fn resolve(&self, default: &T) -> T {
        match self {
            Self::Inherit => default.clone(),
            Self::Set(v) => v.clone(),
        }
    }
}

/// Per-checklist override of a default subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectOverride {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub subject_name: String,
    #[serde(default)]
    pub desc: FieldOverride<String>,
    #[serde(default)]
    pub required: FieldOverride<bool>,
    #[serde(default)]
    pub assignees: FieldOverride<Vec<String>>,
    pub history: Vec<Uuid>,
    #[serde(default)]
    pub version: u64,
}

impl SubjectOverride {
    pub fn new(checklist_id: Uuid, subject_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            checklist_id,
            subject_name: subject_name.into(),
            desc: FieldOverride::Inherit,
            required: FieldOverride::Inherit,
            assignees: FieldOverride::Inherit,
            history: Vec::new(),
            version: 1,
        }
    }

    /// True when every field defers to the default.
    pub fn is_empty(&self) -> bool {
        self.desc.is_inherit() && self.required.is_inherit() && self.assignees.is_inherit()
    }

    /// Apply this override to a default subject.
    pub fn apply(&self, subject: &ChecklistSubject) -> ChecklistSubject {
        ChecklistSubject {
            desc: self.desc.resolve(&subject.desc),
            required: self.required.resolve(&subject.required),
            assignees: self.assignees.resolve(&subject.assignees),
            ..subject.clone()
        }
    }
}

/// Requested changes to a subject; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectUpdate {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
}

impl SubjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.desc.is_none() && self.required.is_none() && self.assignees.is_none()
    }
}

/// Value recorded for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusValue {
    /// Not yet approved.
    #[default]
    N,
    /// Approved.
    Y,
    /// Approved with a comment.
    YC,
}

impl StatusValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Y => "Y",
            Self::YC => "YC",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "N" => Some(Self::N),
            "Y" => Some(Self::Y),
            "YC" => Some(Self::YC),
            _ => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Y | Self::YC)
    }
}

/// Recorded status of one subject on one checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistStatus {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub subject_name: String,
    pub value: StatusValue,
    pub comment: String,
    pub input_by: String,
    pub input_on: DateTime<Utc>,
    pub history: Vec<Uuid>,
    #[serde(default)]
    pub version: u64,
}

impl ChecklistStatus {
    pub fn new(checklist_id: Uuid, subject_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            checklist_id,
            subject_name: subject_name.into(),
            value: StatusValue::N,
            comment: String::new(),
            input_by: String::new(),
            input_on: Utc::now(),
            history: Vec::new(),
            version: 1,
        }
    }
}

/// Aggregated approval state of a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistSummary {
    pub checked: usize,
    pub total: usize,
    pub approved: bool,
}

/// Read model of a checklist with its derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub checklist_type: ChecklistType,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub approved: bool,
    pub checked: usize,
    pub total: usize,
    pub subjects: Vec<ChecklistSubject>,
    pub statuses: Vec<ChecklistStatus>,
}

impl ChecklistView {
    pub fn new(
        checklist: &Checklist,
        subjects: Vec<ChecklistSubject>,
        statuses: Vec<ChecklistStatus>,
        summary: ChecklistSummary,
    ) -> Self {
        Self {
            id: checklist.id,
            checklist_type: checklist.checklist_type,
            target_type: checklist.target_type,
            target_id: checklist.target_id,
            approved: summary.approved,
            checked: summary.checked,
            total: summary.total,
            subjects,
            statuses,
        }
    }

    pub fn status_for(&self, subject_name: &str) -> Option<&ChecklistStatus> {
        self.statuses.iter().find(|s| s.subject_name == subject_name)
    }
}

macro_rules! impl_trackable {
    ($ty:ty, $target:expr) => {
        impl Trackable for $ty {
            fn history_target(&self) -> HistoryTarget {
                $target
            }

            fn entity_id(&self) -> Uuid {
                self.id
            }

            fn history(&self) -> &[Uuid] {
                &self.history
            }

            fn history_mut(&mut self) -> &mut Vec<Uuid> {
                &mut self.history
            }

            fn bump_version(&mut self) {
                self.version += 1;
            }
        }
    };
}

impl_trackable!(Checklist, HistoryTarget::Checklist);
impl_trackable!(ChecklistSubject, HistoryTarget::ChecklistSubject);
impl_trackable!(SubjectOverride, HistoryTarget::ChecklistSubjectOverride);
impl_trackable!(ChecklistStatus, HistoryTarget::ChecklistStatus);
