//! Checklist targets: devices, slots and groups.
//!
//! Targets reference each other and their checklist purely by identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::checklist::ChecklistType;
use super::history::{HistoryTarget, Trackable};
use super::role::RoleContext;

/// Kind of entity a checklist can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetType {
    Device,
    Slot,
    Group,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "DEVICE",
            Self::Slot => "SLOT",
            Self::Group => "GROUP",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEVICE" => Some(Self::Device),
            "SLOT" => Some(Self::Slot),
            "GROUP" => Some(Self::Group),
            _ => None,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Device => "Device",
            Self::Slot => "Slot",
            Self::Group => "Group",
        };
        f.write_str(label)
    }
}

/// Safety classification of a slot or slot group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    #[default]
    None,
    Control,
    ControlEsh,
    Credited,
    CreditedEsh,
    CreditedPps,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Control => "CONTROL",
            Self::ControlEsh => "CONTROL_ESH",
            Self::Credited => "CREDITED",
            Self::CreditedEsh => "CREDITED_ESH",
            Self::CreditedPps => "CREDITED_PPS",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "CONTROL" => Some(Self::Control),
            "CONTROL_ESH" => Some(Self::ControlEsh),
            "CREDITED" => Some(Self::Credited),
            "CREDITED_ESH" => Some(Self::CreditedEsh),
            "CREDITED_PPS" => Some(Self::CreditedPps),
            _ => None,
        }
    }

    /// Credited levels carry the high-impact safety checklist.
    pub fn is_credited(&self) -> bool {
        matches!(self, Self::Credited | Self::CreditedEsh | Self::CreditedPps)
    }

    fn slot_checklist_type(self) -> ChecklistType {
        if self.is_credited() {
            ChecklistType::SlotSafety
        } else {
            ChecklistType::SlotDefault
        }
    }
}

/// A physical device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    pub device_type: String,
    /// Owning department.
    pub dept: String,
    pub group_id: Option<Uuid>,
    pub checklist_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Uuid>,
    pub version: u64,
}

impl Device {
    pub fn new(name: impl Into<String>, device_type: impl Into<String>, dept: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            desc: String::new(),
            device_type: device_type.into(),
            dept: dept.into(),
            group_id: None,
            checklist_id: None,
            created_at: Utc::now(),
            history: Vec::new(),
            version: 1,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

/// A logical installation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    /// Area the slot belongs to; the area's leader manages it.
    pub area: String,
    pub dept: Option<String>,
    pub safety_level: SafetyLevel,
    pub group_id: Option<Uuid>,
    pub checklist_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Uuid>,
    pub version: u64,
}

impl Slot {
    pub fn new(name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            desc: String::new(),
            area: area.into(),
            dept: None,
            safety_level: SafetyLevel::default(),
            group_id: None,
            checklist_id: None,
            created_at: Utc::now(),
            history: Vec::new(),
            version: 1,
        }
    }

    pub fn with_safety_level(mut self, level: SafetyLevel) -> Self {
        self.safety_level = level;
        self
    }

    pub fn with_dept(mut self, dept: impl Into<String>) -> Self {
        self.dept = Some(dept.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

/// A group of slots or devices sharing one checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    /// Organizational unit owning the group.
    pub owner: String,
    pub member_type: TargetType,
    pub safety_level: SafetyLevel,
    pub checklist_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Uuid>,
    pub version: u64,
}

impl Group {
    pub fn new(name: impl Into<String>, owner: impl Into<String>, member_type: TargetType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            desc: String::new(),
            owner: owner.into(),
            member_type,
            safety_level: SafetyLevel::default(),
            checklist_id: None,
            created_at: Utc::now(),
            history: Vec::new(),
            version: 1,
        }
    }

    pub fn with_safety_level(mut self, level: SafetyLevel) -> Self {
        self.safety_level = level;
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Validate fields that the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Group name cannot be empty".to_string());
        }
        if self.member_type == TargetType::Group {
            return Err("Groups can only contain slots or devices".to_string());
        }
        Ok(())
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

impl_trackable!(Device, HistoryTarget::Device);
impl_trackable!(Slot, HistoryTarget::Slot);
impl_trackable!(Group, HistoryTarget::Group);

/// Any entity a checklist can be attached to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Device(Device),
    Slot(Slot),
    Group(Group),
}

impl Target {
    pub fn target_type(&self) -> TargetType {
        match self {
            Self::Device(_) => TargetType::Device,
            Self::Slot(_) => TargetType::Slot,
            Self::Group(_) => TargetType::Group,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Device(d) => d.id,
            Self::Slot(s) => s.id,
            Self::Group(g) => g.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Device(d) => &d.name,
            Self::Slot(s) => &s.name,
            Self::Group(g) => &g.name,
        }
    }

    pub fn checklist_id(&self) -> Option<Uuid> {
        match self {
            Self::Device(d) => d.checklist_id,
            Self::Slot(s) => s.checklist_id,
            Self::Group(g) => g.checklist_id,
        }
    }

    /// Group the target belongs to. Groups never belong to another group.
    pub fn group_id(&self) -> Option<Uuid> {
        match self {
            Self::Device(d) => d.group_id,
            Self::Slot(s) => s.group_id,
            Self::Group(_) => None,
        }
    }

    /// Checklist type selected by the target's classification.
    pub fn checklist_type(&self) -> ChecklistType {
        match self {
            Self::Device(_) => ChecklistType::DeviceDefault,
            Self::Slot(s) => s.safety_level.slot_checklist_type(),
            Self::Group(g) => match g.member_type {
                TargetType::Device => ChecklistType::DeviceDefault,
                TargetType::Slot | TargetType::Group => g.safety_level.slot_checklist_type(),
            },
        }
    }

    /// Organizational unit whose leader manages this target.
    pub fn owner_unit(&self) -> &str {
        match self {
            Self::Device(d) => &d.dept,
            Self::Slot(s) => &s.area,
            Self::Group(g) => &g.owner,
        }
    }

    /// Context for resolving role placeholders on this target.
    pub fn role_context(&self) -> RoleContext {
        match self {
            Self::Device(d) => RoleContext {
                dept: Some(d.dept.clone()),
                area: None,
            },
            Self::Slot(s) => RoleContext {
                dept: s.dept.clone(),
                area: Some(s.area.clone()),
            },
            Self::Group(g) => match g.member_type {
                TargetType::Device => RoleContext {
                    dept: Some(g.owner.clone()),
                    area: None,
                },
                TargetType::Slot | TargetType::Group => RoleContext {
                    dept: None,
                    area: Some(g.owner.clone()),
                },
            },
        }
    }
}

impl From<Device> for Target {
    fn from(d: Device) -> Self {
        Self::Device(d)
    }
}

impl From<Slot> for Target {
    fn from(s: Slot) -> Self {
        Self::Slot(s)
    }
}

impl From<Group> for Target {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}
