//! Built-in default subjects for each checklist type.
//!
//! Every template ends with exactly one final, mandatory subject assigned to
//! the leader of the unit owning the target: `DO` (department owner) for
//! devices and `AM` (area manager) for slots.

use super::checklist::{ChecklistSubject, ChecklistType};
use super::role::{VAR_AREA_LEADER, VAR_DEPT_LEADER};

/// Default subjects for a checklist type, in evaluation order.
pub fn default_subjects(checklist_type: ChecklistType) -> Vec<ChecklistSubject> {
    match checklist_type {
        ChecklistType::DeviceDefault => device_default(),
        ChecklistType::SlotDefault => slot_default(),
        ChecklistType::SlotSafety => slot_safety(),
    }
}

fn device_default() -> Vec<ChecklistSubject> {
    let t = ChecklistType::DeviceDefault;
    vec![
        ChecklistSubject::standard(t, "EE", "EE", 0)
            .with_assignees(["GRP:EE#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "ME", "ME", 1)
            .with_assignees(["GRP:ME#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "CRYO", "Cryogenics", 2)
            .with_assignees(["GRP:CRYO#LEADER"]),
        ChecklistSubject::standard(t, "PHYS", "Physics", 3)
            .with_assignees(["GRP:PHYS#LEADER"]),
        ChecklistSubject::standard(t, "DO", "Device Owner", 10)
            .with_assignees([VAR_DEPT_LEADER])
            .mandatory()
            .final_subject(),
    ]
}

fn slot_default() -> Vec<ChecklistSubject> {
    let t = ChecklistType::SlotDefault;
    vec![
        ChecklistSubject::standard(t, "EE", "EE", 0)
            .with_assignees(["GRP:EE#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "ME", "ME", 1)
            .with_assignees(["GRP:ME#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "CRYO", "Cryogenics", 2)
            .with_assignees(["GRP:CRYO#LEADER"]),
        ChecklistSubject::standard(t, "PHYS", "Physics", 3)
            .with_assignees(["GRP:PHYS#LEADER"]),
        ChecklistSubject::standard(t, "ESHQ", "ESHQ", 4)
            .with_assignees(["GRP:ESHQ#LEADER"]),
        ChecklistSubject::standard(t, "AM", "Area Manager", 10)
            .with_assignees([VAR_AREA_LEADER])
            .mandatory()
            .final_subject(),
    ]
}

fn slot_safety() -> Vec<ChecklistSubject> {
    let t = ChecklistType::SlotSafety;
    vec![
        ChecklistSubject::standard(t, "EE", "EE", 0)
            .with_assignees(["GRP:EE#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "ME", "ME", 1)
            .with_assignees(["GRP:ME#LEADER"])
            .required(),
        ChecklistSubject::standard(t, "CRYO", "Cryogenics", 2)
            .with_assignees(["GRP:CRYO#LEADER"]),
        ChecklistSubject::standard(t, "PHYS", "Physics", 3)
            .with_assignees(["GRP:PHYS#LEADER"]),
        ChecklistSubject::standard(t, "ESHQ", "ESHQ", 4)
            .with_assignees(["GRP:ESHQ#LEADER"])
            .mandatory(),
        ChecklistSubject::standard(t, "PPS", "Personnel Protection", 5)
            .with_assignees(["GRP:PPS#LEADER"])
            .mandatory(),
        ChecklistSubject::standard(t, "AM", "Area Manager", 10)
            .with_assignees([VAR_AREA_LEADER])
            .mandatory()
            .final_subject(),
    ]
}
