//! Aggregation of subject statuses into a checklist's approval state.
//!
//! Everything here is pure and recomputed on every read. Approval is a single
//! gate on the final subject, not `checked == total`: a checklist can be
//! approved with other required subjects unmet, and is never approved while
//! the final subject is unmet.

use std::collections::HashMap;

use crate::domain::models::{ChecklistStatus, ChecklistSubject, ChecklistSummary, StatusValue};

/// Summarize effective subjects and their recorded statuses.
///
/// Only subjects that are mandatory or required are counted. Statuses for
/// subjects that no longer resolve are ignored. When more than one counted
/// subject is final, every one of them must be checked.
pub fn summarize(subjects: &[ChecklistSubject], statuses: &[ChecklistStatus]) -> ChecklistSummary {
    let values: HashMap<&str, StatusValue> = statuses
        .iter()
        .map(|s| (s.subject_name.as_str(), s.value))
        .collect();
    let is_checked = |subject: &ChecklistSubject| {
        values
            .get(subject.name.as_str())
            .is_some_and(StatusValue::is_checked)
    };

    let counted: Vec<&ChecklistSubject> = subjects.iter().filter(|s| s.is_required()).collect();
    let checked = counted.iter().filter(|s| is_checked(**s)).count();

    let mut finals = counted.iter().filter(|s| s.is_final).peekable();
    let approved = finals.peek().is_some() && finals.all(|s| is_checked(*s));

    ChecklistSummary {
        checked,
        total: counted.len(),
        approved,
    }
}

/// Whether `subject` refuses status changes under `summary`.
///
/// Once approved, every non-final subject is locked until the final subject
/// is reverted.
pub fn is_locked(subject: &ChecklistSubject, summary: &ChecklistSummary) -> bool {
    summary.approved && !subject.is_final
}
