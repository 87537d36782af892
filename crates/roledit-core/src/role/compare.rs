//! Snapshot comparison between a baseline and the live draft

use std::collections::BTreeSet;

use super::normalize::normalize;
use super::schema::RoleDraft;
use crate::types::RoleStatus;

/// Whether `current` differs from `baseline`.
///
/// In create mode (`baseline` is `None`) this is an existence check: any
/// non-empty scalar, a non-default status, any parent attribute or any
/// selected permission counts as a change. Enabled modules alone do not.
///
/// In edit mode every field is compared by value, with `parent_attributes`
/// treated as a set and `permissions` compared in normalized form.
pub fn is_changed(baseline: Option<&RoleDraft>, current: &RoleDraft) -> bool {
    match baseline {
        None => has_content(current),
        Some(baseline) => !snapshots_equal(baseline, current),
    }
}

fn has_content(draft: &RoleDraft) -> bool {
    !draft.name.is_empty()
        || !draft.department.is_empty()
        || !draft.description.is_empty()
        || draft.status != RoleStatus::default()
        || !draft.parent_attributes.is_empty()
        || !draft.permissions.selected_permissions.is_empty()
}

fn snapshots_equal(baseline: &RoleDraft, current: &RoleDraft) -> bool {
    baseline.id == current.id
        && baseline.name == current.name
        && baseline.department == current.department
        && baseline.description == current.description
        && baseline.status == current.status
        && as_set(&baseline.parent_attributes) == as_set(&current.parent_attributes)
        && normalize(Some(&baseline.permissions)) == normalize(Some(&current.permissions))
}

fn as_set(values: &[String]) -> BTreeSet<&str> {
    values.iter().map(String::as_str).collect()
}
