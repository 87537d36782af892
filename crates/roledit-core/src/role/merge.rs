//! Permission merging for "duplicate from another role"
//!
//! Implements the duplicate merge policy:
//! - enabled modules: replaced by the request when it carries them
//! - selected permissions: concatenated, in order, without de-duplication
//! - active module/submodule: kept from the current set

use super::schema::{MergeRequest, PermissionSet};

/// Merge a duplicate request into the current permission set
///
/// # Arguments
/// * `current` - Permission set of the draft being edited
/// * `request` - Permissions copied from the source role
///
/// # Returns
/// A new permission set; `current` is left untouched. Applying the same
/// request twice appends its permissions twice, so callers must apply a
/// request at most once.
pub fn merge(current: &PermissionSet, request: &MergeRequest) -> PermissionSet {
    let enabled_modules = match &request.enabled_modules {
        Some(modules) => modules.clone(),
        None => current.enabled_modules.clone(),
    };

    let mut selected_permissions = Vec::with_capacity(
        current.selected_permissions.len() + request.duplicated_permissions.len(),
    );
    selected_permissions.extend(current.selected_permissions.iter().cloned());
    selected_permissions.extend(request.duplicated_permissions.iter().cloned());

    tracing::debug!(
        duplicated = request.duplicated_permissions.len(),
        replaced_modules = request.enabled_modules.is_some(),
        "merged duplicated permissions"
    );

    PermissionSet {
        enabled_modules,
        selected_permissions,
        active_module: current.active_module.clone(),
        active_submodule: current.active_submodule.clone(),
    }
}
