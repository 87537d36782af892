//! Canonical form of a permission set
//!
//! Two permission sets that hold the same modules and permissions in a
//! different order normalize to the same value.

use super::schema::PermissionSet;

/// Normalize an optional permission set.
///
/// Set-like lists are sorted by byte-wise string ordering (locale
/// independent). `None` stays `None`.
pub fn normalize(permissions: Option<&PermissionSet>) -> Option<PermissionSet> {
    permissions.map(canonical)
}

/// Normalize a permission set that is known to be present.
pub fn canonical(permissions: &PermissionSet) -> PermissionSet {
    let mut enabled_modules = permissions.enabled_modules.clone();
    enabled_modules.sort_unstable();

    let mut selected_permissions = permissions.selected_permissions.clone();
    selected_permissions.sort_unstable();

    PermissionSet {
        enabled_modules,
        selected_permissions,
        active_module: permissions.active_module.clone(),
        active_submodule: permissions.active_submodule.clone(),
    }
}

/// Stable serialization of the canonical form, used as a write fingerprint.
pub fn fingerprint(permissions: &PermissionSet) -> String {
    // Serializing a struct of strings and vectors cannot fail; an empty
    // payload still yields a deterministic hash.
    let payload = serde_json::to_vec(&canonical(permissions)).unwrap_or_default();
    blake3::hash(&payload).to_hex().to_string()
}
