//! Data shapes for role editing
//!
//! `RoleDraft` is the live edit buffer; a baseline is simply a draft captured
//! at load time. List fields that are semantically sets keep their display
//! order here and are only canonicalized for comparison.

use serde::{Deserialize, Serialize};

use crate::types::{RoleId, RoleStatus};

/// The live edit buffer of a role form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDraft {
    /// Present only when editing an existing role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoleId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: RoleStatus,

    /// Order matters for display only
    #[serde(default)]
    pub parent_attributes: Vec<String>,

    #[serde(default)]
    pub permissions: PermissionSet,
}

impl RoleDraft {
    /// An empty draft for create mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this draft edits an already persisted role
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Module and permission selection of a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub enabled_modules: Vec<String>,

    /// Composite keys of the form `<module>-<submodule>-<permission>`
    #[serde(default)]
    pub selected_permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_module: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_submodule: Option<String>,
}

impl PermissionSet {
    pub fn new<M, P>(enabled_modules: M, selected_permissions: P) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            enabled_modules: enabled_modules.into_iter().map(Into::into).collect(),
            selected_permissions: selected_permissions.into_iter().map(Into::into).collect(),
            active_module: None,
            active_submodule: None,
        }
    }
}

/// A request to fold another role's permissions into the current draft.
///
/// `enabled_modules` distinguishes "not provided" (`None`) from an explicitly
/// empty list (`Some(vec![])`); only the former keeps the current modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub duplicated_permissions: Vec<String>,

    #[serde(default)]
    pub enabled_modules: Option<Vec<String>>,
}

impl MergeRequest {
    /// Build a request that duplicates everything `source` grants
    pub fn from_permissions(source: &PermissionSet) -> Self {
        Self {
            duplicated_permissions: source.selected_permissions.clone(),
            enabled_modules: Some(source.enabled_modules.clone()),
        }
    }
}

/// Catalog listing entry for a role that can be duplicated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One module of the permission taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,

    /// Submodule name -> permission names
    #[serde(default)]
    pub submodules: std::collections::BTreeMap<String, Vec<String>>,
}

impl ModuleInfo {
    /// All composite permission keys this module offers
    pub fn permission_keys(&self) -> Vec<String> {
        self.submodules
            .iter()
            .flat_map(|(submodule, permissions)| {
                permissions
                    .iter()
                    .map(move |permission| format!("{}-{}-{}", self.name, submodule, permission))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_request_missing_fields_deserialize_to_defaults() {
        let request: MergeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.duplicated_permissions.is_empty());
        assert!(request.enabled_modules.is_none());
    }

    #[test]
    fn merge_request_keeps_explicit_empty_modules() {
        let request: MergeRequest =
            serde_json::from_str(r#"{"enabled_modules": []}"#).unwrap();
        assert_eq!(request.enabled_modules, Some(vec![]));
    }

    #[test]
    fn module_permission_keys_are_composite() {
        let mut module = ModuleInfo {
            name: "users".to_string(),
            ..Default::default()
        };
        module
            .submodules
            .insert("profile".to_string(), vec!["read".to_string(), "write".to_string()]);

        assert_eq!(
            module.permission_keys(),
            vec!["users-profile-read".to_string(), "users-profile-write".to_string()]
        );
    }
}
