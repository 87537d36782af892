//! On-disk shape of roles.toml
//!
//! ```toml
//! [roles.support]
//! name = "Support"
//! department = "Customer Care"
//! status = "active"
//!
//! [roles.support.permissions]
//! enabled_modules = ["tickets"]
//! selected_permissions = ["tickets-queue-read"]
//!
//! [modules.tickets.submodules]
//! queue = ["read", "assign"]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::role::{ModuleInfo, RoleDraft, RoleSummary};
use crate::types::RoleId;

/// Root structure of roles.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesFile {
    /// Roles keyed by id; the stored draft carries no id of its own
    #[serde(default)]
    pub roles: BTreeMap<String, RoleDraft>,

    /// Permission taxonomy keyed by module name
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Submodule name -> permission names
    #[serde(default)]
    pub submodules: BTreeMap<String, Vec<String>>,
}

impl RolesFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The role stored under `id`, with its identity filled in
    pub fn role(&self, id: &RoleId) -> Option<RoleDraft> {
        self.roles.get(id.as_str()).map(|stored| RoleDraft {
            id: Some(id.clone()),
            ..stored.clone()
        })
    }

    /// Store `draft` under `id`
    pub fn put(&mut self, id: &RoleId, draft: &RoleDraft) {
        let stored = RoleDraft {
            id: None,
            ..draft.clone()
        };
        self.roles.insert(id.as_str().to_string(), stored);
    }

    pub fn summaries(&self) -> Vec<RoleSummary> {
        self.roles
            .iter()
            .map(|(id, role)| RoleSummary {
                id: RoleId::new(id.clone()),
                name: role.name.clone(),
                description: role.description.clone(),
            })
            .collect()
    }

    pub fn module_infos(&self) -> Vec<ModuleInfo> {
        self.modules
            .iter()
            .map(|(name, entry)| ModuleInfo {
                name: name.clone(),
                submodules: entry.submodules.clone(),
            })
            .collect()
    }

    /// Id of another role already using `name` (case-insensitive)
    pub fn name_taken_by(&self, name: &str, except: Option<&RoleId>) -> Option<RoleId> {
        let wanted = name.trim().to_lowercase();
        self.roles
            .iter()
            .filter(|(id, _)| except.is_none_or(|e| e.as_str() != id.as_str()))
            .find(|(_, role)| role.name.trim().to_lowercase() == wanted)
            .map(|(id, _)| RoleId::new(id.clone()))
    }

    /// A fresh id derived from `name`
    pub fn allocate_id(&self, name: &str) -> RoleId {
        let base = slugify(name);
        if !self.roles.contains_key(&base) {
            return RoleId::new(base);
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.roles.contains_key(candidate))
            .map(RoleId::new)
            .unwrap_or_else(|| RoleId::new(base))
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "role".to_string()
    } else {
        slug
    }
}
