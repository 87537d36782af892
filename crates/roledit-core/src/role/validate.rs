//! Submit-time validation of a role draft

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::RoleDraft;
use crate::types::Field;

pub const NAME_MAX_LEN: usize = 64;
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the message recorded for `field`, returning whether one existed
    pub fn clear_field(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Validate a draft before it is handed to persistence.
pub fn validate(draft: &RoleDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, "Role name is required");
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.insert(
            Field::Name,
            format!("Role name must be at most {NAME_MAX_LEN} characters"),
        );
    }

    if draft.department.trim().is_empty() {
        errors.insert(Field::Department, "Department is required");
    }

    if draft.description.chars().count() > DESCRIPTION_MAX_LEN {
        errors.insert(
            Field::Description,
            format!("Description must be at most {DESCRIPTION_MAX_LEN} characters"),
        );
    }

    if let Some(message) = check_permissions(draft) {
        errors.insert(Field::Permissions, message);
    }

    errors
}

/// Checks key shape only; after a duplicate, keys may name modules outside
/// `enabled_modules`.
fn check_permissions(draft: &RoleDraft) -> Option<String> {
    draft
        .permissions
        .selected_permissions
        .iter()
        .find(|key| {
            let segments: Vec<&str> = key.splitn(3, '-').collect();
            segments.len() != 3 || segments.iter().any(|s| s.is_empty())
        })
        .map(|key| {
            format!("Invalid permission '{key}': expected <module>-<submodule>-<permission>")
        })
}
