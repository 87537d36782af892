//! Write guard that breaks update cycles between the form and its editors.
//!
//! Inputs and sub-editors may deliver the same logical value repeatedly. The
//! guard remembers the last accepted value per field and rejects writes that
//! would not change anything. Rejections are silent.

use std::collections::HashMap;

use crate::role::normalize::fingerprint;
use crate::role::{PermissionSet, ValidationErrors};
use crate::types::{Field, RoleStatus};

/// Value delivered for a scalar or list field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Status(RoleStatus),
    List(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<RoleStatus> for FieldValue {
    fn from(value: RoleStatus) -> Self {
        FieldValue::Status(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteGuard {
    last_accepted: HashMap<Field, FieldValue>,
    permissions_fingerprint: Option<String>,
    resetting: bool,
}

impl WriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a scalar write should reach the draft.
    ///
    /// On accept the value is remembered and the validation message for the
    /// field is cleared.
    pub fn should_accept(
        &mut self,
        field: Field,
        value: &FieldValue,
        errors: &mut ValidationErrors,
    ) -> bool {
        if self.last_accepted.get(&field) == Some(value) {
            tracing::debug!(field = %field, "suppressed repeated write");
            return false;
        }
        self.last_accepted.insert(field, value.clone());
        errors.clear_field(field);
        true
    }

    /// Whether a permissions write should reach the draft.
    ///
    /// Compares a fingerprint of the normalized value so that an equivalent
    /// set delivered in another order is rejected. Always rejects while a
    /// reset is running.
    pub fn should_accept_permissions(
        &mut self,
        permissions: &PermissionSet,
        errors: &mut ValidationErrors,
    ) -> bool {
        if self.resetting {
            tracing::debug!("suppressed permissions write during reset");
            return false;
        }
        let incoming = fingerprint(permissions);
        if self.permissions_fingerprint.as_deref() == Some(incoming.as_str()) {
            tracing::debug!("suppressed equivalent permissions write");
            return false;
        }
        self.permissions_fingerprint = Some(incoming);
        errors.clear_field(Field::Permissions);
        true
    }

    /// Record `permissions` as the last accepted value without a write.
    pub fn remember_permissions(&mut self, permissions: &PermissionSet) {
        self.permissions_fingerprint = Some(fingerprint(permissions));
    }

    /// Forget all scalar memory so re-entering a value is accepted.
    pub fn reset_scalars(&mut self) {
        self.last_accepted.clear();
    }

    pub fn begin_reset(&mut self) {
        self.resetting = true;
    }

    pub fn end_reset(&mut self) {
        self.resetting = false;
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }
}
