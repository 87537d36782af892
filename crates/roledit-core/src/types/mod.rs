//! Shared core types used across the role, session and store layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a persisted role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Activation status of a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    /// Role can be assigned.
    #[default]
    Active,
    /// Role is kept but cannot be assigned.
    Inactive,
}

impl fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleStatus::Active => f.write_str("active"),
            RoleStatus::Inactive => f.write_str("inactive"),
        }
    }
}

impl TryFrom<&str> for RoleStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "active" => Ok(RoleStatus::Active),
            "inactive" => Ok(RoleStatus::Inactive),
            other => anyhow::bail!("Unknown role status: {}. Use 'active' or 'inactive'", other),
        }
    }
}

/// Editable fields of a role form, keyed the way validation reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "roleName")]
    Name,
    #[serde(rename = "department")]
    Department,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "parentAttributes")]
    ParentAttributes,
    #[serde(rename = "permissions")]
    Permissions,
}

impl Field {
    pub const SCALARS: [Field; 5] = [
        Field::Name,
        Field::Department,
        Field::Description,
        Field::Status,
        Field::ParentAttributes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "roleName",
            Field::Department => "department",
            Field::Description => "description",
            Field::Status => "status",
            Field::ParentAttributes => "parentAttributes",
            Field::Permissions => "permissions",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Field {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "roleName" | "name" => Ok(Field::Name),
            "department" => Ok(Field::Department),
            "description" => Ok(Field::Description),
            "status" => Ok(Field::Status),
            "parentAttributes" | "parent_attributes" => Ok(Field::ParentAttributes),
            "permissions" => Ok(Field::Permissions),
            other => anyhow::bail!("Unknown role field: {}", other),
        }
    }
}

/// Which persistence call a save maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveOperation {
    /// The draft has no identity yet.
    Create,
    /// The draft edits an existing role.
    Update,
}
