//! File-backed role store for loading and saving roles.toml.
//!
//! Implements both the persistence and the catalog collaborator, so the CLI
//! can edit and duplicate roles without any backend.

pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;

use crate::config::parser;
use crate::role::{MergeRequest, ModuleInfo, RoleDraft, RoleSummary};
use crate::session::{Ack, PersistError, RoleCatalog, RolePersistence};
use crate::types::{RoleId, SaveOperation};

pub use schema::{ModuleEntry, RolesFile};

pub const ROLES_FILE: &str = "roles.toml";

#[derive(Debug, Clone)]
pub struct RoleStore {
    path: PathBuf,
}

impl RoleStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<RolesFile> {
        if !self.path.exists() {
            return Ok(RolesFile::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read roles file: {}", self.path.display()))?;
        parser::parse_toml_str(&content)
            .with_context(|| format!("Failed to parse roles file: {}", self.path.display()))
    }

    pub fn save_file(&self, file: &RolesFile) -> anyhow::Result<()> {
        let content = parser::to_toml(file).context("Failed to serialize roles to TOML")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create roles directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write roles file: {}", self.path.display()))?;
        Ok(())
    }

    /// The role stored under `id`
    pub fn get(&self, id: &RoleId) -> anyhow::Result<Option<RoleDraft>> {
        Ok(self.load()?.role(id))
    }

    fn write_role(&self, draft: &RoleDraft, operation: SaveOperation) -> Result<RoleId, PersistError> {
        let mut file = self.load().map_err(storage_error)?;

        let id = match operation {
            SaveOperation::Create => {
                if let Some(existing) = file.name_taken_by(&draft.name, None) {
                    return Err(PersistError::Rejected(format!(
                        "A role named '{}' already exists ({})",
                        draft.name.trim(),
                        existing
                    )));
                }
                file.allocate_id(&draft.name)
            }
            SaveOperation::Update => {
                let id = draft.id.clone().ok_or_else(|| {
                    PersistError::Rejected("Cannot update a role without an id".to_string())
                })?;
                if !file.roles.contains_key(id.as_str()) {
                    return Err(PersistError::NotFound(id));
                }
                if let Some(existing) = file.name_taken_by(&draft.name, Some(&id)) {
                    return Err(PersistError::Rejected(format!(
                        "A role named '{}' already exists ({})",
                        draft.name.trim(),
                        existing
                    )));
                }
                id
            }
        };

        file.put(&id, draft);
        self.save_file(&file).map_err(storage_error)?;
        Ok(id)
    }
}

fn storage_error(err: anyhow::Error) -> PersistError {
    PersistError::Storage(format!("{err:#}"))
}

impl RolePersistence for RoleStore {
    fn save(&self, draft: &RoleDraft, operation: SaveOperation) -> Result<Ack, PersistError> {
        let id = self.write_role(draft, operation)?;
        tracing::debug!(role = %id, path = %self.path.display(), "wrote role");
        Ok(Ack {
            id,
            operation,
            saved_at: Utc::now(),
        })
    }
}

impl RoleCatalog for RoleStore {
    fn roles(&self) -> anyhow::Result<Vec<RoleSummary>> {
        Ok(self.load()?.summaries())
    }

    fn duplicate_request(&self, id: &RoleId) -> anyhow::Result<Option<MergeRequest>> {
        Ok(self
            .get(id)?
            .map(|role| MergeRequest::from_permissions(&role.permissions)))
    }

    fn modules(&self) -> anyhow::Result<Vec<ModuleInfo>> {
        Ok(self.load()?.module_infos())
    }
}
