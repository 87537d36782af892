//! Application context for unified dependency injection.

use std::path::PathBuf;

use crate::config::{self, Settings};
use crate::session::{FormSession, Notifier};
use crate::store::{ROLES_FILE, RoleStore};
use crate::types::RoleId;

/// Unified application context for dependency injection.
///
/// Frontends create this once and pass it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    project_root: PathBuf,
    global_config_dir: PathBuf,
    store_override: Option<PathBuf>,
}

impl AppContext {
    /// Create a new context; `home_dir` is the fallback for the config dir.
    pub fn new(home_dir: PathBuf, project_root: PathBuf) -> Self {
        let global_config_dir = config::global_settings_dir()
            .unwrap_or_else(|_| home_dir.join(".config").join("roledit"));

        Self::with_global_config_dir(project_root, global_config_dir)
    }

    /// Context for the current user and working directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let project_root = std::env::current_dir()?;
        Ok(Self::new(home_dir, project_root))
    }

    /// Create context with custom global config directory (for testing).
    pub fn with_global_config_dir(project_root: PathBuf, global_config_dir: PathBuf) -> Self {
        Self {
            project_root,
            global_config_dir,
            store_override: None,
        }
    }

    /// Use `path` as the role store regardless of settings.
    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store_override = Some(path);
        self
    }

    /// Global and project settings, merged.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        config::load_layered(&self.global_config_dir, &self.project_root)
    }

    /// Where roles.toml lives: explicit override, then settings (relative
    /// paths resolve against the project root), then the global config dir.
    pub fn store_path(&self, settings: &Settings) -> PathBuf {
        if let Some(path) = &self.store_override {
            return path.clone();
        }
        match &settings.store_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.project_root.join(path),
            None => self.global_config_dir.join(ROLES_FILE),
        }
    }

    /// Get a RoleStore for the given settings.
    pub fn role_store(&self, settings: &Settings) -> RoleStore {
        RoleStore::new(self.store_path(settings))
    }

    /// Open a session: edit mode for `id`, create mode for `None`.
    pub fn open_session(
        &self,
        id: Option<&RoleId>,
        notifier: Box<dyn Notifier>,
    ) -> anyhow::Result<FormSession> {
        let settings = self.settings()?;
        match id {
            None => Ok(FormSession::create(&settings, notifier)),
            Some(id) => {
                let baseline = self
                    .role_store(&settings)
                    .get(id)?
                    .ok_or_else(|| anyhow::anyhow!("Role '{}' not found", id))?;
                Ok(FormSession::edit(baseline, &settings, notifier))
            }
        }
    }
}
