//! Settings store for loading and saving roledit.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Settings, SettingsScope, merge, parser, paths::settings_path_for_scope};

#[derive(Debug, Clone)]
pub struct SettingsStore {
    scope: SettingsScope,
    settings_path: PathBuf,
}

impl SettingsStore {
    pub fn from_scope(scope: SettingsScope) -> anyhow::Result<Self> {
        let global_dir = super::global_settings_dir()?;
        let project_root = std::env::current_dir()?;

        Ok(Self::from_paths(scope, &global_dir, &project_root))
    }

    pub fn from_paths(scope: SettingsScope, global_dir: &Path, project_root: &Path) -> Self {
        Self {
            scope,
            settings_path: settings_path_for_scope(scope, global_dir, project_root),
        }
    }

    pub fn scope(&self) -> SettingsScope {
        self.scope
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load(&self) -> anyhow::Result<Settings> {
        if !self.settings_path.exists() {
            return Ok(Settings::new());
        }
        parser::parse_settings_toml(&self.settings_path)
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        let content = parser::to_toml(settings).context("Failed to serialize settings to TOML")?;
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.settings_path, content).with_context(|| {
            format!(
                "Failed to write settings file: {}",
                self.settings_path.display()
            )
        })?;
        Ok(())
    }
}

/// Load both layers and merge them.
pub fn load_layered(global_dir: &Path, project_root: &Path) -> anyhow::Result<Settings> {
    let global = SettingsStore::from_paths(SettingsScope::Global, global_dir, project_root).load()?;
    let project =
        SettingsStore::from_paths(SettingsScope::Project, global_dir, project_root).load()?;
    tracing::debug!(
        global = %global_dir.display(),
        project = %project_root.display(),
        "loaded settings layers"
    );
    Ok(merge::merge_settings(Some(global), Some(project)))
}
