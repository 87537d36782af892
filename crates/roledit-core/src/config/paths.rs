//! Settings path resolution helpers.

use std::path::{Path, PathBuf};

use super::SettingsScope;

pub const SETTINGS_FILE: &str = "roledit.toml";

pub fn settings_path_for_scope(
    scope: SettingsScope,
    global_dir: &Path,
    project_root: &Path,
) -> PathBuf {
    match scope {
        SettingsScope::Global => global_dir.join(SETTINGS_FILE),
        SettingsScope::Project => project_root.join(SETTINGS_FILE),
    }
}
