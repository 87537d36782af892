//! Settings for the different scopes
//!
//! Supports two settings scopes:
//! - Global: per-user settings
//! - Project: settings for the current working directory

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use merge::merge_settings;
pub use parser::{parse_settings_toml, parse_settings_toml_str, to_toml};
pub use paths::settings_path_for_scope;
pub use schema::{MessageSettings, Messages, Settings};
pub use store::{SettingsStore, load_layered};

/// Settings scope levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingsScope {
    /// Per-user settings
    Global,
    /// Settings checked into the project
    Project,
}

/// Per-user settings directory (`<config_dir>/roledit`)
pub fn global_settings_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("roledit"))
}
