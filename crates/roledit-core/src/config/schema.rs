//! Settings schema for roledit.toml
//!
//! Both layers share one shape:
//! - Global: ~/.config/roledit/roledit.toml
//! - Project: ./roledit.toml
//!
//! Every key is optional so that a layer only overrides what it sets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEFER_TICKS: u32 = 1;

/// Root settings structure for roledit.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the roles.toml catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Idle ticks before a dirty-flag recompute runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defer_ticks: Option<u32>,

    /// Confirmation texts
    #[serde(default)]
    pub messages: MessageSettings,
}

/// Confirmation text overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<String>,
}

/// Resolved confirmation texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub reset: String,
    pub cancel: String,
    pub duplicate: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            reset: "Discard your changes and restore the saved role?".to_string(),
            cancel: "You have unsaved changes. Leave without saving?".to_string(),
            duplicate: "Copy the permissions of the selected role into this role?".to_string(),
        }
    }
}

impl Settings {
    /// Create empty settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle ticks before a recompute, never below one
    pub fn defer_ticks(&self) -> u32 {
        self.defer_ticks.unwrap_or(DEFAULT_DEFER_TICKS).max(1)
    }

    /// Confirmation texts with defaults filled in
    pub fn messages(&self) -> Messages {
        let defaults = Messages::default();
        Messages {
            reset: self.messages.reset.clone().unwrap_or(defaults.reset),
            cancel: self.messages.cancel.clone().unwrap_or(defaults.cancel),
            duplicate: self.messages.duplicate.clone().unwrap_or(defaults.duplicate),
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.defer_ticks == Some(0) {
            anyhow::bail!("defer_ticks must be at least 1");
        }
        for (key, text) in [
            ("reset", &self.messages.reset),
            ("cancel", &self.messages.cancel),
            ("duplicate", &self.messages.duplicate),
        ] {
            if text.as_deref().is_some_and(|t| t.trim().is_empty()) {
                anyhow::bail!("messages.{} must not be empty", key);
            }
        }
        Ok(())
    }
}
