//! Settings layer merging logic
//!
//! Global -> Project: a project value wins whenever it is set.

use super::schema::{MessageSettings, Settings};

/// Merge the settings layers
///
/// # Arguments
/// * `global` - Settings from ~/.config/roledit/roledit.toml
/// * `project` - Settings from ./roledit.toml
pub fn merge_settings(global: Option<Settings>, project: Option<Settings>) -> Settings {
    let mut merged = global.unwrap_or_default();

    if let Some(layer) = project {
        if layer.store_path.is_some() {
            merged.store_path = layer.store_path;
        }
        if layer.defer_ticks.is_some() {
            merged.defer_ticks = layer.defer_ticks;
        }
        merge_messages(&mut merged.messages, layer.messages);
    }

    merged
}

fn merge_messages(base: &mut MessageSettings, overlay: MessageSettings) {
    if overlay.reset.is_some() {
        base.reset = overlay.reset;
    }
    if overlay.cancel.is_some() {
        base.cancel = overlay.cancel;
    }
    if overlay.duplicate.is_some() {
        base.duplicate = overlay.duplicate;
    }
}
