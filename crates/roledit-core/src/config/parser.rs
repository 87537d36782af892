//! TOML parsing with helpful error messages
//!
//! Shared by the settings layers and the role store.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::schema::Settings;

/// Parse roledit.toml with detailed error messages
pub fn parse_settings_toml(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    parse_settings_toml_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

/// Parse roledit.toml content from string
pub fn parse_settings_toml_str(content: &str) -> Result<Settings> {
    let settings: Settings = parse_toml_str(content)?;
    settings.validate()?;
    Ok(settings)
}

/// Deserialize any TOML document, pointing at the offending line on failure
pub fn parse_toml_str<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| enhance_toml_error(e, content))
}

/// Serialize a value to a TOML string
pub fn to_toml<T: Serialize>(value: &T) -> Result<String> {
    toml::to_string_pretty(value).with_context(|| "Failed to serialize to TOML")
}

/// Enhance TOML parsing errors with the surrounding lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
