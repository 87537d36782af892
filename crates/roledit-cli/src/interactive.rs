//! Interactive confirmation for the duplicate command.
//!
//! Shows what would be copied, then asks through a dialoguer prompt.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};

use roledit_core::role::{MergeRequest, RoleDraft};
use roledit_core::session::ConfirmationRequest;
use roledit_core::types::RoleId;

pub struct DuplicatePrompt<W: Write = io::Stdout> {
    /// Skip the question and answer yes
    yes: bool,
    /// Output writer (for testing)
    writer: W,
    theme: ColorfulTheme,
}

impl DuplicatePrompt<io::Stdout> {
    pub fn new(yes: bool) -> Self {
        Self {
            yes,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> DuplicatePrompt<W> {
    #[cfg(test)]
    pub fn with_writer(yes: bool, writer: W) -> Self {
        Self {
            yes,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Print the summary and return whether the user agreed.
    pub fn ask(
        &mut self,
        target: &RoleDraft,
        source: &RoleId,
        merge: &MergeRequest,
        request: &ConfirmationRequest,
    ) -> Result<bool> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Duplicate permissions").bold().cyan())?;
        writeln!(self.writer, "  ───────────────────────────")?;
        writeln!(self.writer, "  Into:        {}", style(&target.name).green())?;
        writeln!(self.writer, "  From:        {}", style(source).green())?;
        writeln!(
            self.writer,
            "  Permissions: {}",
            style(merge.duplicated_permissions.len()).green()
        )?;
        if let Some(modules) = &merge.enabled_modules {
            writeln!(
                self.writer,
                "  Modules:     {}",
                style(modules.join(", ")).green()
            )?;
        }
        writeln!(self.writer)?;

        if self.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(&request.message)
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}
