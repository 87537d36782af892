//! Scripted editing sessions.
//!
//! A script is a TOML file with an optional `role` to edit and a list of
//! steps, each run against a live form session:
//!
//! ```toml
//! role = "support"
//!
//! [[steps]]
//! action = "set"
//! field = "roleName"
//! value = "Support Team"
//!
//! [[steps]]
//! action = "tick"
//!
//! [[steps]]
//! action = "reset"
//!
//! [[steps]]
//! action = "confirm"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use roledit_core::config::parser;
use roledit_core::role::MergeRequest;
use roledit_core::session::{
    ConfirmOutcome, FieldValue, FormSession, RecordingNotifier, RequestOutcome, SessionError,
    WorkflowState,
};
use roledit_core::store::RoleStore;
use roledit_core::types::{Field, RoleId, RoleStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Role to edit; create mode when absent
    #[serde(default)]
    pub role: Option<RoleId>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Set {
        field: String,
        value: StepValue,
    },
    Permissions {
        #[serde(default)]
        enabled_modules: Vec<String>,
        #[serde(default)]
        selected_permissions: Vec<String>,
    },
    Pending {
        value: bool,
    },
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    Reset,
    Cancel,
    Duplicate {
        /// Copy from a stored role
        #[serde(default)]
        from: Option<RoleId>,
        #[serde(default)]
        permissions: Vec<String>,
        #[serde(default)]
        enabled_modules: Option<Vec<String>>,
    },
    Confirm,
    Decline,
    Save,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Text(String),
    List(Vec<String>),
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Set { .. } => "set",
            Step::Permissions { .. } => "permissions",
            Step::Pending { .. } => "pending",
            Step::Tick { .. } => "tick",
            Step::Reset => "reset",
            Step::Cancel => "cancel",
            Step::Duplicate { .. } => "duplicate",
            Step::Confirm => "confirm",
            Step::Decline => "decline",
            Step::Save => "save",
        }
    }
}

/// What one step did to the session.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub outcome: String,
    pub state: WorkflowState,
    /// Dirty flag as published after the step
    pub dirty: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<String>,
}

pub fn load_script(path: &Path) -> Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    parser::parse_toml_str(&content)
        .with_context(|| format!("Failed to parse script: {}", path.display()))
}

pub struct Replay<'a> {
    session: FormSession,
    store: &'a RoleStore,
    notifier: RecordingNotifier,
}

impl<'a> Replay<'a> {
    pub fn new(session: FormSession, store: &'a RoleStore, notifier: RecordingNotifier) -> Self {
        Self {
            session,
            store,
            notifier,
        }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<StepReport>> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                self.run_step(index + 1, step)
                    .with_context(|| format!("Step {} ({}) failed", index + 1, step.action()))
            })
            .collect()
    }

    fn run_step(&mut self, index: usize, step: &Step) -> Result<StepReport> {
        tracing::debug!(index, action = step.action(), "replaying step");
        let outcome = self.apply(step)?;
        Ok(StepReport {
            index,
            action: step.action(),
            outcome,
            state: self.session.workflow_state(),
            dirty: self.session.published_dirty(),
            notifications: self.notifier.drain(),
        })
    }

    fn apply(&mut self, step: &Step) -> Result<String> {
        let outcome = match step {
            Step::Set { field, value } => {
                let field = Field::try_from(field.as_str())?;
                let value = field_value(field, value)?;
                accepted(self.session.set_field(field, value))
            }
            Step::Permissions {
                enabled_modules,
                selected_permissions,
            } => {
                let mut permissions = self.session.draft().permissions.clone();
                permissions.enabled_modules = enabled_modules.clone();
                permissions.selected_permissions = selected_permissions.clone();
                accepted(self.session.set_permissions(permissions))
            }
            Step::Pending { value } => {
                self.session.set_pending_permission_changes(*value);
                format!("pending = {value}")
            }
            Step::Tick { count } => {
                let mut published = None;
                for _ in 0..*count {
                    if let Some(dirty) = self.session.tick() {
                        published = Some(dirty);
                    }
                }
                match published {
                    Some(dirty) => format!("published dirty = {dirty}"),
                    None => "no change".to_string(),
                }
            }
            Step::Reset => request_outcome(self.session.request_reset()),
            Step::Cancel => request_outcome(self.session.request_cancel()),
            Step::Duplicate {
                from,
                permissions,
                enabled_modules,
            } => {
                let request = match from {
                    Some(source) => self.session.request_duplicate_from(self.store, source)?,
                    None => self.session.request_duplicate(MergeRequest {
                        duplicated_permissions: permissions.clone(),
                        enabled_modules: enabled_modules.clone(),
                    }),
                };
                format!("asks: {}", request.message)
            }
            Step::Confirm => match self.session.confirm() {
                Some(outcome) => confirm_outcome(&outcome),
                None => "nothing to confirm".to_string(),
            },
            Step::Decline => match self.session.decline() {
                Some(request) => format!("declined {:?}", request.kind).to_lowercase(),
                None => "nothing to decline".to_string(),
            },
            Step::Save => match self.session.submit(self.store) {
                Ok(ack) => format!("saved as {}", ack.id),
                Err(SessionError::Invalid(errors)) => format!("invalid: {errors}"),
                Err(SessionError::Persist(err)) => format!("failed: {err}"),
            },
        };
        Ok(outcome)
    }
}

fn field_value(field: Field, value: &StepValue) -> Result<FieldValue> {
    Ok(match (field, value) {
        (Field::Status, StepValue::Text(text)) => {
            FieldValue::Status(RoleStatus::try_from(text.as_str())?)
        }
        (Field::ParentAttributes, StepValue::List(list)) => FieldValue::List(list.clone()),
        (Field::Name | Field::Department | Field::Description, StepValue::Text(text)) => {
            FieldValue::Text(text.clone())
        }
        (Field::Permissions, _) => {
            anyhow::bail!("Use a 'permissions' step to change permissions")
        }
        (field, _) => anyhow::bail!("Wrong value type for field '{}'", field),
    })
}

fn accepted(changed: bool) -> String {
    if changed { "accepted" } else { "ignored" }.to_string()
}

fn request_outcome(outcome: RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Done(outcome) => confirm_outcome(&outcome),
        RequestOutcome::AwaitingConfirmation(request) => format!("asks: {}", request.message),
    }
}

fn confirm_outcome(outcome: &ConfirmOutcome) -> String {
    match outcome {
        ConfirmOutcome::Reset => "reset".to_string(),
        ConfirmOutcome::Navigated => "left form".to_string(),
        ConfirmOutcome::Merged { added } => format!("merged {added} permission(s)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledit_core::config::Settings;

    fn script(content: &str) -> Script {
        parser::parse_toml_str(content).unwrap()
    }

    fn store() -> RoleStore {
        RoleStore::new(std::env::temp_dir().join("roledit-replay-missing").join("roles.toml"))
    }

    #[test]
    fn test_parse_steps() {
        let script = script(
            r#"
            role = "ops"

            [[steps]]
            action = "set"
            field = "parentAttributes"
            value = ["hq", "emea"]

            [[steps]]
            action = "tick"
            count = 3

            [[steps]]
            action = "duplicate"
            from = "support"

            [[steps]]
            action = "confirm"
            "#,
        );

        assert_eq!(script.role, Some(RoleId::new("ops")));
        assert_eq!(script.steps.len(), 4);
        assert!(matches!(script.steps[0], Step::Set { value: StepValue::List(ref l), .. } if l.len() == 2));
        assert!(matches!(script.steps[1], Step::Tick { count: 3 }));
        assert_eq!(script.steps[3].action(), "confirm");
    }

    #[test]
    fn test_tick_count_defaults_to_one() {
        let script = script("[[steps]]\naction = \"tick\"\n");
        assert!(matches!(script.steps[0], Step::Tick { count: 1 }));
    }

    #[test]
    fn test_replay_reports_each_step() {
        let notifier = RecordingNotifier::new();
        let session = FormSession::create(&Settings::default(), Box::new(notifier.clone()));
        let store = store();
        let mut replay = Replay::new(session, &store, notifier);

        let steps = script(
            r#"
            [[steps]]
            action = "set"
            field = "roleName"
            value = "Ops"

            [[steps]]
            action = "tick"

            [[steps]]
            action = "reset"

            [[steps]]
            action = "decline"

            [[steps]]
            action = "duplicate"
            permissions = ["m-s-read"]

            [[steps]]
            action = "confirm"
            "#,
        )
        .steps;

        let reports = replay.run(&steps).unwrap();

        assert_eq!(reports[0].outcome, "accepted");
        assert!(!reports[0].dirty);
        assert_eq!(reports[1].outcome, "published dirty = true");
        assert_eq!(
            reports[2].state,
            WorkflowState::AwaitingConfirmation(roledit_core::session::ConfirmationKind::Reset)
        );
        assert_eq!(reports[3].outcome, "declined reset");
        assert_eq!(reports[5].outcome, "merged 1 permission(s)");
        assert_eq!(reports[5].notifications.len(), 1);
        assert_eq!(
            replay.session().draft().permissions.selected_permissions,
            vec!["m-s-read"]
        );
    }

    #[test]
    fn test_bad_field_names_step() {
        let notifier = RecordingNotifier::new();
        let session = FormSession::create(&Settings::default(), Box::new(notifier.clone()));
        let store = store();
        let mut replay = Replay::new(session, &store, notifier);

        let steps = script("[[steps]]\naction = \"set\"\nfield = \"colour\"\nvalue = \"red\"\n").steps;
        let err = replay.run(&steps).unwrap_err();

        assert!(format!("{err:#}").contains("Step 1 (set)"));
    }
}
