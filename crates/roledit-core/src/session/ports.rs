//! Collaborators a form session talks to.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::role::{MergeRequest, ModuleInfo, RoleDraft, RoleSummary};
use crate::types::{RoleId, SaveOperation};

/// Acknowledgement of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Identity of the saved role; assigned by the backend on create
    pub id: RoleId,
    pub operation: SaveOperation,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// The backend refused the draft; the message is shown as is
    #[error("{0}")]
    Rejected(String),
    #[error("Role '{0}' not found")]
    NotFound(RoleId),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Saves drafts. The only asynchronous boundary in a real deployment; the
/// session only observes the outcome.
pub trait RolePersistence {
    fn save(&self, draft: &RoleDraft, operation: SaveOperation) -> Result<Ack, PersistError>;
}

/// Read-only source for "duplicate from another role".
pub trait RoleCatalog {
    fn roles(&self) -> anyhow::Result<Vec<RoleSummary>>;

    /// Merge request carrying everything role `id` grants, `None` if unknown
    fn duplicate_request(&self, id: &RoleId) -> anyhow::Result<Option<MergeRequest>>;

    /// The module/submodule/permission taxonomy
    fn modules(&self) -> anyhow::Result<Vec<ModuleInfo>>;
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send {
    fn notify(&self, message: &str);
}

/// Routes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "roledit::notify", "{message}");
    }
}

/// Keeps notifications in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_buffer() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();

        notifier.notify("saved");
        notifier.notify("merged");

        assert_eq!(handle.messages(), vec!["saved", "merged"]);
        assert_eq!(handle.drain().len(), 2);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_persist_error_messages_pass_through() {
        let err = PersistError::Rejected("Name already taken".to_string());
        assert_eq!(err.to_string(), "Name already taken");

        let err = PersistError::NotFound(RoleId::new("ghost"));
        assert_eq!(err.to_string(), "Role 'ghost' not found");
    }
}
