//! Confirmation workflow for reset, cancel and duplicate.
//!
//! The workflow only decides; the session executes the action it hands back
//! from `confirm` or from an ungated request.

use serde::{Deserialize, Serialize};

use crate::config::Messages;
use crate::role::MergeRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationKind {
    Reset,
    Cancel,
    Duplicate,
}

/// A question put to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub kind: ConfirmationKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    Idle,
    AwaitingConfirmation(ConfirmationKind),
}

/// Action to execute once a request is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Reset,
    Navigate,
    Merge(MergeRequest),
}

impl PendingAction {
    pub fn kind(&self) -> ConfirmationKind {
        match self {
            PendingAction::Reset => ConfirmationKind::Reset,
            PendingAction::Navigate => ConfirmationKind::Cancel,
            PendingAction::Merge(_) => ConfirmationKind::Duplicate,
        }
    }
}

/// Result of asking for a gated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Nothing to confirm; run the action now.
    Proceed(PendingAction),
    /// The user has to answer `request` first.
    Confirm(ConfirmationRequest),
}

#[derive(Debug, Clone)]
struct Awaiting {
    request: ConfirmationRequest,
    action: PendingAction,
}

#[derive(Debug, Clone)]
pub struct ConfirmationWorkflow {
    messages: Messages,
    awaiting: Option<Awaiting>,
}

impl ConfirmationWorkflow {
    pub fn new(messages: Messages) -> Self {
        Self {
            messages,
            awaiting: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        match &self.awaiting {
            None => WorkflowState::Idle,
            Some(awaiting) => WorkflowState::AwaitingConfirmation(awaiting.request.kind),
        }
    }

    /// The question currently awaiting an answer.
    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.awaiting.as_ref().map(|a| &a.request)
    }

    pub fn request_reset(&mut self, dirty: bool) -> Gate {
        self.gate(PendingAction::Reset, dirty)
    }

    pub fn request_cancel(&mut self, dirty: bool) -> Gate {
        self.gate(PendingAction::Navigate, dirty)
    }

    /// Duplication always asks, whether or not the form is dirty.
    pub fn request_duplicate(&mut self, request: MergeRequest) -> ConfirmationRequest {
        self.supersede();
        self.await_confirmation(PendingAction::Merge(request))
    }

    /// Clear the pending request and hand back its action.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        let awaiting = self.awaiting.take()?;
        tracing::debug!(kind = ?awaiting.request.kind, "confirmed");
        Some(awaiting.action)
    }

    /// Discard the pending request without side effects.
    pub fn decline(&mut self) -> Option<ConfirmationRequest> {
        let awaiting = self.awaiting.take()?;
        tracing::debug!(kind = ?awaiting.request.kind, "declined");
        Some(awaiting.request)
    }

    /// Drop whatever is pending, e.g. when the form goes away.
    pub fn abandon(&mut self) {
        self.awaiting = None;
    }

    fn gate(&mut self, action: PendingAction, dirty: bool) -> Gate {
        self.supersede();
        if !dirty {
            return Gate::Proceed(action);
        }
        Gate::Confirm(self.await_confirmation(action))
    }

    fn supersede(&mut self) {
        if let Some(previous) = self.awaiting.take() {
            tracing::debug!(kind = ?previous.request.kind, "superseded pending confirmation");
        }
    }

    fn await_confirmation(&mut self, action: PendingAction) -> ConfirmationRequest {
        let kind = action.kind();
        let request = ConfirmationRequest {
            kind,
            message: self.message_for(kind).to_string(),
        };
        self.awaiting = Some(Awaiting {
            request: request.clone(),
            action,
        });
        request
    }

    fn message_for(&self, kind: ConfirmationKind) -> &str {
        match kind {
            ConfirmationKind::Reset => &self.messages.reset,
            ConfirmationKind::Cancel => &self.messages.cancel,
            ConfirmationKind::Duplicate => &self.messages.duplicate,
        }
    }
}
