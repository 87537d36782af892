//! One role-editing session
//!
//! A `FormSession` owns the baseline, the live draft, the write guard, the
//! dirty tracker, the confirmation workflow and the validation errors. It is
//! never shared: each open form gets its own session.

pub mod confirm;
pub mod defer;
pub mod dirty;
pub mod guard;
pub mod ports;

use thiserror::Error;

use crate::config::Settings;
use crate::role::{
    MergeRequest, PermissionSet, RoleDraft, ValidationErrors, merge, normalize, validate,
};
use crate::types::{Field, RoleId, RoleStatus, SaveOperation};

pub use confirm::{
    ConfirmationKind, ConfirmationRequest, ConfirmationWorkflow, Gate, PendingAction,
    WorkflowState,
};
pub use defer::Deferred;
pub use dirty::{DirtyTracker, compute_dirty};
pub use guard::{FieldValue, WriteGuard};
pub use ports::{
    Ack, Notifier, PersistError, RecordingNotifier, RoleCatalog, RolePersistence,
    TracingNotifier,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What an executed gated action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Fields were restored to the baseline
    Reset,
    /// The form was left
    Navigated,
    /// Duplicated permissions were folded in
    Merged { added: usize },
}

/// Result of asking for reset or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Done(ConfirmOutcome),
    AwaitingConfirmation(ConfirmationRequest),
}

pub struct FormSession {
    baseline: Option<RoleDraft>,
    draft: RoleDraft,
    has_pending_permission_changes: bool,
    guard: WriteGuard,
    tracker: DirtyTracker,
    workflow: ConfirmationWorkflow,
    errors: ValidationErrors,
    notifier: Box<dyn Notifier>,
    navigated: bool,
}

impl FormSession {
    /// Start a session for a new role (no baseline).
    pub fn create(settings: &Settings, notifier: Box<dyn Notifier>) -> Self {
        Self::open(None, settings, notifier)
    }

    /// Start a session editing `baseline`.
    pub fn edit(baseline: RoleDraft, settings: &Settings, notifier: Box<dyn Notifier>) -> Self {
        Self::open(Some(baseline), settings, notifier)
    }

    fn open(baseline: Option<RoleDraft>, settings: &Settings, notifier: Box<dyn Notifier>) -> Self {
        let draft = baseline.clone().unwrap_or_default();
        let mut guard = WriteGuard::new();
        guard.remember_permissions(&draft.permissions);

        tracing::debug!(
            role = ?draft.id,
            edit = baseline.is_some(),
            "opened form session"
        );

        Self {
            baseline,
            draft,
            has_pending_permission_changes: false,
            guard,
            tracker: DirtyTracker::new(settings.defer_ticks()),
            workflow: ConfirmationWorkflow::new(settings.messages()),
            errors: ValidationErrors::new(),
            notifier,
            navigated: false,
        }
    }

    pub fn draft(&self) -> &RoleDraft {
        &self.draft
    }

    pub fn baseline(&self) -> Option<&RoleDraft> {
        self.baseline.as_ref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn workflow_state(&self) -> WorkflowState {
        self.workflow.state()
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.workflow.pending()
    }

    pub fn has_pending_permission_changes(&self) -> bool {
        self.has_pending_permission_changes
    }

    /// Whether the user has left the form
    pub fn is_navigated(&self) -> bool {
        self.navigated
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Write a scalar or list field. Returns whether the draft changed.
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> bool {
        if !value_fits(field, &value) {
            tracing::debug!(field = %field, "ignored write with mismatched value type");
            return false;
        }
        if !self.guard.should_accept(field, &value, &mut self.errors) {
            return false;
        }
        match (field, value) {
            (Field::Name, FieldValue::Text(text)) => self.draft.name = text,
            (Field::Department, FieldValue::Text(text)) => self.draft.department = text,
            (Field::Description, FieldValue::Text(text)) => self.draft.description = text,
            (Field::Status, FieldValue::Status(status)) => self.draft.status = status,
            (Field::ParentAttributes, FieldValue::List(list)) => {
                self.draft.parent_attributes = list
            }
            _ => return false,
        }
        self.tracker.invalidate();
        true
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        self.set_field(Field::Name, FieldValue::Text(name.into()))
    }

    pub fn set_department(&mut self, department: impl Into<String>) -> bool {
        self.set_field(Field::Department, FieldValue::Text(department.into()))
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        self.set_field(Field::Description, FieldValue::Text(description.into()))
    }

    pub fn set_status(&mut self, status: RoleStatus) -> bool {
        self.set_field(Field::Status, FieldValue::Status(status))
    }

    pub fn set_parent_attributes(&mut self, attributes: Vec<String>) -> bool {
        self.set_field(Field::ParentAttributes, FieldValue::List(attributes))
    }

    /// Write the permission set as delivered by the permission table.
    /// Equivalent re-deliveries are dropped.
    pub fn set_permissions(&mut self, permissions: PermissionSet) -> bool {
        if !self
            .guard
            .should_accept_permissions(&permissions, &mut self.errors)
        {
            return false;
        }
        self.draft.permissions = permissions;
        self.tracker.invalidate();
        true
    }

    /// The permission table reports an edit it has not delivered yet.
    pub fn set_pending_permission_changes(&mut self, pending: bool) {
        if self.has_pending_permission_changes != pending {
            self.has_pending_permission_changes = pending;
            self.tracker.invalidate();
        }
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Advance one idle tick. Returns the new dirty flag when it changed.
    pub fn tick(&mut self) -> Option<bool> {
        self.tracker.tick(
            self.baseline.as_ref(),
            &self.draft,
            self.has_pending_permission_changes,
        )
    }

    /// Current dirty flag, running any pending recompute first.
    pub fn is_dirty(&mut self) -> bool {
        self.flush_dirty();
        self.tracker.is_dirty()
    }

    /// Dirty flag as last published, without forcing a recompute.
    pub fn published_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    fn flush_dirty(&mut self) -> Option<bool> {
        self.tracker.flush(
            self.baseline.as_ref(),
            &self.draft,
            self.has_pending_permission_changes,
        )
    }

    // ------------------------------------------------------------------
    // Confirmation workflow
    // ------------------------------------------------------------------

    /// Restore the saved state; asks first when there is something to lose.
    pub fn request_reset(&mut self) -> RequestOutcome {
        let dirty = self.is_dirty();
        let gate = self.workflow.request_reset(dirty);
        self.resolve_gate(gate)
    }

    /// Leave the form; asks first when there is something to lose.
    pub fn request_cancel(&mut self) -> RequestOutcome {
        let dirty = self.is_dirty();
        let gate = self.workflow.request_cancel(dirty);
        self.resolve_gate(gate)
    }

    /// Park a duplicate request; it is applied only on `confirm`.
    pub fn request_duplicate(&mut self, request: MergeRequest) -> ConfirmationRequest {
        self.workflow.request_duplicate(request)
    }

    /// Look up `source` in the catalog and park a duplicate of it.
    pub fn request_duplicate_from(
        &mut self,
        catalog: &dyn RoleCatalog,
        source: &RoleId,
    ) -> anyhow::Result<ConfirmationRequest> {
        let request = catalog
            .duplicate_request(source)?
            .ok_or_else(|| anyhow::anyhow!("Role '{}' not found in catalog", source))?;
        Ok(self.request_duplicate(request))
    }

    /// Execute the action awaiting confirmation.
    pub fn confirm(&mut self) -> Option<ConfirmOutcome> {
        let action = self.workflow.confirm()?;
        Some(self.execute(action))
    }

    /// Drop the action awaiting confirmation.
    pub fn decline(&mut self) -> Option<ConfirmationRequest> {
        self.workflow.decline()
    }

    /// Leave the form unconditionally, abandoning any pending question.
    pub fn close(&mut self) {
        self.workflow.abandon();
        self.navigated = true;
    }

    fn resolve_gate(&mut self, gate: Gate) -> RequestOutcome {
        match gate {
            Gate::Proceed(action) => RequestOutcome::Done(self.execute(action)),
            Gate::Confirm(request) => RequestOutcome::AwaitingConfirmation(request),
        }
    }

    fn execute(&mut self, action: PendingAction) -> ConfirmOutcome {
        match action {
            PendingAction::Reset => {
                self.perform_reset();
                ConfirmOutcome::Reset
            }
            PendingAction::Navigate => {
                self.close();
                tracing::info!(role = ?self.draft.id, "left role form");
                ConfirmOutcome::Navigated
            }
            PendingAction::Merge(request) => self.apply_merge(&request),
        }
    }

    fn perform_reset(&mut self) {
        let template = self.baseline.clone().unwrap_or_default();

        self.draft.id = template.id;
        self.draft.name = template.name;
        self.draft.department = template.department;
        self.draft.description = template.description;
        self.draft.status = template.status;
        self.draft.parent_attributes = template.parent_attributes;

        self.errors.clear();
        self.guard.reset_scalars();

        self.guard.begin_reset();
        self.reset_permission_table(template.permissions);
        self.guard.end_reset();

        self.tracker.invalidate();
        tracing::info!(role = ?self.draft.id, "reset role form");
    }

    /// The permission table's own reset path. It writes the restored value
    /// directly, then runs its normalization pass, whose write-back goes
    /// through the generic path and is dropped by the guard's latch. Seeding
    /// the guard afterwards drops later echoes of the restored value.
    fn reset_permission_table(&mut self, permissions: PermissionSet) {
        let normalized = normalize(Some(&permissions));
        self.draft.permissions = permissions;
        self.has_pending_permission_changes = false;
        if let Some(normalized) = normalized {
            self.set_permissions(normalized);
        }
        self.guard.remember_permissions(&self.draft.permissions);
    }

    /// `added` is zero when the merged set was equivalent to the current one.
    fn apply_merge(&mut self, request: &MergeRequest) -> ConfirmOutcome {
        let merged = merge(&self.draft.permissions, request);
        if !self.set_permissions(merged) {
            tracing::debug!("duplicate left permissions unchanged");
            return ConfirmOutcome::Merged { added: 0 };
        }
        let added = request.duplicated_permissions.len();
        self.notifier
            .notify(&format!("Duplicated {added} permission(s) into the role"));
        tracing::info!(added, "applied duplicated permissions");
        ConfirmOutcome::Merged { added }
    }

    // ------------------------------------------------------------------
    // Validation and persistence
    // ------------------------------------------------------------------

    /// Recompute every validation message for the current draft.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate(&self.draft);
        &self.errors
    }

    /// Validate and save. On success the saved draft becomes the baseline.
    pub fn submit(&mut self, persistence: &dyn RolePersistence) -> Result<Ack, SessionError> {
        if !self.validate().is_empty() {
            return Err(SessionError::Invalid(self.errors.clone()));
        }

        let operation = if self.draft.is_persisted() {
            SaveOperation::Update
        } else {
            SaveOperation::Create
        };

        match persistence.save(&self.draft, operation) {
            Ok(ack) => {
                self.draft.id = Some(ack.id.clone());
                self.baseline = Some(self.draft.clone());
                self.has_pending_permission_changes = false;
                self.guard.remember_permissions(&self.draft.permissions);
                self.tracker.invalidate();
                self.flush_dirty();

                let verb = match operation {
                    SaveOperation::Create => "created",
                    SaveOperation::Update => "updated",
                };
                self.notifier
                    .notify(&format!("Role '{}' {verb}", self.draft.name));
                tracing::info!(role = %ack.id, ?operation, "saved role");
                Ok(ack)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?operation, "failed to save role");
                self.notifier.notify(&err.to_string());
                Err(err.into())
            }
        }
    }
}

fn value_fits(field: Field, value: &FieldValue) -> bool {
    matches!(
        (field, value),
        (Field::Name | Field::Department | Field::Description, FieldValue::Text(_))
            | (Field::Status, FieldValue::Status(_))
            | (Field::ParentAttributes, FieldValue::List(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FormSession {
        FormSession::create(&Settings::default(), Box::new(TracingNotifier))
    }

    #[test]
    fn test_set_field_rejects_mismatched_values() {
        let mut session = session();
        assert!(!session.set_field(Field::Name, FieldValue::Status(RoleStatus::Inactive)));
        assert!(!session.set_field(Field::Permissions, FieldValue::Text("x".into())));
        assert_eq!(session.draft().name, "");
    }

    #[test]
    fn test_writes_schedule_recompute() {
        let mut session = session();
        assert!(session.set_name("Ops"));
        assert!(!session.published_dirty());
        assert_eq!(session.tick(), Some(true));
        assert!(session.published_dirty());
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FormSession>();
    }

    #[test]
    fn test_pending_flag_change_invalidates_once() {
        let mut session = session();
        session.set_pending_permission_changes(true);
        assert_eq!(session.tick(), Some(true));

        session.set_pending_permission_changes(true);
        assert_eq!(session.tick(), None);
    }
}
