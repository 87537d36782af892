use std::cell::RefCell;

use chrono::Utc;

use roledit_core::config::Settings;
use roledit_core::role::{MergeRequest, PermissionSet, RoleDraft};
use roledit_core::session::{
    Ack, ConfirmOutcome, ConfirmationKind, FormSession, PersistError, RecordingNotifier,
    RequestOutcome, RolePersistence, SessionError, WorkflowState,
};
use roledit_core::types::{Field, RoleId, RoleStatus, SaveOperation};

fn admin() -> RoleDraft {
    RoleDraft {
        id: Some(RoleId::new("admin")),
        name: "Admin".to_string(),
        department: "IT".to_string(),
        description: "Full access".to_string(),
        status: RoleStatus::Active,
        parent_attributes: vec!["hq".to_string()],
        permissions: PermissionSet::new(["M1"], ["M1-users-read"]),
    }
}

fn edit_session(notifier: &RecordingNotifier) -> FormSession {
    FormSession::edit(admin(), &Settings::default(), Box::new(notifier.clone()))
}

/// Persistence double that records calls and answers from a script.
struct ScriptedPersistence {
    outcome: Result<RoleId, PersistError>,
    calls: RefCell<Vec<(RoleDraft, SaveOperation)>>,
}

impl ScriptedPersistence {
    fn accepting(id: &str) -> Self {
        Self {
            outcome: Ok(RoleId::new(id)),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            outcome: Err(PersistError::Rejected(message.to_string())),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl RolePersistence for ScriptedPersistence {
    fn save(&self, draft: &RoleDraft, operation: SaveOperation) -> Result<Ack, PersistError> {
        self.calls.borrow_mut().push((draft.clone(), operation));
        self.outcome.clone().map(|id| Ack {
            id,
            operation,
            saved_at: Utc::now(),
        })
    }
}

#[test]
fn create_mode_starts_clean_and_any_field_dirties() {
    let notifier = RecordingNotifier::new();
    let mut session = FormSession::create(&Settings::default(), Box::new(notifier));

    assert!(!session.is_dirty());
    session.set_department("Finance");
    assert!(session.is_dirty());
}

#[test]
fn edit_mode_reordered_permissions_stay_clean() {
    let notifier = RecordingNotifier::new();
    let mut baseline = RoleDraft::new();
    baseline.name = "Admin".to_string();
    baseline.permissions = PermissionSet::new(["M1"], ["p2", "p1"]);
    let mut session = FormSession::edit(
        baseline.clone(),
        &Settings::default(),
        Box::new(notifier),
    );

    let mut sorted = baseline.permissions.clone();
    sorted.selected_permissions.sort();

    // Equivalent re-delivery is dropped by the guard and the flag stays clear.
    assert!(!session.set_permissions(sorted));
    assert!(!session.is_dirty());
}

#[test]
fn permission_table_storm_is_absorbed() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    let mut changed = admin().permissions;
    changed.selected_permissions.push("M1-users-write".to_string());

    assert!(session.set_permissions(changed.clone()));
    for _ in 0..50 {
        let mut echo = changed.clone();
        echo.selected_permissions.reverse();
        assert!(!session.set_permissions(echo));
    }

    assert_eq!(session.tick(), Some(true));
    assert_eq!(session.tick(), None);
}

#[test]
fn dirty_reset_requires_confirmation_and_decline_keeps_draft() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.set_name("Administrators");

    let outcome = session.request_reset();

    assert!(matches!(
        outcome,
        RequestOutcome::AwaitingConfirmation(ref request) if request.kind == ConfirmationKind::Reset
    ));
    assert_eq!(
        session.workflow_state(),
        WorkflowState::AwaitingConfirmation(ConfirmationKind::Reset)
    );

    let declined = session.decline().unwrap();

    assert_eq!(declined.kind, ConfirmationKind::Reset);
    assert_eq!(session.workflow_state(), WorkflowState::Idle);
    assert_eq!(session.draft().name, "Administrators");
    assert!(session.is_dirty());
}

#[test]
fn clean_reset_runs_immediately() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);

    assert_eq!(
        session.request_reset(),
        RequestOutcome::Done(ConfirmOutcome::Reset)
    );
    assert_eq!(session.workflow_state(), WorkflowState::Idle);
}

#[test]
fn confirmed_reset_restores_fields_but_not_through_generic_path() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.set_name("Changed");
    session.set_status(RoleStatus::Inactive);
    session.set_parent_attributes(vec!["emea".to_string()]);
    session.set_permissions(PermissionSet::new(["M1", "M2"], ["M2-x-read"]));
    session.set_pending_permission_changes(true);
    session.validate();

    session.request_reset();
    assert_eq!(session.confirm(), Some(ConfirmOutcome::Reset));

    assert_eq!(session.draft(), &admin());
    assert!(session.errors().is_empty());
    assert!(!session.has_pending_permission_changes());
    assert!(!session.is_dirty());
}

#[test]
fn reset_clears_guard_memory_for_scalars() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    assert!(session.set_name("Changed"));
    session.request_reset();
    session.confirm();

    // Same value again after the reset must be accepted.
    assert!(session.set_name("Changed"));
    assert_eq!(session.draft().name, "Changed");
}

#[test]
fn reset_suppresses_echo_of_restored_permissions() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.set_permissions(PermissionSet::new(["M2"], ["M2-x-read"]));
    session.request_reset();
    session.confirm();

    assert!(!session.set_permissions(admin().permissions));
}

#[test]
fn create_mode_reset_empties_the_form() {
    let notifier = RecordingNotifier::new();
    let mut session = FormSession::create(&Settings::default(), Box::new(notifier));
    session.set_name("Draft role");
    session.set_description("tmp");

    session.request_reset();
    session.confirm();

    assert_eq!(session.draft(), &RoleDraft::new());
    assert!(!session.is_dirty());
}

#[test]
fn duplicate_always_confirms_even_when_clean() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    assert!(!session.is_dirty());

    let request = session.request_duplicate(MergeRequest {
        duplicated_permissions: vec!["M2-billing-read".to_string()],
        enabled_modules: Some(vec!["M1".to_string(), "M2".to_string()]),
    });

    assert_eq!(request.kind, ConfirmationKind::Duplicate);
    assert_eq!(
        session.workflow_state(),
        WorkflowState::AwaitingConfirmation(ConfirmationKind::Duplicate)
    );
    assert_eq!(session.draft(), &admin());
}

#[test]
fn confirmed_duplicate_merges_once_and_notifies() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.request_duplicate(MergeRequest {
        duplicated_permissions: vec!["M1-users-read".to_string()],
        enabled_modules: None,
    });

    assert_eq!(session.confirm(), Some(ConfirmOutcome::Merged { added: 1 }));
    assert_eq!(session.confirm(), None);

    assert_eq!(
        session.draft().permissions.selected_permissions,
        vec!["M1-users-read", "M1-users-read"]
    );
    assert_eq!(session.draft().permissions.enabled_modules, vec!["M1"]);
    assert!(session.is_dirty());
    assert_eq!(notifier.messages().len(), 1);
}

#[test]
fn declined_duplicate_has_no_effect() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.request_duplicate(MergeRequest {
        duplicated_permissions: vec!["M9-x-read".to_string()],
        enabled_modules: Some(vec![]),
    });

    session.decline();

    assert_eq!(session.draft(), &admin());
    assert!(notifier.messages().is_empty());
}

#[test]
fn cancel_navigates_or_asks() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    assert_eq!(
        session.request_cancel(),
        RequestOutcome::Done(ConfirmOutcome::Navigated)
    );
    assert!(session.is_navigated());

    let mut session = edit_session(&notifier);
    session.set_description("edited");
    assert!(matches!(
        session.request_cancel(),
        RequestOutcome::AwaitingConfirmation(_)
    ));
    assert!(!session.is_navigated());
    assert_eq!(session.confirm(), Some(ConfirmOutcome::Navigated));
    assert!(session.is_navigated());
}

#[test]
fn pending_permission_override_forces_dirty() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);

    session.set_pending_permission_changes(true);
    assert!(session.is_dirty());

    session.set_pending_permission_changes(false);
    assert!(!session.is_dirty());
}

#[test]
fn accepted_write_clears_only_its_validation_error() {
    let notifier = RecordingNotifier::new();
    let mut session = FormSession::create(&Settings::default(), Box::new(notifier));
    session.validate();
    assert!(session.errors().get(Field::Name).is_some());
    assert!(session.errors().get(Field::Department).is_some());

    session.set_name("Ops");

    assert!(session.errors().get(Field::Name).is_none());
    assert!(session.errors().get(Field::Department).is_some());
}

#[test]
fn submit_with_invalid_draft_never_calls_persistence() {
    let notifier = RecordingNotifier::new();
    let mut session = FormSession::create(&Settings::default(), Box::new(notifier));
    session.set_name("Ops");
    let persistence = ScriptedPersistence::accepting("ops");

    let err = session.submit(&persistence).unwrap_err();

    assert!(matches!(err, SessionError::Invalid(ref errors) if errors.get(Field::Department).is_some()));
    assert!(persistence.calls.borrow().is_empty());
}

#[test]
fn successful_create_replaces_baseline() {
    let notifier = RecordingNotifier::new();
    let mut session = FormSession::create(&Settings::default(), Box::new(notifier.clone()));
    session.set_name("Ops");
    session.set_department("IT");
    let persistence = ScriptedPersistence::accepting("ops");

    let ack = session.submit(&persistence).unwrap();

    assert_eq!(ack.operation, SaveOperation::Create);
    assert_eq!(persistence.calls.borrow()[0].1, SaveOperation::Create);
    assert_eq!(session.draft().id, Some(RoleId::new("ops")));
    assert_eq!(session.baseline(), Some(session.draft()));
    assert!(!session.is_dirty());
    assert_eq!(notifier.messages(), vec!["Role 'Ops' created"]);
}

#[test]
fn failed_save_keeps_draft_and_passes_message_through() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.set_name("Root");
    let persistence = ScriptedPersistence::failing("Name is reserved");

    let err = session.submit(&persistence).unwrap_err();

    assert!(matches!(err, SessionError::Persist(PersistError::Rejected(_))));
    assert_eq!(persistence.calls.borrow()[0].1, SaveOperation::Update);
    assert_eq!(session.draft().name, "Root");
    assert_eq!(session.baseline(), Some(&admin()));
    assert!(session.is_dirty());
    assert_eq!(notifier.messages(), vec!["Name is reserved"]);
}

#[test]
fn deferred_recompute_honours_configured_ticks() {
    let notifier = RecordingNotifier::new();
    let settings = Settings {
        defer_ticks: Some(3),
        ..Default::default()
    };
    let mut session = FormSession::edit(admin(), &settings, Box::new(notifier));

    session.set_name("A");
    assert_eq!(session.tick(), None);
    session.set_name("Ab");
    assert_eq!(session.tick(), None);
    assert_eq!(session.tick(), None);
    assert_eq!(session.tick(), Some(true));
    assert!(session.published_dirty());
}

#[test]
fn reset_keeps_restored_permission_order() {
    let notifier = RecordingNotifier::new();
    let mut baseline = admin();
    baseline.permissions = PermissionSet::new(["M1"], ["M1-users-write", "M1-users-read"]);
    let mut session = FormSession::edit(
        baseline.clone(),
        &Settings::default(),
        Box::new(notifier),
    );
    session.set_permissions(PermissionSet::new(["M1"], ["M1-audit-read"]));

    session.request_reset();
    assert_eq!(session.confirm(), Some(ConfirmOutcome::Reset));

    // The sorted write-back during reset is dropped; display order survives.
    assert_eq!(session.draft().permissions, baseline.permissions);
    assert!(!session.is_dirty());

    let mut sorted = baseline.permissions.clone();
    sorted.selected_permissions.sort();
    assert!(!session.set_permissions(sorted));
}

#[test]
fn equivalent_duplicate_reports_nothing_added() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.request_duplicate(MergeRequest {
        duplicated_permissions: vec![],
        enabled_modules: Some(vec!["M1".to_string()]),
    });

    assert_eq!(session.confirm(), Some(ConfirmOutcome::Merged { added: 0 }));

    assert!(notifier.messages().is_empty());
    assert_eq!(session.draft(), &admin());
    assert!(!session.is_dirty());
}

#[test]
fn close_abandons_pending_confirmation() {
    let notifier = RecordingNotifier::new();
    let mut session = edit_session(&notifier);
    session.request_duplicate(MergeRequest::default());

    session.close();

    assert_eq!(session.workflow_state(), WorkflowState::Idle);
    assert!(session.pending_confirmation().is_none());
    assert!(session.is_navigated());
}
