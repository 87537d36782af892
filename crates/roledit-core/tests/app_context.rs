use tempfile::TempDir;

use roledit_core::config::{Settings, SettingsScope, SettingsStore};
use roledit_core::context::AppContext;
use roledit_core::session::{ConfirmationKind, RecordingNotifier};
use roledit_core::types::RoleId;

struct Fixture {
    _temp: TempDir,
    ctx: AppContext,
    global: std::path::PathBuf,
    project: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let global = temp.path().join("config");
    std::fs::create_dir_all(&project).unwrap();

    let ctx = AppContext::with_global_config_dir(project.clone(), global.clone());
    Fixture {
        _temp: temp,
        ctx,
        global,
        project,
    }
}

#[test]
fn settings_default_when_no_files_exist() {
    let fx = fixture();

    let settings = fx.ctx.settings().unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(fx.ctx.store_path(&settings), fx.global.join("roles.toml"));
}

#[test]
fn project_layer_overrides_global_layer() {
    let fx = fixture();
    std::fs::create_dir_all(&fx.global).unwrap();
    std::fs::write(
        fx.global.join("roledit.toml"),
        "defer_ticks = 4\n\n[messages]\nreset = \"Really reset?\"\ncancel = \"Really leave?\"\n",
    )
    .unwrap();
    std::fs::write(
        fx.project.join("roledit.toml"),
        "store_path = \"data/roles.toml\"\n\n[messages]\nreset = \"Start over?\"\n",
    )
    .unwrap();

    let settings = fx.ctx.settings().unwrap();

    assert_eq!(settings.defer_ticks(), 4);
    let messages = settings.messages();
    assert_eq!(messages.reset, "Start over?");
    assert_eq!(messages.cancel, "Really leave?");
    assert_eq!(
        fx.ctx.store_path(&settings),
        fx.project.join("data").join("roles.toml")
    );
}

#[test]
fn invalid_settings_are_reported_with_path() {
    let fx = fixture();
    std::fs::write(fx.project.join("roledit.toml"), "defer_ticks = 0\n").unwrap();

    let err = fx.ctx.settings().unwrap_err();

    assert!(format!("{err:#}").contains("defer_ticks"));
}

#[test]
fn store_override_wins() {
    let fx = fixture();
    let custom = fx.project.join("elsewhere.toml");
    let ctx = fx.ctx.clone().with_store_path(custom.clone());

    let settings = Settings {
        store_path: Some("ignored.toml".into()),
        ..Default::default()
    };

    assert_eq!(ctx.store_path(&settings), custom);
}

#[test]
fn settings_store_save_then_load() {
    let fx = fixture();
    let store = SettingsStore::from_paths(SettingsScope::Global, &fx.global, &fx.project);
    let mut settings = Settings::new();
    settings.defer_ticks = Some(2);
    settings.messages.duplicate = Some("Copy them?".to_string());

    store.save(&settings).unwrap();

    assert_eq!(store.load().unwrap(), settings);
    assert_eq!(store.settings_path(), fx.global.join("roledit.toml"));
}

#[test]
fn open_session_uses_store_and_settings() {
    let fx = fixture();
    std::fs::write(
        fx.project.join("roledit.toml"),
        "store_path = \"roles.toml\"\n\n[messages]\nduplicate = \"Merge permissions?\"\n",
    )
    .unwrap();
    std::fs::write(
        fx.project.join("roles.toml"),
        "[roles.ops]\nname = \"Ops\"\ndepartment = \"IT\"\n",
    )
    .unwrap();

    let notifier = RecordingNotifier::new();
    let mut session = fx
        .ctx
        .open_session(Some(&RoleId::new("ops")), Box::new(notifier))
        .unwrap();

    assert_eq!(session.draft().name, "Ops");
    assert!(!session.is_dirty());

    let request = session.request_duplicate(Default::default());
    assert_eq!(request.kind, ConfirmationKind::Duplicate);
    assert_eq!(request.message, "Merge permissions?");
}

#[test]
fn open_session_for_unknown_role_fails() {
    let fx = fixture();

    let result = fx
        .ctx
        .open_session(Some(&RoleId::new("ghost")), Box::new(RecordingNotifier::new()));

    assert!(result.is_err());
}

#[test]
fn open_session_without_id_is_create_mode() {
    let fx = fixture();

    let mut session = fx
        .ctx
        .open_session(None, Box::new(RecordingNotifier::new()))
        .unwrap();

    assert!(session.baseline().is_none());
    assert!(!session.is_dirty());
}
