//! Roledit Core Library
//!
//! Dirty-state tracking and permission reconciliation for role editing:
//! normalization, snapshot comparison, permission merging, write guarding
//! and the confirmation workflow that gates reset, cancel and duplicate.

pub mod config;
pub mod context;
pub mod role;
pub mod session;
pub mod store;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Roles
    pub use crate::role::{
        MergeRequest, PermissionSet, RoleDraft, ValidationErrors, is_changed, merge, normalize,
        validate,
    };

    // Session
    pub use crate::session::{
        ConfirmOutcome, ConfirmationKind, ConfirmationRequest, FormSession, Notifier,
        RoleCatalog, RolePersistence, WorkflowState,
    };

    // Store & settings
    pub use crate::config::{Settings, SettingsStore};
    pub use crate::context::AppContext;
    pub use crate::store::RoleStore;

    // Shared types
    pub use crate::types::{RoleId, RoleStatus, SaveOperation};
}
