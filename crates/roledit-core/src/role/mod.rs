//! Role drafts and the pure operations over them
//!
//! - `schema`: draft, permission set and merge request shapes
//! - `normalize`: canonical form of a permission set
//! - `compare`: baseline vs draft snapshot comparison
//! - `merge`: folding duplicated permissions into a draft
//! - `validate`: submit-time field validation

pub mod compare;
pub mod merge;
pub mod normalize;
pub mod schema;
pub mod validate;

pub use compare::is_changed;
pub use merge::merge;
pub use normalize::normalize;
pub use schema::{MergeRequest, ModuleInfo, PermissionSet, RoleDraft, RoleSummary};
pub use validate::{ValidationErrors, validate};
