//! # Menu ACL Core
//!
//! Menu hierarchy, module registry, per-role menu assignments and the
//! grouping and reassignment logic built on them. Storage is reached only
//! through the traits in [`repositories`].

pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod registry;
pub mod snapshot;
pub mod grouping;
pub mod reconcile;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
pub use grouping::{AssignableMenus, GroupIndex, RoleNavigation};
pub use hierarchy::{MenuTree, MenuTreeNode};
pub use reconcile::{AppliedChange, AssignmentPlan, AssignmentWrite};
pub use registry::ModuleRegistry;
pub use snapshot::AccessSnapshot;
