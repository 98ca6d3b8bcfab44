//! Role-menu assignment repository trait (port)

use async_trait::async_trait;

use menuacl_shared::RoleId;

use crate::error::DomainError;
use crate::reconcile::{AppliedChange, AssignmentPlan};
use crate::snapshot::AccessSnapshot;

/// Plans a write against the snapshot loaded inside the mutation.
pub type Planner = Box<dyn FnOnce(&AccessSnapshot) -> Result<AssignmentPlan, DomainError> + Send>;

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Menus, modules and the role's rows from one consistent read.
    /// Fails with `RoleNotFound` for an unknown role.
    async fn load_snapshot(&self, role_id: RoleId) -> Result<AccessSnapshot, DomainError>;

    /// Serializes against other writes to the same role, loads a snapshot,
    /// runs `planner` and applies its write, all in one transaction. Nothing
    /// is written when the planner fails.
    async fn apply(&self, role_id: RoleId, planner: Planner) -> Result<AppliedChange, DomainError>;
}
