//! Domain errors

use thiserror::Error;

use menuacl_shared::{MenuId, ModuleId, RoleId};

/// Coarse classification surfaced to callers. Transport layers map on this,
/// never on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Structural,
    Conflict,
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Structural => "STRUCTURAL_ERROR",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Infrastructure => "INTERNAL_ERROR",
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu not found: {0}")]
    MenuNotFound(MenuId),

    #[error("Module not found: {0}")]
    ModuleNotFound(ModuleId),

    #[error("Role not found: {0}")]
    RoleNotFound(RoleId),

    #[error("Parent menu not found: {0}")]
    ParentNotFound(MenuId),

    #[error("Parent menu {parent_id} is in partition {parent_partition}, expected {partition}")]
    PartitionMismatch {
        parent_id: MenuId,
        parent_partition: String,
        partition: String,
    },

    #[error("Menu {parent_id} of type {parent_type} cannot have children")]
    InvalidParentType { parent_id: MenuId, parent_type: String },

    #[error("Unknown menu id: {0}")]
    UnknownMenu(MenuId),

    #[error("Override target module {0} does not exist")]
    UnknownTargetModule(ModuleId),

    #[error("Module {0} is disabled")]
    ModuleDisabled(ModuleId),

    #[error("Target module {0} is the group's own module")]
    TargetEqualsSource(ModuleId),

    #[error("Moving menu {menu_id} under {parent_id} would create a cycle")]
    CycleDetected { menu_id: MenuId, parent_id: MenuId },

    #[error("Menu {0} still has children")]
    MenuHasChildren(MenuId),

    #[error("Menu ids do not form one complete group: {0}")]
    PartialGroup(String),

    #[error("Menu key already exists in partition {partition}: {key}")]
    MenuKeyAlreadyExists { partition: String, key: String },

    #[error("Menu path already exists in partition {partition}: {path}")]
    MenuPathAlreadyExists { partition: String, path: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::MenuNotFound(_)
            | DomainError::ModuleNotFound(_)
            | DomainError::RoleNotFound(_) => ErrorKind::NotFound,

            DomainError::ParentNotFound(_)
            | DomainError::PartitionMismatch { .. }
            | DomainError::InvalidParentType { .. }
            | DomainError::UnknownMenu(_)
            | DomainError::UnknownTargetModule(_)
            | DomainError::ModuleDisabled(_)
            | DomainError::TargetEqualsSource(_)
            | DomainError::ValidationError(_) => ErrorKind::Validation,

            DomainError::CycleDetected { .. }
            | DomainError::MenuHasChildren(_)
            | DomainError::PartialGroup(_) => ErrorKind::Structural,

            DomainError::MenuKeyAlreadyExists { .. }
            | DomainError::MenuPathAlreadyExists { .. } => ErrorKind::Conflict,

            DomainError::DatabaseError(_) | DomainError::InternalError(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(DomainError::RoleNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::TargetEqualsSource(2).kind(), ErrorKind::Validation);
        assert_eq!(
            DomainError::CycleDetected { menu_id: 1, parent_id: 2 }.kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            DomainError::MenuKeyAlreadyExists { partition: "admin".into(), key: "k".into() }.kind(),
            ErrorKind::Conflict
        );
    }
}
