//! # Menu ACL Core - Domain Module
//! 
//! Domain entities for role menu access.

pub mod menu_node;
pub mod module;
pub mod assignment;
pub mod group;
pub mod audit;

// Re-export all entities and enums
pub use menu_node::{MenuNode, MenuType, MenuDraft};
pub use module::Module;
pub use assignment::{Placement, RoleMenuAssignment, MoveMap};
pub use group::{GroupKey, MenuGroup, GroupState, Selection};
pub use audit::{AuditAction, AuditEntry};
