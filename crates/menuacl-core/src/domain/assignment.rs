// ============================================================================
// Menu ACL Core - Role Menu Assignment Entity
// File: crates/menuacl-core/src/domain/assignment.rs
// Description: Per-role menu selection plus optional display override
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use menuacl_shared::{MenuId, ModuleId, RoleId};

/// Client-accumulated map of menu id to the module it is displayed under.
pub type MoveMap = BTreeMap<MenuId, ModuleId>;

/// Where a menu is displayed for one role.
///
/// Storage keeps this as one nullable column; `Native` is the null state and
/// covers both "never moved" and "moved back to origin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "module_id", rename_all = "snake_case")]
pub enum Placement {
    Native,
    OverriddenTo(ModuleId),
}

impl Placement {
    /// The only constructor that writes paths use: a target equal to the
    /// structural owner collapses to `Native`.
    pub fn normalized(target: Option<ModuleId>, owner: Option<ModuleId>) -> Self {
        match target {
            Some(target) if Some(target) != owner => Placement::OverriddenTo(target),
            _ => Placement::Native,
        }
    }

    pub fn from_column(target_module_id: Option<ModuleId>) -> Self {
        match target_module_id {
            Some(id) => Placement::OverriddenTo(id),
            None => Placement::Native,
        }
    }

    pub fn target(&self) -> Option<ModuleId> {
        match self {
            Placement::Native => None,
            Placement::OverriddenTo(id) => Some(*id),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Placement::Native)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Native
    }
}

/// One persisted row. A row exists when the menu is selected for the role,
/// when it carries an override, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMenuAssignment {
    pub role_id: RoleId,
    pub menu_id: MenuId,
    pub selected: bool,
    pub placement: Placement,
}

impl RoleMenuAssignment {
    pub fn new(role_id: RoleId, menu_id: MenuId, selected: bool, placement: Placement) -> Self {
        Self {
            role_id,
            menu_id,
            selected,
            placement,
        }
    }

    /// A row that is neither selected nor overridden carries no state and must
    /// not be stored.
    pub fn is_vacant(&self) -> bool {
        !self.selected && self.placement.is_native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_normalization() {
        assert_eq!(Placement::normalized(Some(2), Some(1)), Placement::OverriddenTo(2));
        assert_eq!(Placement::normalized(Some(1), Some(1)), Placement::Native);
        assert_eq!(Placement::normalized(None, Some(1)), Placement::Native);
        assert_eq!(Placement::normalized(Some(3), None), Placement::OverriddenTo(3));
    }

    #[test]
    fn test_vacant_rows() {
        assert!(RoleMenuAssignment::new(1, 2, false, Placement::Native).is_vacant());
        assert!(!RoleMenuAssignment::new(1, 2, true, Placement::Native).is_vacant());
        assert!(!RoleMenuAssignment::new(1, 2, false, Placement::OverriddenTo(4)).is_vacant());
    }
}
