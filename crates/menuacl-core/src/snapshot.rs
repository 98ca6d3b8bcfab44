//! One consistent read of menus, modules and a role's rows.

use std::collections::BTreeMap;

use tracing::warn;

use menuacl_shared::{MenuId, ModuleId, RoleId};

use crate::domain::{MenuGroup, MenuNode, Module, Placement, RoleMenuAssignment};
use crate::grouping::GroupIndex;
use crate::hierarchy::MenuTree;
use crate::registry::ModuleRegistry;

/// Everything the grouping engine and the reassignment planner read.
/// Repositories build it inside a single transaction (or read lock).
#[derive(Debug, Clone)]
pub struct AccessSnapshot {
    pub role_id: RoleId,
    pub tree: MenuTree,
    pub registry: ModuleRegistry,
    pub rows: BTreeMap<MenuId, RoleMenuAssignment>,
}

impl AccessSnapshot {
    pub fn new(
        role_id: RoleId,
        menus: Vec<MenuNode>,
        modules: Vec<Module>,
        rows: Vec<RoleMenuAssignment>,
    ) -> Self {
        Self {
            role_id,
            tree: MenuTree::new(menus),
            registry: ModuleRegistry::new(modules),
            rows: rows
                .into_iter()
                .filter(|r| r.role_id == role_id)
                .map(|r| (r.menu_id, r))
                .collect(),
        }
    }

    pub fn groups(&self) -> GroupIndex {
        GroupIndex::build(&self.tree)
    }

    pub fn is_selected(&self, menu_id: MenuId) -> bool {
        self.rows.get(&menu_id).is_some_and(|r| r.selected)
    }

    pub fn stored_placement(&self, menu_id: MenuId) -> Placement {
        self.rows.get(&menu_id).map(|r| r.placement).unwrap_or_default()
    }

    /// Structural module of a live node.
    pub fn module_of(&self, menu_id: MenuId) -> Option<ModuleId> {
        self.tree.get(menu_id).and_then(|n| n.module_id)
    }

    /// Placement of a whole group, read from its lead member (the anchor
    /// directory, or the first standalone member) and normalized against the
    /// group's structural module.
    pub fn group_placement(&self, group: &MenuGroup) -> Placement {
        let Some(&lead) = group.member_ids.first() else {
            return Placement::Native;
        };
        let placement = Placement::normalized(self.stored_placement(lead).target(), group.module_id);

        if group
            .member_ids
            .iter()
            .any(|&id| self.stored_placement(id) != self.member_placement(group, placement, id))
        {
            warn!(
                "Role {} has inconsistent overrides inside group {}; using the lead member's",
                self.role_id, group.key
            );
        }

        placement
    }

    /// What one member stores while its group reads as `group_placement`.
    ///
    /// Each row is normalized against the member's own module, so in a
    /// mixed-module group a member owned by the target stores nothing. A
    /// native group keeps rows that point members at the group's origin.
    pub fn member_placement(&self, group: &MenuGroup, group_placement: Placement, menu_id: MenuId) -> Placement {
        let own = self.module_of(menu_id);
        match group_placement {
            Placement::OverriddenTo(target) => Placement::normalized(Some(target), own),
            Placement::Native => {
                let origin = Placement::normalized(group.module_id, own);
                if self.stored_placement(menu_id) == origin {
                    origin
                } else {
                    Placement::Native
                }
            }
        }
    }

    /// Current rows in menu id order, for audit payloads.
    pub fn row_list(&self) -> Vec<RoleMenuAssignment> {
        self.rows.values().copied().collect()
    }
}
