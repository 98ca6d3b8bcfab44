// ============================================================================
// Menu ACL Core - Grouping Engine
// File: crates/menuacl-core/src/grouping.rs
// Description: Pure per-module, per-group view of a role's menu access
// ============================================================================
//! Groups are derived from the tree, then classified per module as native,
//! moved-in or moved-out for one role. Nothing here touches storage; every
//! ordering comes from an explicit sort (modules by priority desc then id,
//! menus by sort then id).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use menuacl_shared::constants::ROOT_PARENT_ID;
use menuacl_shared::{MenuId, ModuleId, RoleId};

use crate::domain::{
    GroupKey, GroupState, MenuGroup, MenuNode, MenuType, Module, MoveMap, Placement, Selection,
};
use crate::error::DomainError;
use crate::hierarchy::MenuTree;
use crate::snapshot::AccessSnapshot;

/// Every group of a tree plus a menu id → group lookup.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<MenuGroup>,
    by_menu: BTreeMap<MenuId, usize>,
    by_key: BTreeMap<GroupKey, usize>,
}

impl GroupIndex {
    /// Walks the tree once, depth first in display order, carrying the key of
    /// the group the parent landed in. Nodes not reachable from the root
    /// (orphans, stored cycles) are visited afterwards in id order.
    pub fn build(tree: &MenuTree) -> Self {
        let mut index = Self::default();
        let mut visited: BTreeSet<MenuId> = BTreeSet::new();

        let roots: Vec<MenuId> = tree.children_of(ROOT_PARENT_ID).iter().map(|n| n.id).collect();
        let stragglers: Vec<MenuId> = tree.nodes().map(|n| n.id).collect();

        for start in roots.into_iter().chain(stragglers) {
            if visited.contains(&start) {
                continue;
            }
            let mut stack: Vec<(MenuId, Option<GroupKey>)> = vec![(start, None)];
            while let Some((id, inherited)) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                let Some(node) = tree.get(id) else {
                    continue;
                };

                let key = match inherited {
                    Some(key @ GroupKey::Directory { .. }) => key,
                    _ if node.is_directory() => GroupKey::Directory { menu_id: id },
                    Some(key) => key,
                    None => GroupKey::Standalone {
                        partition: node.partition.clone(),
                        module_id: node.module_id,
                    },
                };
                index.push_member(node, &key);

                for child in tree.children_of(id).into_iter().rev() {
                    stack.push((child.id, Some(key.clone())));
                }
            }
        }

        index
    }

    fn push_member(&mut self, node: &MenuNode, key: &GroupKey) {
        let idx = match self.by_key.get(key) {
            Some(&idx) => idx,
            None => {
                // The first member seen is the anchor directory or the
                // first standalone root.
                self.groups.push(MenuGroup {
                    key: key.clone(),
                    partition: node.partition.clone(),
                    module_id: node.module_id,
                    member_ids: Vec::new(),
                    selectable_ids: Vec::new(),
                    order: node.order_key(),
                });
                self.by_key.insert(key.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[idx];
        group.member_ids.push(node.id);
        if !node.is_directory() {
            group.selectable_ids.push(node.id);
        }
        self.by_menu.insert(node.id, idx);
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    pub fn group_of(&self, menu_id: MenuId) -> Option<&MenuGroup> {
        self.by_menu.get(&menu_id).map(|&i| &self.groups[i])
    }

    pub fn get(&self, key: &GroupKey) -> Option<&MenuGroup> {
        self.by_key.get(key).map(|&i| &self.groups[i])
    }

    /// Groups of one partition, directory groups first, each in display order.
    pub fn partition_groups(&self, partition: &str) -> Vec<&MenuGroup> {
        let mut groups: Vec<&MenuGroup> =
            self.groups.iter().filter(|g| g.partition == partition).collect();
        groups.sort_by_key(|g| (g.is_standalone(), g.order));
        groups
    }

    /// Resolves a client-supplied id list to exactly one whole group.
    pub fn resolve_exact(&self, menu_ids: &[MenuId]) -> Result<&MenuGroup, DomainError> {
        let requested = menuacl_shared::utils::sorted_unique(menu_ids.iter().copied());
        let first = *requested
            .first()
            .ok_or_else(|| DomainError::ValidationError("Menu id list is empty".to_string()))?;

        for id in &requested {
            if !self.by_menu.contains_key(id) {
                return Err(DomainError::UnknownMenu(*id));
            }
        }

        let group = self
            .group_of(first)
            .ok_or(DomainError::UnknownMenu(first))?;

        if group.sorted_ids() != requested {
            return Err(DomainError::PartialGroup(format!(
                "{} has {} members, request named {}",
                group.key,
                group.member_ids.len(),
                requested.len()
            )));
        }

        Ok(group)
    }
}

/// One group as shown inside one module.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub key: GroupKey,
    pub title: String,
    pub state: GroupState,
    /// Structural owner.
    pub module_id: Option<ModuleId>,
    pub placement: Placement,
    pub menus: Vec<MenuNode>,
    pub selection: Selection,
    pub selected_count: usize,
    pub selectable_count: usize,
    /// Every selectable member is required: always fully selected, still
    /// movable, never de-selectable.
    pub required_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub module: Module,
    pub native: Vec<GroupView>,
    pub moved_in: Vec<GroupView>,
    pub moved_out: Vec<GroupView>,
    /// Totals over native groups only.
    pub selection: Selection,
    pub selected_count: usize,
    pub selectable_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignableMenus {
    pub role_id: RoleId,
    pub partition: String,
    pub modules_with_groups: Vec<ModuleView>,
    /// Native groups with no (known) structural module.
    pub unclassified: Vec<GroupView>,
    pub checked_menu_ids: Vec<MenuId>,
    pub menu_move_map: MoveMap,
}

/// Where a group is displayed: an override wins when its target is known to
/// the registry, otherwise the structural owner, otherwise nowhere.
fn display_module(snapshot: &AccessSnapshot, group: &MenuGroup, placement: Placement) -> Option<ModuleId> {
    match placement {
        Placement::OverriddenTo(target) if snapshot.registry.contains(target) => Some(target),
        _ => group.module_id.filter(|m| snapshot.registry.contains(*m)),
    }
}

/// Ids the role has selected in this partition, plus every required menu.
pub fn checked_menu_ids(snapshot: &AccessSnapshot, partition: &str) -> Vec<MenuId> {
    let ids = snapshot
        .tree
        .partition_nodes(partition)
        .filter(|n| n.is_required || snapshot.is_selected(n.id))
        .map(|n| n.id);
    menuacl_shared::utils::sorted_unique(ids)
}

/// Overridden menus of this partition, each normalized against its own module.
pub fn menu_move_map(snapshot: &AccessSnapshot, groups: &GroupIndex, partition: &str) -> MoveMap {
    let mut map = MoveMap::new();
    for group in groups.partition_groups(partition) {
        let placement = snapshot.group_placement(group);
        for &id in &group.member_ids {
            if let Placement::OverriddenTo(target) = snapshot.member_placement(group, placement, id) {
                map.insert(id, target);
            }
        }
    }
    map
}

fn group_view(
    snapshot: &AccessSnapshot,
    group: &MenuGroup,
    state: GroupState,
    placement: Placement,
    checked: &BTreeSet<MenuId>,
) -> GroupView {
    let menus: Vec<MenuNode> = group
        .member_ids
        .iter()
        .filter_map(|id| snapshot.tree.get(*id).cloned())
        .collect();

    let selected_count = group.selectable_ids.iter().filter(|id| checked.contains(id)).count();
    let selectable_count = group.selectable_ids.len();
    let required_only = selectable_count > 0
        && group
            .selectable_ids
            .iter()
            .all(|id| snapshot.tree.get(*id).is_some_and(|n| n.is_required));

    let title = match group.key.anchor().and_then(|a| snapshot.tree.get(a)) {
        Some(anchor) => anchor.name.clone(),
        None => "Standalone menus".to_string(),
    };

    GroupView {
        key: group.key.clone(),
        title,
        state,
        module_id: group.module_id,
        placement,
        menus,
        selection: Selection::from_counts(selected_count, selectable_count),
        selected_count,
        selectable_count,
        required_only,
    }
}

/// Builds the assignable-menu view for one role and one partition.
pub fn assignable_menus(snapshot: &AccessSnapshot, partition: &str) -> AssignableMenus {
    let groups = snapshot.groups();
    let checked_ids = checked_menu_ids(snapshot, partition);
    let checked: BTreeSet<MenuId> = checked_ids.iter().copied().collect();

    let mut native: BTreeMap<ModuleId, Vec<GroupView>> = BTreeMap::new();
    let mut moved_in: BTreeMap<ModuleId, Vec<GroupView>> = BTreeMap::new();
    let mut moved_out: BTreeMap<ModuleId, Vec<GroupView>> = BTreeMap::new();
    let mut unclassified = Vec::new();

    for group in groups.partition_groups(partition) {
        let placement = snapshot.group_placement(group);
        let owner = group.module_id.filter(|m| snapshot.registry.contains(*m));

        match placement {
            Placement::OverriddenTo(target) if snapshot.registry.contains(target) => {
                moved_in
                    .entry(target)
                    .or_default()
                    .push(group_view(snapshot, group, GroupState::MovedIn, placement, &checked));
                if let Some(owner) = owner {
                    moved_out
                        .entry(owner)
                        .or_default()
                        .push(group_view(snapshot, group, GroupState::MovedOut, placement, &checked));
                }
            }
            _ => match owner {
                Some(owner) => native
                    .entry(owner)
                    .or_default()
                    .push(group_view(snapshot, group, GroupState::Native, placement, &checked)),
                None => unclassified.push(group_view(snapshot, group, GroupState::Native, placement, &checked)),
            },
        }
    }

    let modules = snapshot
        .registry
        .ordered()
        .iter()
        .map(|module| {
            let native = native.remove(&module.id).unwrap_or_default();
            let selected_count = native.iter().map(|g| g.selected_count).sum();
            let selectable_count = native.iter().map(|g| g.selectable_count).sum();
            ModuleView {
                module: module.clone(),
                moved_in: moved_in.remove(&module.id).unwrap_or_default(),
                moved_out: moved_out.remove(&module.id).unwrap_or_default(),
                selection: Selection::from_counts(selected_count, selectable_count),
                selected_count,
                selectable_count,
                native,
            }
        })
        .collect();

    AssignableMenus {
        role_id: snapshot.role_id,
        partition: partition.to_string(),
        modules_with_groups: modules,
        unclassified,
        checked_menu_ids: checked_ids,
        menu_move_map: menu_move_map(snapshot, &groups, partition),
    }
}

/// A usable menu in the rendered navigation.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationItem {
    pub id: MenuId,
    pub menu_type: MenuType,
    pub name: String,
    pub key: String,
    pub path: String,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub children: Vec<NavigationItem>,
}

impl NavigationItem {
    fn from_node(node: &MenuNode, children: Vec<NavigationItem>) -> Self {
        Self {
            id: node.id,
            menu_type: node.menu_type,
            name: node.name.clone(),
            key: node.key.clone(),
            path: node.path.clone(),
            icon: node.icon.clone(),
            component: node.component.clone(),
            redirect: node.redirect.clone(),
            children,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationModule {
    pub module: Module,
    pub menus: Vec<NavigationItem>,
    /// Keys of usable button nodes.
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleNavigation {
    pub role_id: RoleId,
    pub partition: String,
    pub modules: Vec<NavigationModule>,
    pub unclassified: Vec<NavigationItem>,
}

/// Usable menus of a role arranged under the module they display in.
///
/// A menu is usable when it is selected, required or overridden, it is
/// enabled, and every ancestor is enabled. Ancestors of usable menus are
/// pulled in so the tree can render. Disabled modules are left out.
pub fn role_navigation(snapshot: &AccessSnapshot, partition: &str) -> RoleNavigation {
    let groups = snapshot.groups();
    let tree = &snapshot.tree;

    let mut usable: BTreeSet<MenuId> = BTreeSet::new();
    for node in tree.partition_nodes(partition) {
        let granted = node.is_required
            || snapshot.is_selected(node.id)
            || !snapshot.stored_placement(node.id).is_native();
        if !granted || !node.is_enabled {
            continue;
        }
        let Ok(chain) = tree.ancestors(node.id) else {
            continue;
        };
        if chain.iter().all(|a| tree.get(*a).is_some_and(|n| n.is_enabled)) {
            usable.insert(node.id);
            usable.extend(chain);
        }
    }

    let mut per_module: BTreeMap<ModuleId, (Vec<NavigationItem>, Vec<String>)> = BTreeMap::new();
    let mut unclassified = Vec::new();

    for group in groups.partition_groups(partition) {
        let members: Vec<&MenuNode> = group
            .member_ids
            .iter()
            .filter(|id| usable.contains(id))
            .filter_map(|id| tree.get(*id))
            .collect();
        if members.is_empty() {
            continue;
        }

        let (items, permissions) = nest_members(&members);
        let placement = snapshot.group_placement(group);
        match display_module(snapshot, group, placement) {
            Some(module_id) => {
                let entry = per_module.entry(module_id).or_default();
                entry.0.extend(items);
                entry.1.extend(permissions);
            }
            None => unclassified.extend(items),
        }
    }

    let modules = snapshot
        .registry
        .ordered()
        .iter()
        .filter(|m| m.is_enabled)
        .filter_map(|module| {
            let (menus, mut permissions) = per_module.remove(&module.id)?;
            permissions.sort();
            permissions.dedup();
            Some(NavigationModule { module: module.clone(), menus, permissions })
        })
        .collect();

    RoleNavigation {
        role_id: snapshot.role_id,
        partition: partition.to_string(),
        modules,
        unclassified,
    }
}

/// Nests members (given in depth-first display order) by parent. Buttons
/// become permission keys instead of items.
fn nest_members(members: &[&MenuNode]) -> (Vec<NavigationItem>, Vec<String>) {
    let permissions: Vec<String> = members
        .iter()
        .filter(|n| n.menu_type == MenuType::Button)
        .map(|n| n.key.clone())
        .collect();

    let items: Vec<&MenuNode> = members
        .iter()
        .copied()
        .filter(|n| n.menu_type != MenuType::Button)
        .collect();
    let ids: BTreeSet<MenuId> = items.iter().map(|n| n.id).collect();

    // Reverse pre-order visits every child before its parent.
    let mut pending: BTreeMap<MenuId, Vec<NavigationItem>> = BTreeMap::new();
    let mut top = Vec::new();
    for node in items.iter().rev() {
        let mut children = pending.remove(&node.id).unwrap_or_default();
        children.reverse();
        let item = NavigationItem::from_node(node, children);
        if ids.contains(&node.parent_id) {
            pending.entry(node.parent_id).or_default().push(item);
        } else {
            top.push(item);
        }
    }
    top.reverse();

    (top, permissions)
}
