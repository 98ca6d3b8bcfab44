//! Reassignment planning.
//!
//! Every role mutation is planned here against one snapshot and then handed
//! to the repository as a single write. Planning validates everything first,
//! so a returned plan can always be applied in full.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use menuacl_shared::utils::sorted_unique;
use menuacl_shared::{MenuId, ModuleId};

use crate::domain::{GroupKey, MenuGroup, MoveMap, Placement, RoleMenuAssignment};
use crate::error::DomainError;
use crate::grouping::GroupIndex;
use crate::snapshot::AccessSnapshot;

/// Row changes for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentWrite {
    /// Delete every row of the role, then insert these.
    Replace(Vec<RoleMenuAssignment>),
    /// Upsert and delete individual rows; an empty patch is a no-op.
    Patch {
        upserts: Vec<RoleMenuAssignment>,
        deletes: Vec<MenuId>,
    },
}

impl AssignmentWrite {
    pub fn is_noop(&self) -> bool {
        matches!(self, AssignmentWrite::Patch { upserts, deletes } if upserts.is_empty() && deletes.is_empty())
    }

    /// Rows of the role after this write is applied to `before`.
    pub fn apply_to(&self, before: &BTreeMap<MenuId, RoleMenuAssignment>) -> Vec<RoleMenuAssignment> {
        match self {
            AssignmentWrite::Replace(rows) => {
                let mut rows = rows.clone();
                rows.sort_by_key(|r| r.menu_id);
                rows
            }
            AssignmentWrite::Patch { upserts, deletes } => {
                let mut after = before.clone();
                for id in deletes {
                    after.remove(id);
                }
                for row in upserts {
                    after.insert(row.menu_id, *row);
                }
                after.into_values().collect()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentPlan {
    pub write: AssignmentWrite,
    pub affected_groups: Vec<GroupKey>,
}

/// What a repository reports back after applying a plan.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedChange {
    pub before: Vec<RoleMenuAssignment>,
    pub after: Vec<RoleMenuAssignment>,
    pub affected_groups: Vec<GroupKey>,
}

impl AppliedChange {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

/// Points every member of `group` at `target` (`None` clears), keeping
/// selections. Each row is normalized against its own menu's module. Only
/// rows that actually change are emitted.
fn retarget_group(snapshot: &AccessSnapshot, group: &MenuGroup, target: Option<ModuleId>) -> AssignmentWrite {
    let mut upserts = Vec::new();
    let mut deletes = Vec::new();

    for &menu_id in &group.member_ids {
        let current = snapshot.rows.get(&menu_id).copied();
        let selected = current.is_some_and(|r| r.selected);
        let placement = Placement::normalized(target, snapshot.module_of(menu_id));
        let row = RoleMenuAssignment::new(snapshot.role_id, menu_id, selected, placement);

        match current {
            Some(_) if row.is_vacant() => deletes.push(menu_id),
            Some(existing) if existing == row => {}
            None if row.is_vacant() => {}
            _ => upserts.push(row),
        }
    }

    AssignmentWrite::Patch { upserts, deletes }
}

/// `move(group, target)`.
pub fn plan_move(
    snapshot: &AccessSnapshot,
    menu_ids: &[MenuId],
    target: ModuleId,
) -> Result<AssignmentPlan, DomainError> {
    snapshot.registry.validate_target(target)?;

    let groups = snapshot.groups();
    let group = groups.resolve_exact(menu_ids)?;
    let current = snapshot.group_placement(group);

    if current.is_native() && group.module_id == Some(target) {
        return Err(DomainError::TargetEqualsSource(target));
    }

    Ok(AssignmentPlan {
        write: retarget_group(snapshot, group, Some(target)),
        affected_groups: vec![group.key.clone()],
    })
}

/// `restore(group)`. A native group yields an empty patch.
pub fn plan_restore(snapshot: &AccessSnapshot, menu_ids: &[MenuId]) -> Result<AssignmentPlan, DomainError> {
    let groups = snapshot.groups();
    let group = groups.resolve_exact(menu_ids)?;

    let write = retarget_group(snapshot, group, None);
    let affected_groups = if write.is_noop() { Vec::new() } else { vec![group.key.clone()] };

    Ok(AssignmentPlan { write, affected_groups })
}

/// `restoreAll(M)`: every group of the role whose placement reads as `M`.
pub fn plan_restore_all(snapshot: &AccessSnapshot, module_id: ModuleId) -> Result<AssignmentPlan, DomainError> {
    if !snapshot.registry.contains(module_id) {
        return Err(DomainError::ModuleNotFound(module_id));
    }

    let groups = snapshot.groups();
    let mut upserts = Vec::new();
    let mut deletes = Vec::new();
    let mut affected_groups = Vec::new();

    for group in groups.groups() {
        if snapshot.group_placement(group) != Placement::OverriddenTo(module_id) {
            continue;
        }
        if let AssignmentWrite::Patch { upserts: u, deletes: d } =
            retarget_group(snapshot, group, None)
        {
            upserts.extend(u);
            deletes.extend(d);
        }
        affected_groups.push(group.key.clone());
    }

    Ok(AssignmentPlan {
        write: AssignmentWrite::Patch { upserts, deletes },
        affected_groups,
    })
}

/// Checks that the move map names whole groups with one target each and
/// returns the target of every touched group. A member may be left out only
/// when it is owned by the target, since its row would normalize away.
fn resolve_move_map<'a>(
    snapshot: &AccessSnapshot,
    groups: &'a GroupIndex,
    move_map: &MoveMap,
) -> Result<Vec<(&'a MenuGroup, ModuleId)>, DomainError> {
    let mut by_group: BTreeMap<&GroupKey, (&MenuGroup, BTreeSet<ModuleId>)> = BTreeMap::new();

    for (&menu_id, &target) in move_map {
        let group = groups.group_of(menu_id).ok_or(DomainError::UnknownMenu(menu_id))?;
        by_group
            .entry(&group.key)
            .or_insert((group, BTreeSet::new()))
            .1
            .insert(target);
    }

    let mut resolved = Vec::with_capacity(by_group.len());
    for (key, (group, targets)) in by_group {
        let (Some(&target), 1) = (targets.first(), targets.len()) else {
            return Err(DomainError::PartialGroup(format!(
                "move map sends {} to {} targets",
                key,
                targets.len()
            )));
        };

        let placements: Vec<(MenuId, Placement)> = group
            .member_ids
            .iter()
            .map(|&id| (id, Placement::normalized(Some(target), snapshot.module_of(id))))
            .collect();

        let missing = placements
            .iter()
            .filter(|(id, placement)| !move_map.contains_key(id) && !placement.is_native())
            .count();
        if missing > 0 {
            return Err(DomainError::PartialGroup(format!(
                "move map leaves {} of {} members of {} behind",
                missing,
                group.member_ids.len(),
                key
            )));
        }

        if placements.iter().any(|(_, placement)| !placement.is_native()) {
            snapshot.registry.validate_target(target)?;
        }
        resolved.push((group, target));
    }

    Ok(resolved)
}

/// `replaceAssignments(role, menu_ids, move_map)`.
pub fn plan_replace(
    snapshot: &AccessSnapshot,
    menu_ids: &[MenuId],
    move_map: &MoveMap,
) -> Result<AssignmentPlan, DomainError> {
    let selected = sorted_unique(menu_ids.iter().copied());
    if let Some(&unknown) = selected.iter().find(|id| !snapshot.tree.contains(**id)) {
        return Err(DomainError::UnknownMenu(unknown));
    }

    let groups = snapshot.groups();
    let targets = resolve_move_map(snapshot, &groups, move_map)?;

    let mut rows: BTreeMap<MenuId, RoleMenuAssignment> = selected
        .iter()
        .map(|&id| (id, RoleMenuAssignment::new(snapshot.role_id, id, true, Placement::Native)))
        .collect();

    let mut affected_groups = Vec::new();
    for (group, target) in targets {
        let mut touched = false;
        for &id in &group.member_ids {
            let placement = Placement::normalized(Some(target), snapshot.module_of(id));
            if placement.is_native() {
                continue;
            }
            rows.entry(id)
                .or_insert_with(|| RoleMenuAssignment::new(snapshot.role_id, id, false, placement))
                .placement = placement;
            touched = true;
        }
        if touched {
            affected_groups.push(group.key.clone());
        }
    }

    Ok(AssignmentPlan {
        write: AssignmentWrite::Replace(rows.into_values().collect()),
        affected_groups,
    })
}

/// Ids of every group the move map carries away from its structural module.
pub fn moved_out_ids(groups: &GroupIndex, move_map: &MoveMap) -> BTreeSet<MenuId> {
    let mut ids = BTreeSet::new();
    for (&menu_id, &target) in move_map {
        let Some(group) = groups.group_of(menu_id) else {
            continue;
        };
        if !Placement::normalized(Some(target), group.module_id).is_native() {
            ids.extend(group.member_ids.iter().copied());
        }
    }
    ids
}

/// Save reconciliation for one partition's checklist: `checked − moved-out
/// ids`, then replace. Rows the role holds in other partitions are carried
/// over unchanged.
pub fn plan_save(
    snapshot: &AccessSnapshot,
    partition: &str,
    checked_ids: &[MenuId],
    move_map: &MoveMap,
) -> Result<AssignmentPlan, DomainError> {
    let outside = |id: MenuId| {
        snapshot
            .tree
            .get(id)
            .is_some_and(|n| n.partition != partition)
    };
    if let Some(&foreign) = checked_ids.iter().chain(move_map.keys()).find(|&&id| outside(id)) {
        return Err(DomainError::ValidationError(format!(
            "Menu {} is not in partition {}",
            foreign, partition
        )));
    }

    let groups = snapshot.groups();
    let moved_out = moved_out_ids(&groups, move_map);
    let effective: Vec<MenuId> = checked_ids
        .iter()
        .copied()
        .filter(|id| !moved_out.contains(id))
        .collect();

    let mut plan = plan_replace(snapshot, &effective, move_map)?;
    if let AssignmentWrite::Replace(rows) = &mut plan.write {
        rows.extend(snapshot.rows.values().filter(|r| outside(r.menu_id)).copied());
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu_node::fixtures::node;
    use crate::domain::{MenuType, Module};
    use crate::grouping::assignable_menus;
    use crate::registry::fixtures::module;

    const ROLE: i64 = 7;
    const A: ModuleId = 1;
    const B: ModuleId = 2;

    fn snapshot(rows: Vec<RoleMenuAssignment>) -> AccessSnapshot {
        let mut required = node(9, 0, MenuType::Menu, Some(A));
        required.is_required = true;
        let menus = vec![
            node(1, 0, MenuType::Directory, Some(A)),
            node(2, 1, MenuType::Menu, Some(A)),
            node(3, 1, MenuType::Menu, Some(A)),
            required,
            node(10, 0, MenuType::Directory, Some(B)),
            node(11, 10, MenuType::Menu, Some(B)),
        ];
        AccessSnapshot::new(ROLE, menus, vec![module(A, 1), module(B, 2)], rows)
    }

    fn applied(snap: &AccessSnapshot, plan: &AssignmentPlan) -> AccessSnapshot {
        let rows = plan.write.apply_to(&snap.rows);
        AccessSnapshot {
            rows: rows.into_iter().map(|r| (r.menu_id, r)).collect(),
            ..snap.clone()
        }
    }

    #[test]
    fn test_move_keeps_selection() {
        let snap = snapshot(vec![RoleMenuAssignment::new(ROLE, 2, true, Placement::Native)]);
        let before = assignable_menus(&snap, "admin").checked_menu_ids;

        let plan = plan_move(&snap, &[1, 2, 3], B).unwrap();
        let moved = applied(&snap, &plan);

        assert_eq!(moved.rows.len(), 3);
        assert!(moved.rows.values().all(|r| r.placement == Placement::OverriddenTo(B)));
        assert!(moved.is_selected(2) && !moved.is_selected(3));
        assert_eq!(assignable_menus(&moved, "admin").checked_menu_ids, before);
    }

    #[test]
    fn test_move_to_own_module_is_rejected() {
        let snap = snapshot(Vec::new());
        assert!(matches!(plan_move(&snap, &[1, 2, 3], A), Err(DomainError::TargetEqualsSource(A))));
        assert!(matches!(plan_move(&snap, &[1, 2], B), Err(DomainError::PartialGroup(_))));
        assert!(matches!(plan_move(&snap, &[1, 2, 3], 99), Err(DomainError::UnknownTargetModule(99))));
    }

    #[test]
    fn test_move_back_to_origin_normalizes() {
        let rows = [1, 2, 3]
            .into_iter()
            .map(|id| RoleMenuAssignment::new(ROLE, id, id == 2, Placement::OverriddenTo(B)))
            .collect();
        let snap = snapshot(rows);
        let plan = plan_move(&snap, &[1, 2, 3], A).unwrap();
        let after = applied(&snap, &plan);

        assert_eq!(after.rows.len(), 1);
        assert_eq!(after.stored_placement(2), Placement::Native);
    }

    #[test]
    fn test_restore_native_group_is_noop() {
        let snap = snapshot(vec![RoleMenuAssignment::new(ROLE, 2, true, Placement::Native)]);
        let plan = plan_restore(&snap, &[3, 1, 2]).unwrap();
        assert!(plan.write.is_noop());
        assert!(plan.affected_groups.is_empty());
    }

    #[test]
    fn test_restore_all_counts_groups() {
        let mut rows: Vec<RoleMenuAssignment> = [1, 2, 3]
            .into_iter()
            .map(|id| RoleMenuAssignment::new(ROLE, id, false, Placement::OverriddenTo(B)))
            .collect();
        rows.push(RoleMenuAssignment::new(ROLE, 9, false, Placement::OverriddenTo(B)));
        let snap = snapshot(rows);

        let plan = plan_restore_all(&snap, B).unwrap();
        assert_eq!(plan.affected_groups.len(), 2);
        assert!(applied(&snap, &plan).rows.is_empty());

        assert!(matches!(plan_restore_all(&snap, 42), Err(DomainError::ModuleNotFound(42))));
    }

    #[test]
    fn test_replace_round_trip() {
        let snap = snapshot(Vec::new());
        let map = MoveMap::from([(10, A), (11, A)]);
        let plan = plan_replace(&snap, &[2, 2, 11], &map).unwrap();
        let after = applied(&snap, &plan);

        let view = assignable_menus(&after, "admin");
        assert_eq!(view.checked_menu_ids, vec![2, 9, 11]);
        assert_eq!(view.menu_move_map, map);
    }

    #[test]
    fn test_replace_normalizes_and_rejects() {
        let snap = snapshot(Vec::new());

        let plan = plan_replace(&snap, &[2], &MoveMap::from([(1, A), (2, A), (3, A)])).unwrap();
        assert_eq!(
            plan.write,
            AssignmentWrite::Replace(vec![RoleMenuAssignment::new(ROLE, 2, true, Placement::Native)])
        );

        assert!(matches!(plan_replace(&snap, &[2, 404], &MoveMap::new()), Err(DomainError::UnknownMenu(404))));
        assert!(matches!(
            plan_replace(&snap, &[], &MoveMap::from([(1, B), (2, B)])),
            Err(DomainError::PartialGroup(_))
        ));
        assert!(matches!(
            plan_replace(&snap, &[], &MoveMap::from([(10, A), (11, 3)])),
            Err(DomainError::PartialGroup(_))
        ));
    }

    #[test]
    fn test_save_drops_moved_out_selection() {
        let snap = snapshot(Vec::new());
        let map = MoveMap::from([(1, B), (2, B), (3, B)]);
        let plan = plan_save(&snap, "admin", &[2, 3, 11], &map).unwrap();
        let after = applied(&snap, &plan);

        assert!(!after.is_selected(2) && !after.is_selected(3));
        assert!(after.is_selected(11));
        assert_eq!(after.stored_placement(1), Placement::OverriddenTo(B));
    }

    #[test]
    fn test_save_keeps_rows_in_other_partitions() {
        let mut portal = node(30, 0, MenuType::Menu, Some(A));
        portal.partition = "member".to_string();
        let mut menus = snapshot(Vec::new()).tree.nodes().cloned().collect::<Vec<_>>();
        menus.push(portal);
        let rows = vec![
            RoleMenuAssignment::new(ROLE, 30, true, Placement::Native),
            RoleMenuAssignment::new(ROLE, 3, true, Placement::Native),
        ];
        let snap = AccessSnapshot::new(ROLE, menus, vec![module(A, 1), module(B, 2)], rows);

        let plan = plan_save(&snap, "admin", &[2], &MoveMap::new()).unwrap();
        let after = applied(&snap, &plan);
        assert!(after.is_selected(30));
        assert!(after.is_selected(2));
        assert!(!after.is_selected(3));

        assert!(matches!(
            plan_save(&snap, "admin", &[2, 30], &MoveMap::new()),
            Err(DomainError::ValidationError(_))
        ));
    }

    /// Directory 20 (A) holding 21 (owned by B) and 22 (A).
    fn mixed_snapshot(rows: Vec<RoleMenuAssignment>) -> AccessSnapshot {
        let menus = vec![
            node(20, 0, MenuType::Directory, Some(A)),
            node(21, 20, MenuType::Menu, Some(B)),
            node(22, 20, MenuType::Menu, Some(A)),
        ];
        AccessSnapshot::new(ROLE, menus, vec![module(A, 1), module(B, 2)], rows)
    }

    #[test]
    fn test_move_normalizes_against_each_menus_own_module() {
        let snap = mixed_snapshot(vec![RoleMenuAssignment::new(ROLE, 21, true, Placement::Native)]);

        let moved = applied(&snap, &plan_move(&snap, &[20, 21, 22], B).unwrap());
        assert_eq!(moved.stored_placement(20), Placement::OverriddenTo(B));
        assert_eq!(moved.stored_placement(21), Placement::Native);
        assert_eq!(moved.stored_placement(22), Placement::OverriddenTo(B));
        assert!(moved.is_selected(21));

        let groups = moved.groups();
        let group = groups.group_of(20).unwrap();
        assert_eq!(moved.group_placement(group), Placement::OverriddenTo(B));
        let view = assignable_menus(&moved, "admin");
        assert_eq!(view.menu_move_map, MoveMap::from([(20, B), (22, B)]));

        let back = applied(&moved, &plan_move(&moved, &[20, 21, 22], A).unwrap());
        assert_eq!(back.stored_placement(20), Placement::Native);
        assert_eq!(back.stored_placement(21), Placement::OverriddenTo(A));
        assert_eq!(back.stored_placement(22), Placement::Native);
        assert_eq!(assignable_menus(&back, "admin").menu_move_map, MoveMap::from([(21, A)]));
    }

    #[test]
    fn test_replace_mixed_group_round_trips_normalized_map() {
        let snap = mixed_snapshot(Vec::new());
        let map = MoveMap::from([(20, B), (21, B), (22, B)]);
        let after = applied(&snap, &plan_replace(&snap, &[22], &map).unwrap());

        assert!(!after.rows.contains_key(&21));
        let normalized = MoveMap::from([(20, B), (22, B)]);
        assert_eq!(assignable_menus(&after, "admin").menu_move_map, normalized);

        // The normalized map is accepted back as a whole group.
        let again = applied(&after, &plan_replace(&after, &[22], &normalized).unwrap());
        assert_eq!(again.rows, after.rows);

        assert!(matches!(
            plan_replace(&snap, &[], &MoveMap::from([(20, B)])),
            Err(DomainError::PartialGroup(_))
        ));
    }

    #[test]
    fn test_replace_rejects_disabled_or_unknown_target() {
        let disabled = Module { is_enabled: false, ..module(3, 0) };
        let menus = vec![
            node(1, 0, MenuType::Directory, Some(A)),
            node(2, 1, MenuType::Menu, Some(A)),
        ];
        let snap = AccessSnapshot::new(ROLE, menus, vec![module(A, 1), disabled], Vec::new());

        assert!(matches!(
            plan_replace(&snap, &[2], &MoveMap::from([(1, 3), (2, 3)])),
            Err(DomainError::ModuleDisabled(3))
        ));
        assert!(matches!(
            plan_save(&snap, "admin", &[2], &MoveMap::from([(1, 3), (2, 3)])),
            Err(DomainError::ModuleDisabled(3))
        ));
        assert!(matches!(
            plan_replace(&snap, &[2], &MoveMap::from([(1, 99), (2, 99)])),
            Err(DomainError::UnknownTargetModule(99))
        ));
    }
}
