// ============================================================================
// Menu ACL Core - Menu Hierarchy
// File: crates/menuacl-core/src/hierarchy.rs
// Description: Arena of menu nodes with bounded, cycle-safe tree walks
// ============================================================================
//! The tree is an arena keyed by menu id. `parent_id` is a plain back
//! reference; every walk is iterative and bounded by the node count so a
//! corrupted parent chain can never recurse without end.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use menuacl_shared::constants::ROOT_PARENT_ID;
use menuacl_shared::MenuId;

use crate::domain::{MenuDraft, MenuNode};
use crate::error::DomainError;

#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    nodes: BTreeMap<MenuId, MenuNode>,
    /// Child ids per parent, in display order. Root nodes sit under `0`.
    children: BTreeMap<MenuId, Vec<MenuId>>,
}

/// Nested view of a partition, used by the tree listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub node: MenuNode,
    pub children: Vec<MenuTreeNode>,
}

impl MenuTree {
    /// Builds the arena from live nodes; soft-deleted nodes are skipped.
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = MenuNode>,
    {
        let nodes: BTreeMap<MenuId, MenuNode> = nodes
            .into_iter()
            .filter(|n| !n.is_deleted)
            .map(|n| (n.id, n))
            .collect();

        let mut children: BTreeMap<MenuId, Vec<MenuId>> = BTreeMap::new();
        for node in nodes.values() {
            children.entry(node.parent_id).or_default().push(node.id);
        }
        for ids in children.values_mut() {
            ids.sort_by_key(|id| nodes.get(id).map(|n| n.order_key()));
        }

        Self { nodes, children }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: MenuId) -> Option<&MenuNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: MenuId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes.values()
    }

    pub fn partition_nodes<'a>(&'a self, partition: &'a str) -> impl Iterator<Item = &'a MenuNode> {
        self.nodes.values().filter(move |n| n.partition == partition)
    }

    /// Direct children in display order.
    pub fn children_of(&self, id: MenuId) -> Vec<&MenuNode> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: MenuId) -> bool {
        self.children.get(&id).is_some_and(|ids| !ids.is_empty())
    }

    /// Root-level nodes of one partition, in display order.
    pub fn roots<'a>(&'a self, partition: &str) -> Vec<&'a MenuNode> {
        self.children_of(ROOT_PARENT_ID)
            .into_iter()
            .filter(|n| n.partition == partition)
            .collect()
    }

    /// Ancestor ids from the direct parent up to the root.
    ///
    /// Parents missing from the arena end the walk. A chain longer than the
    /// arena can only be a cycle in stored data and is reported as one.
    pub fn ancestors(&self, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
        let mut chain = Vec::new();
        let mut current = match self.nodes.get(&id) {
            Some(node) => node.parent_id,
            None => return Ok(chain),
        };

        while current != ROOT_PARENT_ID {
            if current == id || chain.len() > self.nodes.len() {
                return Err(DomainError::CycleDetected { menu_id: id, parent_id: current });
            }
            let Some(node) = self.nodes.get(&current) else {
                break;
            };
            chain.push(current);
            current = node.parent_id;
        }

        Ok(chain)
    }

    /// Every descendant id in depth-first display order, excluding `id`.
    pub fn descendants(&self, id: MenuId) -> Vec<MenuId> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::from([id]);
        let mut stack: Vec<MenuId> = self.child_ids_rev(id);

        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.child_ids_rev(next));
        }

        out
    }

    fn child_ids_rev(&self, id: MenuId) -> Vec<MenuId> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().rev().copied().collect())
            .unwrap_or_default()
    }

    /// True when `candidate` is `id` itself or sits below it.
    pub fn is_self_or_descendant(&self, candidate: MenuId, id: MenuId) -> Result<bool, DomainError> {
        if candidate == id {
            return Ok(true);
        }
        Ok(self.ancestors(candidate)?.contains(&id))
    }

    /// Checks a draft for a brand-new node against the current partition.
    pub fn check_create(&self, draft: &MenuDraft) -> Result<(), DomainError> {
        self.check_parent(None, draft)?;
        self.check_unique(None, draft)
    }

    /// Checks an edit of `id`, including the reparent cycle walk.
    pub fn check_update(&self, id: MenuId, draft: &MenuDraft) -> Result<(), DomainError> {
        let existing = self.nodes.get(&id).ok_or(DomainError::MenuNotFound(id))?;
        if existing.partition != draft.partition {
            return Err(DomainError::ValidationError(format!(
                "Menu {} cannot move from partition {} to {}",
                id, existing.partition, draft.partition
            )));
        }
        if self.has_children(id) && !draft.menu_type.can_parent() {
            return Err(DomainError::ValidationError(format!(
                "Menu {} has children and cannot become a {}",
                id,
                draft.menu_type.as_str()
            )));
        }

        self.check_parent(Some(id), draft)?;
        self.check_unique(Some(id), draft)
    }

    /// A node may only be removed once it has no live children.
    pub fn check_delete(&self, id: MenuId) -> Result<(), DomainError> {
        if !self.nodes.contains_key(&id) {
            return Err(DomainError::MenuNotFound(id));
        }
        if self.has_children(id) {
            return Err(DomainError::MenuHasChildren(id));
        }
        Ok(())
    }

    fn check_parent(&self, id: Option<MenuId>, draft: &MenuDraft) -> Result<(), DomainError> {
        if draft.parent_id == ROOT_PARENT_ID {
            return Ok(());
        }

        let parent = self
            .nodes
            .get(&draft.parent_id)
            .ok_or(DomainError::ParentNotFound(draft.parent_id))?;

        if parent.partition != draft.partition {
            return Err(DomainError::PartitionMismatch {
                parent_id: parent.id,
                parent_partition: parent.partition.clone(),
                partition: draft.partition.clone(),
            });
        }

        if !parent.menu_type.can_parent() {
            return Err(DomainError::InvalidParentType {
                parent_id: parent.id,
                parent_type: parent.menu_type.as_str().to_string(),
            });
        }

        if let Some(id) = id {
            if self.is_self_or_descendant(draft.parent_id, id)? {
                return Err(DomainError::CycleDetected { menu_id: id, parent_id: draft.parent_id });
            }
        }

        Ok(())
    }

    fn check_unique(&self, id: Option<MenuId>, draft: &MenuDraft) -> Result<(), DomainError> {
        for other in self.partition_nodes(&draft.partition) {
            if Some(other.id) == id {
                continue;
            }
            if other.key == draft.key {
                return Err(DomainError::MenuKeyAlreadyExists {
                    partition: draft.partition.clone(),
                    key: draft.key.clone(),
                });
            }
            if !draft.path.is_empty() && other.path == draft.path {
                return Err(DomainError::MenuPathAlreadyExists {
                    partition: draft.partition.clone(),
                    path: draft.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Nested forest of one partition in display order.
    pub fn forest(&self, partition: &str) -> Vec<MenuTreeNode> {
        self.roots(partition)
            .into_iter()
            .filter_map(|root| self.subtree(root.id))
            .collect()
    }

    fn subtree(&self, id: MenuId) -> Option<MenuTreeNode> {
        // Build bottom-up from the depth-first order so nesting needs no recursion.
        let mut order = vec![id];
        order.extend(self.descendants(id));

        let mut built: BTreeMap<MenuId, MenuTreeNode> = BTreeMap::new();
        for menu_id in order.iter().rev() {
            let Some(node) = self.nodes.get(menu_id) else {
                continue;
            };
            let children = self
                .children
                .get(menu_id)
                .map(|ids| ids.iter().filter_map(|c| built.remove(c)).collect())
                .unwrap_or_default();
            built.insert(*menu_id, MenuTreeNode { node: node.clone(), children });
        }

        built.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu_node::fixtures::{draft, node};
    use crate::domain::MenuType;

    fn sample_tree() -> MenuTree {
        // 1 (dir) -> 2 (menu) -> 4 (button)
        //         -> 3 (menu)
        // 5 (menu, root)
        MenuTree::new(vec![
            node(1, 0, MenuType::Directory, Some(1)),
            node(2, 1, MenuType::Menu, Some(1)),
            node(3, 1, MenuType::Menu, Some(1)),
            node(4, 2, MenuType::Button, Some(1)),
            node(5, 0, MenuType::Menu, Some(1)),
        ])
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let tree = sample_tree();
        assert_eq!(tree.ancestors(4).unwrap(), vec![2, 1]);
        assert!(tree.ancestors(1).unwrap().is_empty());
        assert_eq!(tree.descendants(1), vec![2, 4, 3]);
        assert!(tree.descendants(5).is_empty());
    }

    #[test]
    fn test_deleted_nodes_are_skipped() {
        let mut gone = node(6, 1, MenuType::Menu, Some(1));
        gone.is_deleted = true;
        let tree = MenuTree::new(vec![node(1, 0, MenuType::Directory, Some(1)), gone]);
        assert!(!tree.contains(6));
        assert!(!tree.has_children(1));
    }

    #[test]
    fn test_reparent_under_descendant_is_cycle() {
        let tree = sample_tree();
        let mut edit = draft(2, MenuType::Directory, "menu_1");
        edit.path = "/menu/1".into();
        let err = tree.check_update(1, &edit).unwrap_err();
        assert!(matches!(err, DomainError::CycleDetected { menu_id: 1, parent_id: 2 }));

        let mut edit = draft(1, MenuType::Directory, "menu_1");
        edit.path = "/menu/1".into();
        let err = tree.check_update(1, &edit).unwrap_err();
        assert!(matches!(err, DomainError::CycleDetected { .. }));
    }

    #[test]
    fn test_corrupt_cycle_in_stored_data() {
        let tree = MenuTree::new(vec![
            node(1, 2, MenuType::Directory, None),
            node(2, 1, MenuType::Directory, None),
        ]);
        assert!(matches!(tree.ancestors(1), Err(DomainError::CycleDetected { .. })));
    }

    #[test]
    fn test_parent_rules() {
        let tree = sample_tree();

        let err = tree.check_create(&draft(99, MenuType::Menu, "orphan")).unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound(99)));

        let err = tree.check_create(&draft(4, MenuType::Button, "under_button")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidParentType { parent_id: 4, .. }));

        let mut other = draft(1, MenuType::Menu, "member_menu");
        other.partition = "member".into();
        let err = tree.check_create(&other).unwrap_err();
        assert!(matches!(err, DomainError::PartitionMismatch { .. }));

        assert!(tree.check_create(&draft(2, MenuType::Button, "users.add")).is_ok());
    }

    #[test]
    fn test_unique_key_and_path() {
        let tree = sample_tree();
        let err = tree.check_create(&draft(0, MenuType::Menu, "menu_3")).unwrap_err();
        assert!(matches!(err, DomainError::MenuKeyAlreadyExists { .. }));

        let mut dup_path = draft(0, MenuType::Menu, "fresh");
        dup_path.path = "/menu/5".into();
        let err = tree.check_create(&dup_path).unwrap_err();
        assert!(matches!(err, DomainError::MenuPathAlreadyExists { .. }));

        let mut no_path = draft(0, MenuType::Link, "fresh");
        no_path.path = String::new();
        assert!(tree.check_create(&no_path).is_ok());
    }

    #[test]
    fn test_delete_with_children_is_rejected() {
        let tree = sample_tree();
        assert!(matches!(tree.check_delete(1), Err(DomainError::MenuHasChildren(1))));
        assert!(tree.check_delete(4).is_ok());
        assert!(matches!(tree.check_delete(42), Err(DomainError::MenuNotFound(42))));
    }

    #[test]
    fn test_forest_nesting() {
        let tree = sample_tree();
        let forest = tree.forest("admin");
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].node.id, 1);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].children[0].node.id, 4);
        assert!(tree.forest("member").is_empty());
    }
}
