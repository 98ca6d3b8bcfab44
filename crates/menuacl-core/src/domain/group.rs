//! Menu groups: the atomic unit of movement between modules.
//!
//! A group is either a top-most directory with every descendant, or the
//! root-level nodes of one partition and module that have no directory
//! ancestor (the standalone group). Groups are derived, never persisted.

use serde::{Deserialize, Serialize};

use menuacl_shared::{MenuId, ModuleId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    Directory { menu_id: MenuId },
    Standalone { partition: String, module_id: Option<ModuleId> },
}

impl GroupKey {
    pub fn anchor(&self) -> Option<MenuId> {
        match self {
            GroupKey::Directory { menu_id } => Some(*menu_id),
            GroupKey::Standalone { .. } => None,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Directory { menu_id } => write!(f, "directory:{}", menu_id),
            GroupKey::Standalone { partition, module_id: Some(m) } => {
                write!(f, "standalone:{}:{}", partition, m)
            }
            GroupKey::Standalone { partition, module_id: None } => {
                write!(f, "standalone:{}:unclassified", partition)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub key: GroupKey,
    pub partition: String,
    /// Structural owner of the group, taken from the anchor directory.
    pub module_id: Option<ModuleId>,
    /// Every member id in display order (sort asc, id asc, depth first).
    pub member_ids: Vec<MenuId>,
    /// Members that count toward selection: everything except directories.
    pub selectable_ids: Vec<MenuId>,
    pub order: (i32, MenuId),
}

impl MenuGroup {
    pub fn contains(&self, menu_id: MenuId) -> bool {
        self.member_ids.contains(&menu_id)
    }

    pub fn is_standalone(&self) -> bool {
        matches!(self.key, GroupKey::Standalone { .. })
    }

    /// Members sorted ascending, for exact-set comparisons.
    pub fn sorted_ids(&self) -> Vec<MenuId> {
        let mut ids = self.member_ids.clone();
        ids.sort_unstable();
        ids
    }
}

/// A group's state for one role, seen from one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    Native,
    MovedOut,
    MovedIn,
}

/// Tri-state selection over a group's selectable members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    All,
    None,
    Partial,
}

impl Selection {
    pub fn from_counts(selected: usize, total: usize) -> Self {
        if total == 0 || selected == 0 {
            Selection::None
        } else if selected >= total {
            Selection::All
        } else {
            Selection::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_counts() {
        assert_eq!(Selection::from_counts(0, 0), Selection::None);
        assert_eq!(Selection::from_counts(0, 3), Selection::None);
        assert_eq!(Selection::from_counts(2, 3), Selection::Partial);
        assert_eq!(Selection::from_counts(3, 3), Selection::All);
    }

    #[test]
    fn test_group_key_display() {
        assert_eq!(GroupKey::Directory { menu_id: 4 }.to_string(), "directory:4");
        let key = GroupKey::Standalone { partition: "admin".into(), module_id: None };
        assert_eq!(key.to_string(), "standalone:admin:unclassified");
    }
}
