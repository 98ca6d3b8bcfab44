//! JSON seed for the in-memory backend.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use menuacl_core::domain::{MenuDraft, MenuNode, Module, RoleMenuAssignment};
use menuacl_core::error::DomainError;
use menuacl_core::hierarchy::MenuTree;
use menuacl_core::registry::ModuleRegistry;
use menuacl_shared::{MenuId, Operator, RoleId};

use super::MemoryStore;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Cannot read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed data rejected: {0}")]
    Invalid(#[from] DomainError),
}

/// A menu with a fixed id so seeded assignments can reference it.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedMenu {
    pub id: MenuId,
    #[serde(flatten)]
    pub draft: MenuDraft,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// Parents must appear before their children.
    #[serde(default)]
    pub menus: Vec<SeedMenu>,
    #[serde(default)]
    pub assignments: Vec<RoleMenuAssignment>,
}

impl MemorySeed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl MemoryStore {
    /// Builds a store from seed data. Menus pass the same hierarchy checks
    /// as the create path.
    pub async fn from_seed(seed: MemorySeed) -> Result<Self, SeedError> {
        let store = MemoryStore::new();
        let registry = ModuleRegistry::new(seed.modules.iter().cloned());
        for module in seed.modules {
            store.insert_module(module).await;
        }
        for role_id in seed.roles {
            store.insert_role(role_id).await;
        }

        let mut nodes: Vec<MenuNode> = Vec::with_capacity(seed.menus.len());
        for menu in seed.menus {
            let draft = menu.draft.normalized().map_err(DomainError::from)?;
            MenuTree::new(nodes.clone()).check_create(&draft)?;
            registry.check_owner(draft.module_id)?;
            nodes.push(MenuNode::from_draft(menu.id, &draft, Operator::system()));
        }
        let menu_count = nodes.len();
        for node in nodes {
            store.insert_menu(node).await;
        }

        for row in seed.assignments {
            store.insert_row(row).await;
        }

        info!("In-memory store seeded with {} menu(s)", menu_count);
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuacl_core::repositories::{AssignmentRepository, MenuRepository};

    const SEED: &str = r#"{
        "modules": [{ "id": 1, "name": "system", "alias": "sys", "title": "System", "priority": 10, "is_enabled": true }],
        "roles": [7],
        "menus": [
            { "id": 10, "partition": "admin", "module_id": 1, "menu_type": "directory", "name": "System", "key": "system", "path": "/system" },
            { "id": 11, "partition": "admin", "module_id": 1, "parent_id": 10, "name": "Users", "key": "system.users", "path": "/system/users" }
        ],
        "assignments": [
            { "role_id": 7, "menu_id": 11, "selected": true, "placement": { "kind": "native" } }
        ]
    }"#;

    #[tokio::test]
    async fn test_seed_loads_and_continues_ids() {
        let seed: MemorySeed = serde_json::from_str(SEED).unwrap();
        let store = MemoryStore::from_seed(seed).await.unwrap();

        let snapshot = store.load_snapshot(7).await.unwrap();
        assert!(snapshot.is_selected(11));
        assert_eq!(snapshot.tree.len(), 2);

        let parent = MenuRepository::find_by_id(&store, 10).await.unwrap().unwrap();
        let mut draft = seed_draft();
        draft.parent_id = parent.id;
        let created = store.create(&draft, Operator::new(1)).await.unwrap();
        assert_eq!(created.id, 12);
    }

    fn seed_draft() -> MenuDraft {
        serde_json::from_str(
            r#"{ "partition": "admin", "module_id": 1, "name": "Roles", "key": "system.roles", "path": "/system/roles" }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_rejects_orphan() {
        let seed: MemorySeed = serde_json::from_str(
            r#"{ "menus": [{ "id": 2, "partition": "admin", "parent_id": 1, "name": "Lost", "key": "lost" }] }"#,
        )
        .unwrap();
        let err = MemoryStore::from_seed(seed).await.unwrap_err();
        assert!(matches!(err, SeedError::Invalid(DomainError::ParentNotFound(1))));
    }

    #[tokio::test]
    async fn test_development_seed_file_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/seed.json");
        let store = MemoryStore::from_seed(MemorySeed::from_path(path).unwrap()).await.unwrap();

        let snapshot = store.load_snapshot(7).await.unwrap();
        assert!(snapshot.is_selected(2));
        assert!(store.load_snapshot(1).await.unwrap().rows.is_empty());
    }
}
