//! In-memory store.
//!
//! Backs tests and local development. All state sits behind one
//! `tokio::sync::RwLock`: reads take the read lock, so a snapshot never
//! straddles a write, and every mutation runs under the write lock, which
//! serializes same-role edits the way the advisory lock does in Postgres.
//! Nothing is durable.

mod seed;

pub use seed::{MemorySeed, SeedError, SeedMenu};

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use menuacl_core::domain::{MenuDraft, MenuNode, Module, RoleMenuAssignment};
use menuacl_core::error::DomainError;
use menuacl_core::hierarchy::MenuTree;
use menuacl_core::reconcile::AppliedChange;
use menuacl_core::registry::ModuleRegistry;
use menuacl_core::repositories::{
    AssignmentRepository, HealthCheck, MenuRepository, ModuleRepository, Planner,
};
use menuacl_core::snapshot::AccessSnapshot;
use menuacl_shared::{MenuId, ModuleId, Operator, RoleId};

#[derive(Debug, Default)]
struct State {
    menus: BTreeMap<MenuId, MenuNode>,
    modules: BTreeMap<ModuleId, Module>,
    roles: BTreeSet<RoleId>,
    rows: BTreeMap<(RoleId, MenuId), RoleMenuAssignment>,
    last_menu_id: MenuId,
}

impl State {
    fn live_menus(&self) -> Vec<MenuNode> {
        self.menus.values().filter(|n| !n.is_deleted).cloned().collect()
    }

    fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::new(self.modules.values().cloned())
    }

    fn snapshot(&self, role_id: RoleId) -> Result<AccessSnapshot, DomainError> {
        if !self.roles.contains(&role_id) {
            return Err(DomainError::RoleNotFound(role_id));
        }
        let rows = self
            .rows
            .range((role_id, MenuId::MIN)..=(role_id, MenuId::MAX))
            .map(|(_, row)| *row)
            .collect();

        Ok(AccessSnapshot::new(
            role_id,
            self.live_menus(),
            self.modules.values().cloned().collect(),
            rows,
        ))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_module(&self, module: Module) {
        self.state.write().await.modules.insert(module.id, module);
    }

    pub async fn insert_role(&self, role_id: RoleId) {
        self.state.write().await.roles.insert(role_id);
    }

    /// Stores a node as given, bypassing hierarchy checks. Seeding only.
    pub async fn insert_menu(&self, node: MenuNode) {
        let mut state = self.state.write().await;
        let last = state.last_menu_id.max(node.id);
        state.last_menu_id = last;
        state.menus.insert(node.id, node);
    }

    /// Stores a row as given, bypassing planning. Lets tests stage
    /// inconsistent data.
    pub async fn insert_row(&self, row: RoleMenuAssignment) {
        self.state
            .write()
            .await
            .rows
            .insert((row.role_id, row.menu_id), row);
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError> {
        let state = self.state.read().await;
        Ok(state.menus.get(&id).filter(|n| !n.is_deleted).cloned())
    }

    async fn list(&self, partition: Option<&str>) -> Result<Vec<MenuNode>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .menus
            .values()
            .filter(|n| !n.is_deleted)
            .filter(|n| partition.map_or(true, |p| n.partition == p))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &MenuDraft, operator: Operator) -> Result<MenuNode, DomainError> {
        let mut state = self.state.write().await;
        MenuTree::new(state.live_menus()).check_create(draft)?;
        state.registry().check_owner(draft.module_id)?;

        state.last_menu_id += 1;
        let node = MenuNode::from_draft(state.last_menu_id, draft, operator);
        state.menus.insert(node.id, node.clone());

        debug!("Menu {} stored in memory", node.id);
        Ok(node)
    }

    async fn update(
        &self,
        id: MenuId,
        draft: &MenuDraft,
        operator: Operator,
    ) -> Result<(MenuNode, MenuNode), DomainError> {
        let mut state = self.state.write().await;
        MenuTree::new(state.live_menus()).check_update(id, draft)?;
        state.registry().check_owner(draft.module_id)?;

        let node = state
            .menus
            .get_mut(&id)
            .filter(|n| !n.is_deleted)
            .ok_or(DomainError::MenuNotFound(id))?;
        let before = node.clone();
        node.apply_draft(draft, operator);

        Ok((before, node.clone()))
    }

    async fn delete(&self, id: MenuId, operator: Operator) -> Result<MenuNode, DomainError> {
        let mut state = self.state.write().await;
        MenuTree::new(state.live_menus()).check_delete(id)?;

        let node = state
            .menus
            .get_mut(&id)
            .ok_or(DomainError::MenuNotFound(id))?;
        node.soft_delete(operator);
        let deleted = node.clone();

        let before = state.rows.len();
        state.rows.retain(|(_, menu_id), _| *menu_id != id);
        info!("Menu {} soft-deleted, {} assignment row(s) removed", id, before - state.rows.len());

        Ok(deleted)
    }
}

#[async_trait]
impl ModuleRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Module>, DomainError> {
        Ok(self.state.read().await.modules.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ModuleId) -> Result<Option<Module>, DomainError> {
        Ok(self.state.read().await.modules.get(&id).cloned())
    }
}

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn load_snapshot(&self, role_id: RoleId) -> Result<AccessSnapshot, DomainError> {
        self.state.read().await.snapshot(role_id)
    }

    async fn apply(&self, role_id: RoleId, planner: Planner) -> Result<AppliedChange, DomainError> {
        let mut state = self.state.write().await;
        let snapshot = state.snapshot(role_id)?;
        let plan = planner(&snapshot)?;

        let after = plan.write.apply_to(&snapshot.rows);
        state.rows.retain(|(role, _), _| *role != role_id);
        state
            .rows
            .extend(after.iter().map(|row| ((role_id, row.menu_id), *row)));

        Ok(AppliedChange {
            before: snapshot.row_list(),
            after,
            affected_groups: plan.affected_groups,
        })
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuacl_core::domain::{MenuType, Placement};

    fn draft(parent_id: MenuId, menu_type: MenuType, key: &str) -> MenuDraft {
        MenuDraft {
            partition: "admin".into(),
            module_id: Some(1),
            parent_id,
            menu_type,
            name: key.into(),
            key: key.into(),
            path: format!("/{}", key),
            icon: None,
            component: None,
            redirect: None,
            is_required: false,
            sort: 0,
            is_enabled: true,
        }
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_module(Module {
                id: 1,
                name: "system".into(),
                alias: "sys".into(),
                title: "System".into(),
                priority: 0,
                is_enabled: true,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = store().await;
        let op = Operator::new(3);
        let dir = store.create(&draft(0, MenuType::Directory, "system"), op).await.unwrap();
        let child = store.create(&draft(dir.id, MenuType::Menu, "users"), op).await.unwrap();

        assert_eq!((dir.id, child.id), (1, 2));
        assert_eq!(child.audit.created_by, Some(3));
        assert_eq!(MenuRepository::list(&store, Some("member")).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_assignment_rows() {
        let store = store().await;
        store.insert_role(7).await;
        let op = Operator::system();
        let node = store.create(&draft(0, MenuType::Menu, "reports"), op).await.unwrap();
        store
            .insert_row(RoleMenuAssignment::new(7, node.id, true, Placement::Native))
            .await;

        store.delete(node.id, op).await.unwrap();

        assert!(MenuRepository::find_by_id(&store, node.id).await.unwrap().is_none());
        assert!(store.load_snapshot(7).await.unwrap().rows.is_empty());
        assert!(matches!(store.delete(node.id, op).await, Err(DomainError::MenuNotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_module_must_exist() {
        let store = store().await;
        let op = Operator::system();
        let mut orphan = draft(0, MenuType::Menu, "orphan");
        orphan.module_id = Some(999);
        assert!(matches!(
            store.create(&orphan, op).await,
            Err(DomainError::ModuleNotFound(999))
        ));

        let node = store.create(&draft(0, MenuType::Menu, "reports"), op).await.unwrap();
        let mut moved = draft(0, MenuType::Menu, "reports");
        moved.module_id = Some(999);
        assert!(matches!(
            store.update(node.id, &moved, op).await,
            Err(DomainError::ModuleNotFound(999))
        ));
        let stored = MenuRepository::find_by_id(&store, node.id).await.unwrap().unwrap();
        assert_eq!(stored.module_id, Some(1));
    }

    #[tokio::test]
    async fn test_unknown_role() {
        let store = MemoryStore::new();
        assert!(matches!(store.load_snapshot(1).await, Err(DomainError::RoleNotFound(1))));
    }
}
