// ============================================================================
// Menu ACL Core - Menu Service
// File: crates/menuacl-core/src/services/menu_service.rs
// ============================================================================
//! Administrative CRUD over the menu hierarchy

use std::sync::Arc;

use tracing::{info, warn};

use menuacl_shared::utils::is_valid_partition;
use menuacl_shared::{MenuId, Operator};

use crate::domain::{AuditAction, AuditEntry, MenuDraft, MenuNode};
use crate::error::DomainError;
use crate::hierarchy::{MenuTree, MenuTreeNode};
use crate::repositories::{AuditSink, MenuRepository};
use crate::services::record_audit;

pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    audit: Arc<dyn AuditSink>,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepository>, audit: Arc<dyn AuditSink>) -> Self {
        Self { menus, audit }
    }

    fn prepare(draft: MenuDraft) -> Result<MenuDraft, DomainError> {
        let draft = draft.normalized()?;
        if !is_valid_partition(&draft.partition) {
            return Err(DomainError::ValidationError(format!(
                "Invalid partition key: {}",
                draft.partition
            )));
        }
        Ok(draft)
    }

    pub async fn create(&self, operator: Operator, draft: MenuDraft) -> Result<MenuNode, DomainError> {
        let draft = Self::prepare(draft)?;
        let node = self.menus.create(&draft, operator).await?;

        info!("Menu created: {} ({}) by operator {}", node.id, node.key, operator.id);
        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                operator,
                AuditAction::MenuCreated,
                None,
                format!("menu:{}", node.id),
                &serde_json::Value::Null,
                &node,
            ),
        )
        .await;

        Ok(node)
    }

    pub async fn update(
        &self,
        operator: Operator,
        id: MenuId,
        draft: MenuDraft,
    ) -> Result<MenuNode, DomainError> {
        let draft = Self::prepare(draft)?;
        let (before, after) = self.menus.update(id, &draft, operator).await?;

        if before.parent_id != after.parent_id {
            info!("Menu {} moved from parent {} to {}", id, before.parent_id, after.parent_id);
        }
        info!("Menu updated: {} by operator {}", id, operator.id);
        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(operator, AuditAction::MenuUpdated, None, format!("menu:{}", id), &before, &after),
        )
        .await;

        Ok(after)
    }

    pub async fn delete(&self, operator: Operator, id: MenuId) -> Result<(), DomainError> {
        let deleted = self.menus.delete(id, operator).await.inspect_err(|e| {
            warn!("Menu delete rejected for {}: {}", id, e);
        })?;

        info!("Menu deleted: {} by operator {}", id, operator.id);
        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                operator,
                AuditAction::MenuDeleted,
                None,
                format!("menu:{}", id),
                &deleted,
                &serde_json::Value::Null,
            ),
        )
        .await;

        Ok(())
    }

    pub async fn get(&self, id: MenuId) -> Result<MenuNode, DomainError> {
        self.menus.find_by_id(id).await?.ok_or(DomainError::MenuNotFound(id))
    }

    pub async fn list(&self, partition: Option<&str>) -> Result<Vec<MenuNode>, DomainError> {
        self.menus.list(partition).await
    }

    /// Nested forest of one partition in display order.
    pub async fn tree(&self, partition: &str) -> Result<Vec<MenuTreeNode>, DomainError> {
        let nodes = self.menus.list(Some(partition)).await?;
        Ok(MenuTree::new(nodes).forest(partition))
    }
}
