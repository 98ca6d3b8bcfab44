//! Menu hierarchy repository trait (port)

use async_trait::async_trait;

use menuacl_shared::{MenuId, Operator};

use crate::domain::{MenuDraft, MenuNode};
use crate::error::DomainError;

/// Implementations run every mutation in one transaction that loads the live
/// nodes of the partition, checks them with `MenuTree::check_*`, then writes.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError>;

    /// Live nodes, optionally limited to one partition, in id order.
    async fn list(&self, partition: Option<&str>) -> Result<Vec<MenuNode>, DomainError>;

    async fn create(&self, draft: &MenuDraft, operator: Operator) -> Result<MenuNode, DomainError>;

    /// Returns the node before and after the edit.
    async fn update(
        &self,
        id: MenuId,
        draft: &MenuDraft,
        operator: Operator,
    ) -> Result<(MenuNode, MenuNode), DomainError>;

    /// Soft-deletes the node and drops every assignment row that references it.
    async fn delete(&self, id: MenuId, operator: Operator) -> Result<MenuNode, DomainError>;
}
