//! Module registry repository trait (port)

use async_trait::async_trait;

use menuacl_shared::ModuleId;

use crate::domain::Module;
use crate::error::DomainError;

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Module>, DomainError>;
    async fn find_by_id(&self, id: ModuleId) -> Result<Option<Module>, DomainError>;
}
