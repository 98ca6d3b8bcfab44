//! Read-only access to the module registry

use std::sync::Arc;

use menuacl_shared::ModuleId;

use crate::domain::Module;
use crate::error::DomainError;
use crate::registry::ModuleRegistry;
use crate::repositories::ModuleRepository;

pub struct ModuleService {
    modules: Arc<dyn ModuleRepository>,
}

impl ModuleService {
    pub fn new(modules: Arc<dyn ModuleRepository>) -> Self {
        Self { modules }
    }

    /// Modules by priority descending, then id ascending.
    pub async fn list(&self) -> Result<Vec<Module>, DomainError> {
        let modules = self.modules.list().await?;
        Ok(ModuleRegistry::new(modules).into_vec())
    }

    pub async fn get(&self, id: ModuleId) -> Result<Module, DomainError> {
        self.modules
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ModuleNotFound(id))
    }
}
