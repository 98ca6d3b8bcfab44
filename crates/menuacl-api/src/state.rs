use std::sync::Arc;

use menuacl_core::repositories::{
    AssignmentRepository, AuditSink, HealthCheck, MenuRepository, ModuleRepository,
};
use menuacl_core::services::{AccessService, MenuService, ModuleService};

#[derive(Clone)]
pub struct AppState {
    pub menus: Arc<MenuService>,
    pub modules: Arc<ModuleService>,
    pub access: Arc<AccessService>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Builds every service over one backend's repositories.
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        modules: Arc<dyn ModuleRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        audit: Arc<dyn AuditSink>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        Self {
            menus: Arc::new(MenuService::new(menus, audit.clone())),
            modules: Arc::new(ModuleService::new(modules)),
            access: Arc::new(AccessService::new(assignments, audit)),
            health,
        }
    }
}
