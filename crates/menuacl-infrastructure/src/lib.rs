//! # Menu ACL Infrastructure
//!
//! Storage adapters for the core repository traits: PostgreSQL via sqlx,
//! and an in-memory store for tests and local development.

pub mod audit;
pub mod database;
pub mod memory;

use std::sync::Arc;

use sqlx::PgPool;

use menuacl_core::repositories::{
    AssignmentRepository, AuditSink, HealthCheck, MenuRepository, ModuleRepository,
};

pub use audit::TracingAuditSink;
pub use database::{
    create_pool, run_migrations, PgAssignmentRepository, PgAuditSink, PgHealthCheck,
    PgMenuRepository, PgModuleRepository,
};
pub use memory::{MemorySeed, MemoryStore, SeedError};

/// One backend's implementation of every port.
#[derive(Clone)]
pub struct Repositories {
    pub menus: Arc<dyn MenuRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub audit: Arc<dyn AuditSink>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    /// Audit entries go to the `audit_logs` table.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            menus: Arc::new(PgMenuRepository::new(pool.clone())),
            modules: Arc::new(PgModuleRepository::new(pool.clone())),
            assignments: Arc::new(PgAssignmentRepository::new(pool.clone())),
            audit: Arc::new(PgAuditSink::new(pool.clone())),
            health: Arc::new(PgHealthCheck::new(pool)),
        }
    }

    /// Audit entries go to the log.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            menus: store.clone(),
            modules: store.clone(),
            assignments: store.clone(),
            audit: Arc::new(TracingAuditSink),
            health: store,
        }
    }
}
