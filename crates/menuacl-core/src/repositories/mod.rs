//! Repository traits (ports)

pub mod menu_repository;
pub mod module_repository;
pub mod assignment_repository;
pub mod audit_sink;
pub mod health;

pub use menu_repository::MenuRepository;
pub use module_repository::ModuleRepository;
pub use assignment_repository::{AssignmentRepository, Planner};
pub use audit_sink::AuditSink;
pub use health::HealthCheck;
