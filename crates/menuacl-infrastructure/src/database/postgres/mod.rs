//! PostgreSQL repository implementations

pub mod menu_repo_impl;
pub mod module_repo_impl;
pub mod assignment_repo_impl;
pub mod audit_repo_impl;
pub mod health;

pub use menu_repo_impl::PgMenuRepository;
pub use module_repo_impl::PgModuleRepository;
pub use assignment_repo_impl::PgAssignmentRepository;
pub use audit_repo_impl::PgAuditSink;
pub use health::PgHealthCheck;

use sqlx::PgConnection;
use tracing::error;

use menuacl_core::error::DomainError;

/// Logs and wraps a driver error.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

/// Name of the violated constraint, when the driver reports one.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    }
}

/// Transaction-scoped advisory lock on a namespaced key. Released on
/// commit or rollback.
pub(crate) async fn advisory_lock(conn: &mut PgConnection, key: &str) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
        .bind(key)
        .execute(conn)
        .await
        .map_err(|e| db_error("taking advisory lock", e))?;
    Ok(())
}

/// Shared form of [`advisory_lock`]: holders of the shared lock only
/// exclude exclusive holders of the same key.
pub(crate) async fn advisory_lock_shared(conn: &mut PgConnection, key: &str) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock_shared(hashtext($1)::bigint)")
        .bind(key)
        .execute(conn)
        .await
        .map_err(|e| db_error("taking shared advisory lock", e))?;
    Ok(())
}

/// Menu writes hold this exclusively; assignment writes hold it shared so
/// they plan against a tree no menu write is changing. Always taken before
/// a role lock.
pub(crate) const HIERARCHY_LOCK_KEY: &str = "menuacl:menus";

pub(crate) fn role_lock_key(role_id: i64) -> String {
    format!("menuacl:role:{}", role_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_keys_do_not_collide() {
        assert_eq!(role_lock_key(7), "menuacl:role:7");
        assert_ne!(role_lock_key(7), role_lock_key(70));
        assert!(!role_lock_key(1).starts_with(HIERARCHY_LOCK_KEY));
    }
}
