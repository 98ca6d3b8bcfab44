//! Audit sink backed by the `audit_logs` table

use async_trait::async_trait;
use sqlx::PgPool;

use menuacl_core::domain::AuditEntry;
use menuacl_core::error::DomainError;
use menuacl_core::repositories::AuditSink;

use super::db_error;

pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, operator_id, action, role_id, subject,
                before_state, after_state, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.operator.id)
        .bind(entry.action.as_str())
        .bind(entry.role_id)
        .bind(&entry.subject)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("writing audit entry", e))?;

        Ok(())
    }
}
