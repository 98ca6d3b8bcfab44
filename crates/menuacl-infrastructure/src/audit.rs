//! Audit sink that writes entries as structured tracing events

use async_trait::async_trait;
use tracing::info;

use menuacl_core::domain::AuditEntry;
use menuacl_core::error::DomainError;
use menuacl_core::repositories::AuditSink;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError> {
        info!(
            target: "menuacl::audit",
            audit_id = %entry.id,
            operator_id = entry.operator.id,
            action = entry.action.as_str(),
            role_id = ?entry.role_id,
            subject = %entry.subject,
            before = %entry.before,
            after = %entry.after,
            "audit"
        );
        Ok(())
    }
}
