//! Write-only audit sink (port)

use async_trait::async_trait;

use crate::domain::AuditEntry;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), DomainError>;
}
