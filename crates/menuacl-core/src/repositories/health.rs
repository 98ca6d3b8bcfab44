use async_trait::async_trait;

use crate::error::DomainError;

/// Readiness probe for the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn ping(&self) -> Result<(), DomainError>;
}
