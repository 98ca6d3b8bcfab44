use async_trait::async_trait;
use sqlx::PgPool;

use menuacl_core::error::DomainError;
use menuacl_core::repositories::HealthCheck;

use super::db_error;

pub struct PgHealthCheck {
    pool: PgPool,
}

impl PgHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PgHealthCheck {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("health check", e))?;
        Ok(())
    }
}
