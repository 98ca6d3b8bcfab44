//! PostgreSQL module registry (read-only)

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use menuacl_core::domain::Module;
use menuacl_core::error::DomainError;
use menuacl_core::repositories::ModuleRepository;
use menuacl_shared::ModuleId;

use super::db_error;

pub struct PgModuleRepository {
    pool: PgPool,
}

impl PgModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ModuleRow {
    pub id: i64,
    pub name: String,
    pub alias: String,
    pub title: String,
    pub priority: i32,
    pub is_enabled: bool,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Module {
            id: row.id,
            name: row.name,
            alias: row.alias,
            title: row.title,
            priority: row.priority,
            is_enabled: row.is_enabled,
        }
    }
}

pub(crate) async fn load_modules(conn: &mut PgConnection) -> Result<Vec<Module>, DomainError> {
    let rows: Vec<ModuleRow> = sqlx::query_as(
        r#"
        SELECT id, name, alias, title, priority, is_enabled
        FROM modules
        ORDER BY priority DESC, id ASC
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(|e| db_error("loading modules", e))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[async_trait]
impl ModuleRepository for PgModuleRepository {
    async fn list(&self) -> Result<Vec<Module>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("acquiring connection", e))?;
        load_modules(&mut conn).await
    }

    async fn find_by_id(&self, id: ModuleId) -> Result<Option<Module>, DomainError> {
        let row: Option<ModuleRow> = sqlx::query_as(
            "SELECT id, name, alias, title, priority, is_enabled FROM modules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding module by id", e))?;

        Ok(row.map(Into::into))
    }
}
