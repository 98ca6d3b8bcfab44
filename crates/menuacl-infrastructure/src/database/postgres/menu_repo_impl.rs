// ============================================================================
// Menu ACL Infrastructure - PostgreSQL Menu Repository
// File: crates/menuacl-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, info};

use menuacl_core::domain::{MenuDraft, MenuNode, MenuType};
use menuacl_core::error::DomainError;
use menuacl_core::hierarchy::MenuTree;
use menuacl_core::registry::ModuleRegistry;
use menuacl_core::repositories::MenuRepository;
use menuacl_shared::{AuditFields, MenuId, Operator};

use super::module_repo_impl::load_modules;
use super::{advisory_lock, db_error, is_unique_violation, violated_constraint, HIERARCHY_LOCK_KEY};

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MENU_COLUMNS: &str = r#"
    id, partition_key, module_id, parent_id, menu_type,
    name, menu_key, path, icon, component, redirect,
    is_required, sort, is_enabled, is_deleted,
    created_at, created_by, modified_at, modified_by
"#;

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: i64,
    pub partition_key: String,
    pub module_id: Option<i64>,
    pub parent_id: i64,
    pub menu_type: String,
    pub name: String,
    pub menu_key: String,
    pub path: String,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub is_required: bool,
    pub sort: i32,
    pub is_enabled: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<i64>,
}

impl From<MenuRow> for MenuNode {
    fn from(row: MenuRow) -> Self {
        MenuNode {
            id: row.id,
            partition: row.partition_key,
            module_id: row.module_id,
            parent_id: row.parent_id,
            menu_type: MenuType::from_str(&row.menu_type).unwrap_or_default(),
            name: row.name,
            key: row.menu_key,
            path: row.path,
            icon: row.icon,
            component: row.component,
            redirect: row.redirect,
            is_required: row.is_required,
            sort: row.sort,
            is_enabled: row.is_enabled,
            is_deleted: row.is_deleted,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                modified_at: row.modified_at,
                modified_by: row.modified_by,
            },
        }
    }
}

/// Every live menu node, optionally of one partition.
pub(crate) async fn load_menus(
    conn: &mut PgConnection,
    partition: Option<&str>,
) -> Result<Vec<MenuNode>, DomainError> {
    let rows: Vec<MenuRow> = sqlx::query_as(&format!(
        "SELECT {} FROM menus WHERE NOT is_deleted AND ($1::varchar IS NULL OR partition_key = $1) ORDER BY id",
        MENU_COLUMNS
    ))
    .bind(partition)
    .fetch_all(conn)
    .await
    .map_err(|e| db_error("loading menus", e))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

fn map_write_error(e: sqlx::Error, draft: &MenuDraft) -> DomainError {
    if is_unique_violation(&e) {
        let constraint = violated_constraint(&e).unwrap_or_default();
        if constraint.contains("path") {
            return DomainError::MenuPathAlreadyExists {
                partition: draft.partition.clone(),
                path: draft.path.clone(),
            };
        }
        return DomainError::MenuKeyAlreadyExists {
            partition: draft.partition.clone(),
            key: draft.key.clone(),
        };
    }
    db_error("writing menu", e)
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "SELECT {} FROM menus WHERE id = $1 AND NOT is_deleted",
            MENU_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding menu by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, partition: Option<&str>) -> Result<Vec<MenuNode>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("acquiring connection", e))?;
        load_menus(&mut conn, partition).await
    }

    async fn create(&self, draft: &MenuDraft, operator: Operator) -> Result<MenuNode, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("beginning transaction", e))?;
        advisory_lock(&mut tx, HIERARCHY_LOCK_KEY).await?;

        let tree = MenuTree::new(load_menus(&mut tx, None).await?);
        tree.check_create(draft)?;
        ModuleRegistry::new(load_modules(&mut tx).await?).check_owner(draft.module_id)?;

        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menus (
                partition_key, module_id, parent_id, menu_type,
                name, menu_key, path, icon, component, redirect,
                is_required, sort, is_enabled, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(&draft.partition)
        .bind(draft.module_id)
        .bind(draft.parent_id)
        .bind(draft.menu_type.as_str())
        .bind(&draft.name)
        .bind(&draft.key)
        .bind(&draft.path)
        .bind(&draft.icon)
        .bind(&draft.component)
        .bind(&draft.redirect)
        .bind(draft.is_required)
        .bind(draft.sort)
        .bind(draft.is_enabled)
        .bind(operator.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, draft))?;

        tx.commit().await.map_err(|e| db_error("committing menu create", e))?;

        info!("Menu row inserted: {} in partition {}", row.id, row.partition_key);
        Ok(row.into())
    }

    async fn update(
        &self,
        id: MenuId,
        draft: &MenuDraft,
        operator: Operator,
    ) -> Result<(MenuNode, MenuNode), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("beginning transaction", e))?;
        advisory_lock(&mut tx, HIERARCHY_LOCK_KEY).await?;

        // Reparent cycle walk runs against this transaction's view.
        let tree = MenuTree::new(load_menus(&mut tx, None).await?);
        tree.check_update(id, draft)?;
        ModuleRegistry::new(load_modules(&mut tx).await?).check_owner(draft.module_id)?;
        let before = tree.get(id).cloned().ok_or(DomainError::MenuNotFound(id))?;

        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            UPDATE menus
            SET module_id = $2, parent_id = $3, menu_type = $4,
                name = $5, menu_key = $6, path = $7, icon = $8, component = $9, redirect = $10,
                is_required = $11, sort = $12, is_enabled = $13,
                modified_at = NOW(), modified_by = $14
            WHERE id = $1 AND NOT is_deleted
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(id)
        .bind(draft.module_id)
        .bind(draft.parent_id)
        .bind(draft.menu_type.as_str())
        .bind(&draft.name)
        .bind(&draft.key)
        .bind(&draft.path)
        .bind(&draft.icon)
        .bind(&draft.component)
        .bind(&draft.redirect)
        .bind(draft.is_required)
        .bind(draft.sort)
        .bind(draft.is_enabled)
        .bind(operator.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, draft))?;

        tx.commit().await.map_err(|e| db_error("committing menu update", e))?;

        debug!("Menu row updated: {}", id);
        Ok((before, row.into()))
    }

    async fn delete(&self, id: MenuId, operator: Operator) -> Result<MenuNode, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("beginning transaction", e))?;
        advisory_lock(&mut tx, HIERARCHY_LOCK_KEY).await?;

        let tree = MenuTree::new(load_menus(&mut tx, None).await?);
        tree.check_delete(id)?;

        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            UPDATE menus
            SET is_deleted = TRUE, modified_at = NOW(), modified_by = $2
            WHERE id = $1 AND NOT is_deleted
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(id)
        .bind(operator.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("soft-deleting menu", e))?;

        let removed = sqlx::query("DELETE FROM role_menu_assignments WHERE menu_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("removing assignments of deleted menu", e))?
            .rows_affected();

        tx.commit().await.map_err(|e| db_error("committing menu delete", e))?;

        info!("Menu {} soft-deleted, {} assignment row(s) removed", id, removed);
        Ok(row.into())
    }
}
