// ============================================================================
// Menu ACL Infrastructure - PostgreSQL Assignment Repository
// File: crates/menuacl-infrastructure/src/database/postgres/assignment_repo_impl.rs
// Description: Snapshot reads and per-role atomic writes of role_menu_assignments
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, warn};

use menuacl_core::domain::{Placement, RoleMenuAssignment};
use menuacl_core::error::DomainError;
use menuacl_core::reconcile::{AppliedChange, AssignmentWrite};
use menuacl_core::repositories::{AssignmentRepository, Planner};
use menuacl_core::snapshot::AccessSnapshot;
use menuacl_shared::{MenuId, RoleId};

use super::menu_repo_impl::load_menus;
use super::module_repo_impl::load_modules;
use super::{advisory_lock, advisory_lock_shared, db_error, role_lock_key, HIERARCHY_LOCK_KEY};

pub struct PgAssignmentRepository {
    pool: PgPool,
}

impl PgAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    pub role_id: i64,
    pub menu_id: i64,
    pub selected: bool,
    pub target_module_id: Option<i64>,
}

impl From<AssignmentRow> for RoleMenuAssignment {
    fn from(row: AssignmentRow) -> Self {
        RoleMenuAssignment::new(
            row.role_id,
            row.menu_id,
            row.selected,
            Placement::from_column(row.target_module_id),
        )
    }
}

async fn role_exists(conn: &mut PgConnection, role_id: RoleId) -> Result<bool, DomainError> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)")
        .bind(role_id)
        .fetch_one(conn)
        .await
        .map_err(|e| db_error("checking role", e))
}

/// Menus, modules and the role's rows through one connection, so inside a
/// transaction they all come from the same snapshot.
async fn load_snapshot_in(conn: &mut PgConnection, role_id: RoleId) -> Result<AccessSnapshot, DomainError> {
    if !role_exists(conn, role_id).await? {
        return Err(DomainError::RoleNotFound(role_id));
    }

    let menus = load_menus(conn, None).await?;
    let modules = load_modules(conn).await?;
    let rows: Vec<AssignmentRow> = sqlx::query_as(
        r#"
        SELECT role_id, menu_id, selected, target_module_id
        FROM role_menu_assignments
        WHERE role_id = $1
        ORDER BY menu_id
        "#,
    )
    .bind(role_id)
    .fetch_all(conn)
    .await
    .map_err(|e| db_error("loading role assignments", e))?;

    Ok(AccessSnapshot::new(
        role_id,
        menus,
        modules,
        rows.into_iter().map(Into::into).collect(),
    ))
}

/// Multi-row insert; with `upsert` an existing (role, menu) row is overwritten.
async fn insert_rows(
    conn: &mut PgConnection,
    rows: &[RoleMenuAssignment],
    upsert: bool,
) -> Result<(), DomainError> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO role_menu_assignments (role_id, menu_id, selected, target_module_id) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.role_id)
            .push_bind(row.menu_id)
            .push_bind(row.selected)
            .push_bind(row.placement.target());
    });
    if upsert {
        builder.push(
            " ON CONFLICT (role_id, menu_id) DO UPDATE \
             SET selected = EXCLUDED.selected, target_module_id = EXCLUDED.target_module_id",
        );
    }

    builder
        .build()
        .execute(conn)
        .await
        .map_err(|e| db_error("writing role assignments", e))?;
    Ok(())
}

async fn delete_rows(conn: &mut PgConnection, role_id: RoleId, menu_ids: &[MenuId]) -> Result<(), DomainError> {
    if menu_ids.is_empty() {
        return Ok(());
    }
    sqlx::query("DELETE FROM role_menu_assignments WHERE role_id = $1 AND menu_id = ANY($2)")
        .bind(role_id)
        .bind(menu_ids)
        .execute(conn)
        .await
        .map_err(|e| db_error("deleting role assignments", e))?;
    Ok(())
}

#[async_trait]
impl AssignmentRepository for PgAssignmentRepository {
    async fn load_snapshot(&self, role_id: RoleId) -> Result<AccessSnapshot, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("beginning transaction", e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("setting snapshot isolation", e))?;

        let snapshot = load_snapshot_in(&mut tx, role_id).await?;
        tx.commit().await.map_err(|e| db_error("closing snapshot", e))?;

        Ok(snapshot)
    }

    async fn apply(&self, role_id: RoleId, planner: Planner) -> Result<AppliedChange, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("beginning transaction", e))?;
        advisory_lock_shared(&mut tx, HIERARCHY_LOCK_KEY).await?;
        advisory_lock(&mut tx, &role_lock_key(role_id)).await?;

        let snapshot = load_snapshot_in(&mut tx, role_id).await?;
        // A planner error drops `tx`, which rolls back.
        let plan = planner(&snapshot).inspect_err(|e| {
            warn!("Assignment change for role {} rejected: {}", role_id, e);
        })?;

        match &plan.write {
            AssignmentWrite::Replace(rows) => {
                sqlx::query("DELETE FROM role_menu_assignments WHERE role_id = $1")
                    .bind(role_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_error("clearing role assignments", e))?;
                insert_rows(&mut tx, rows, false).await?;
            }
            AssignmentWrite::Patch { upserts, deletes } => {
                delete_rows(&mut tx, role_id, deletes).await?;
                insert_rows(&mut tx, upserts, true).await?;
            }
        }

        tx.commit().await.map_err(|e| db_error("committing role assignments", e))?;

        let after = plan.write.apply_to(&snapshot.rows);
        debug!("Role {} now has {} assignment row(s)", role_id, after.len());

        Ok(AppliedChange {
            before: snapshot.row_list(),
            after,
            affected_groups: plan.affected_groups,
        })
    }
}
