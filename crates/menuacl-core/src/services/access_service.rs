// ============================================================================
// Menu ACL Core - Access Service
// File: crates/menuacl-core/src/services/access_service.rs
// Description: Role menu views and the reassignment protocol
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info};

use menuacl_shared::utils::is_valid_partition;
use menuacl_shared::{MenuId, ModuleId, Operator, RoleId};

use crate::domain::{AuditAction, AuditEntry, MoveMap};
use crate::error::DomainError;
use crate::grouping::{self, AssignableMenus, RoleNavigation};
use crate::reconcile::{self, AppliedChange};
use crate::repositories::{AssignmentRepository, AuditSink, Planner};
use crate::services::record_audit;
use crate::snapshot::AccessSnapshot;

pub struct AccessService {
    assignments: Arc<dyn AssignmentRepository>,
    audit: Arc<dyn AuditSink>,
}

impl AccessService {
    pub fn new(assignments: Arc<dyn AssignmentRepository>, audit: Arc<dyn AuditSink>) -> Self {
        Self { assignments, audit }
    }

    fn check_partition(partition: &str) -> Result<(), DomainError> {
        if is_valid_partition(partition) {
            Ok(())
        } else {
            Err(DomainError::ValidationError(format!("Invalid partition key: {}", partition)))
        }
    }

    /// Per-module grouped view plus the checklist state for one partition.
    pub async fn get_assignable_menus(
        &self,
        role_id: RoleId,
        partition: &str,
    ) -> Result<AssignableMenus, DomainError> {
        Self::check_partition(partition)?;
        let snapshot = self.assignments.load_snapshot(role_id).await?;
        Ok(grouping::assignable_menus(&snapshot, partition))
    }

    /// Menus the role can use, nested per displaying module.
    pub async fn role_navigation(&self, role_id: RoleId, partition: &str) -> Result<RoleNavigation, DomainError> {
        Self::check_partition(partition)?;
        let snapshot = self.assignments.load_snapshot(role_id).await?;
        Ok(grouping::role_navigation(&snapshot, partition))
    }

    pub async fn replace_assignments(
        &self,
        operator: Operator,
        role_id: RoleId,
        menu_ids: Vec<MenuId>,
        move_map: MoveMap,
    ) -> Result<(), DomainError> {
        let planner: Planner = Box::new(move |snapshot: &AccessSnapshot| {
            reconcile::plan_replace(snapshot, &menu_ids, &move_map)
        });
        self.mutate(operator, role_id, AuditAction::AssignmentsReplaced, planner).await?;
        Ok(())
    }

    /// Drops ids of moved-out groups from `checked_ids`, then replaces the
    /// role's rows in `partition`. Other partitions are left alone.
    pub async fn save_selection(
        &self,
        operator: Operator,
        role_id: RoleId,
        partition: &str,
        checked_ids: Vec<MenuId>,
        move_map: MoveMap,
    ) -> Result<(), DomainError> {
        Self::check_partition(partition)?;
        let partition = partition.to_string();
        let planner: Planner = Box::new(move |snapshot: &AccessSnapshot| {
            reconcile::plan_save(snapshot, &partition, &checked_ids, &move_map)
        });
        self.mutate(operator, role_id, AuditAction::AssignmentsReplaced, planner).await?;
        Ok(())
    }

    pub async fn move_group(
        &self,
        operator: Operator,
        role_id: RoleId,
        menu_ids: Vec<MenuId>,
        target_module_id: ModuleId,
    ) -> Result<(), DomainError> {
        let planner: Planner = Box::new(move |snapshot: &AccessSnapshot| {
            reconcile::plan_move(snapshot, &menu_ids, target_module_id)
        });
        self.mutate(operator, role_id, AuditAction::GroupMoved, planner).await?;
        Ok(())
    }

    /// Idempotent: restoring a native group changes nothing.
    pub async fn restore_group(
        &self,
        operator: Operator,
        role_id: RoleId,
        menu_ids: Vec<MenuId>,
    ) -> Result<(), DomainError> {
        let planner: Planner = Box::new(move |snapshot: &AccessSnapshot| {
            reconcile::plan_restore(snapshot, &menu_ids)
        });
        self.mutate(operator, role_id, AuditAction::GroupRestored, planner).await?;
        Ok(())
    }

    /// Returns how many groups were brought back from `module_id`.
    pub async fn restore_all(
        &self,
        operator: Operator,
        role_id: RoleId,
        module_id: ModuleId,
    ) -> Result<usize, DomainError> {
        let planner: Planner = Box::new(move |snapshot: &AccessSnapshot| {
            reconcile::plan_restore_all(snapshot, module_id)
        });
        let change = self.mutate(operator, role_id, AuditAction::ModuleRestored, planner).await?;
        Ok(change.affected_groups.len())
    }

    async fn mutate(
        &self,
        operator: Operator,
        role_id: RoleId,
        action: AuditAction,
        planner: Planner,
    ) -> Result<AppliedChange, DomainError> {
        let change = self.assignments.apply(role_id, planner).await?;

        // No-ops are still audited, with equal before and after.
        if change.is_noop() {
            debug!("{} for role {} changed nothing", action.as_str(), role_id);
        } else {
            info!(
                "{} for role {} by operator {}: {} rows -> {} rows, {} group(s)",
                action.as_str(),
                role_id,
                operator.id,
                change.before.len(),
                change.after.len(),
                change.affected_groups.len()
            );
        }
        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                operator,
                action,
                Some(role_id),
                format!("role:{}", role_id),
                &change.before,
                &change.after,
            ),
        )
        .await;

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::domain::menu_node::fixtures::node;
    use crate::domain::{GroupState, MenuType};
    use crate::registry::fixtures::module;
    use crate::repositories::audit_sink::MockAuditSink;

    const ROLE: RoleId = 7;
    const A: ModuleId = 1;
    const B: ModuleId = 2;

    struct StubAssignments {
        snapshot: Mutex<AccessSnapshot>,
    }

    #[async_trait]
    impl AssignmentRepository for StubAssignments {
        async fn load_snapshot(&self, role_id: RoleId) -> Result<AccessSnapshot, DomainError> {
            let snapshot = self.snapshot.lock().await;
            if snapshot.role_id != role_id {
                return Err(DomainError::RoleNotFound(role_id));
            }
            Ok(snapshot.clone())
        }

        async fn apply(&self, role_id: RoleId, planner: Planner) -> Result<AppliedChange, DomainError> {
            let mut snapshot = self.snapshot.lock().await;
            if snapshot.role_id != role_id {
                return Err(DomainError::RoleNotFound(role_id));
            }
            let plan = planner(&*snapshot)?;
            let before = snapshot.row_list();
            let after = plan.write.apply_to(&snapshot.rows);
            snapshot.rows = after.iter().map(|r| (r.menu_id, *r)).collect();
            Ok(AppliedChange { before, after, affected_groups: plan.affected_groups })
        }
    }

    /// Scenario fixture: directory 1 with children 2 and 3, all in module A.
    fn service(audit: MockAuditSink) -> AccessService {
        let menus = vec![
            node(1, 0, MenuType::Directory, Some(A)),
            node(2, 1, MenuType::Menu, Some(A)),
            node(3, 1, MenuType::Menu, Some(A)),
        ];
        let snapshot = AccessSnapshot::new(ROLE, menus, vec![module(A, 1), module(B, 2)], Vec::new());
        AccessService::new(
            Arc::new(StubAssignments { snapshot: Mutex::new(snapshot) }),
            Arc::new(audit),
        )
    }

    #[tokio::test]
    async fn test_move_and_restore_all_keep_checked_ids() {
        let mut audit = MockAuditSink::new();
        audit.expect_record().times(3).returning(|_| Ok(()));
        let service = service(audit);
        let op = Operator::new(42);

        service.replace_assignments(op, ROLE, vec![2], MoveMap::new()).await.unwrap();
        let initial = service.get_assignable_menus(ROLE, "admin").await.unwrap();

        service.move_group(op, ROLE, vec![1, 2, 3], B).await.unwrap();
        let moved = service.get_assignable_menus(ROLE, "admin").await.unwrap();
        let b = moved.modules_with_groups.iter().find(|m| m.module.id == B).unwrap();
        let a = moved.modules_with_groups.iter().find(|m| m.module.id == A).unwrap();
        assert_eq!(b.moved_in[0].state, GroupState::MovedIn);
        assert_eq!(a.moved_out[0].state, GroupState::MovedOut);
        assert_eq!(moved.checked_menu_ids, initial.checked_menu_ids);

        let restored = service.restore_all(op, ROLE, B).await.unwrap();
        assert_eq!(restored, 1);
        let after = service.get_assignable_menus(ROLE, "admin").await.unwrap();
        let a = after.modules_with_groups.iter().find(|m| m.module.id == A).unwrap();
        assert_eq!(a.native.len(), 1);
        assert!(after.menu_move_map.is_empty());
        assert_eq!(after.checked_menu_ids, initial.checked_menu_ids);
    }

    #[tokio::test]
    async fn test_noop_restore_is_audited_unchanged() {
        let mut audit = MockAuditSink::new();
        audit
            .expect_record()
            .withf(|entry| entry.before == entry.after)
            .times(2)
            .returning(|_| Ok(()));
        let service = service(audit);

        service.restore_group(Operator::system(), ROLE, vec![1, 2, 3]).await.unwrap();
        assert_eq!(service.restore_all(Operator::system(), ROLE, B).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_audit_sink_does_not_fail_the_change() {
        let mut audit = MockAuditSink::new();
        audit
            .expect_record()
            .times(1)
            .returning(|_| Err(DomainError::InternalError("sink down".into())));
        let service = service(audit);

        service.move_group(Operator::new(1), ROLE, vec![1, 2, 3], B).await.unwrap();
        let view = service.get_assignable_menus(ROLE, "admin").await.unwrap();
        assert_eq!(view.menu_move_map.get(&2), Some(&B));
    }

    #[tokio::test]
    async fn test_rejected_plan_writes_nothing() {
        let mut audit = MockAuditSink::new();
        audit.expect_record().never();
        let service = service(audit);

        let err = service
            .replace_assignments(Operator::new(1), ROLE, vec![2, 404], MoveMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownMenu(404)));

        let view = service.get_assignable_menus(ROLE, "admin").await.unwrap();
        assert!(view.checked_menu_ids.is_empty());

        let err = service.get_assignable_menus(8, "admin").await.unwrap_err();
        assert!(matches!(err, DomainError::RoleNotFound(8)));
        let err = service.get_assignable_menus(ROLE, "Not Valid").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_audit_entry_carries_before_and_after() {
        let mut audit = MockAuditSink::new();
        audit
            .expect_record()
            .withf(|entry| {
                entry.action == AuditAction::GroupMoved
                    && entry.role_id == Some(ROLE)
                    && entry.before == serde_json::json!([])
                    && entry.after.as_array().is_some_and(|rows| rows.len() == 3)
            })
            .times(1)
            .returning(|_| Ok(()));
        let service = service(audit);

        service.move_group(Operator::new(5), ROLE, vec![3, 2, 1], B).await.unwrap();
        let nav = service.role_navigation(ROLE, "admin").await.unwrap();
        assert_eq!(nav.modules.len(), 1);
        assert_eq!(nav.modules[0].module.id, B);
    }
}
