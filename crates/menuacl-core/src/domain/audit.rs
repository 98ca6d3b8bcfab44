//! Audit entries handed to the write-only audit sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use menuacl_shared::{Operator, RoleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    MenuCreated,
    MenuUpdated,
    MenuDeleted,
    AssignmentsReplaced,
    GroupMoved,
    GroupRestored,
    ModuleRestored,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::MenuCreated => "menu_created",
            AuditAction::MenuUpdated => "menu_updated",
            AuditAction::MenuDeleted => "menu_deleted",
            AuditAction::AssignmentsReplaced => "assignments_replaced",
            AuditAction::GroupMoved => "group_moved",
            AuditAction::GroupRestored => "group_restored",
            AuditAction::ModuleRestored => "module_restored",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub operator: Operator,
    pub action: AuditAction,
    pub role_id: Option<RoleId>,
    /// Human-readable subject, e.g. `menu:12` or `role:7`.
    pub subject: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new<B, A>(
        operator: Operator,
        action: AuditAction,
        role_id: Option<RoleId>,
        subject: impl Into<String>,
        before: &B,
        after: &A,
    ) -> Self
    where
        B: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        Self {
            id: Uuid::new_v4(),
            operator,
            action,
            role_id,
            subject: subject.into(),
            before: serde_json::to_value(before).unwrap_or(serde_json::Value::Null),
            after: serde_json::to_value(after).unwrap_or(serde_json::Value::Null),
            recorded_at: Utc::now(),
        }
    }
}
