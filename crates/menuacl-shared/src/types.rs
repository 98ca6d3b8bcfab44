//! Common types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MenuId = i64;
pub type ModuleId = i64;
pub type RoleId = i64;
pub type OperatorId = i64;

/// The administrator performing a mutating call. Passed explicitly, never read
/// from ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
}

impl Operator {
    pub fn new(id: OperatorId) -> Self {
        Self { id }
    }

    /// Operator used by seeding and maintenance tasks.
    pub fn system() -> Self {
        Self { id: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<OperatorId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<OperatorId>,
}

impl AuditFields {
    pub fn created_by(operator: Operator) -> Self {
        Self {
            created_by: Some(operator.id),
            ..Self::default()
        }
    }

    pub fn touch(&mut self, operator: Operator) {
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(operator.id);
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
        }
    }
}
