//! Module entity. Modules form a flat, priority-ordered catalog.

use serde::{Deserialize, Serialize};

use menuacl_shared::ModuleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub alias: String,
    pub title: String,
    /// Higher priority lists first.
    pub priority: i32,
    pub is_enabled: bool,
}

impl Module {
    /// Registry order: priority descending, then id ascending.
    pub fn order_key(&self) -> (std::cmp::Reverse<i32>, ModuleId) {
        (std::cmp::Reverse(self.priority), self.id)
    }
}
