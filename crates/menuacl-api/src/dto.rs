//! Request / response bodies

use serde::{Deserialize, Serialize};

use menuacl_core::domain::MoveMap;
use menuacl_shared::{MenuId, ModuleId};

#[derive(Debug, Deserialize)]
pub struct ReplaceAssignmentsRequest {
    pub menu_ids: Vec<MenuId>,
    #[serde(default)]
    pub menu_move_map: MoveMap,
}

#[derive(Debug, Deserialize)]
pub struct SaveSelectionRequest {
    pub checked_menu_ids: Vec<MenuId>,
    #[serde(default)]
    pub menu_move_map: MoveMap,
}

#[derive(Debug, Deserialize)]
pub struct MoveGroupRequest {
    pub menu_ids: Vec<MenuId>,
    pub target_module_id: ModuleId,
}

#[derive(Debug, Deserialize)]
pub struct RestoreGroupRequest {
    pub menu_ids: Vec<MenuId>,
}

#[derive(Debug, Serialize)]
pub struct RestoreAllResponse {
    pub restored_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: MenuId,
}
