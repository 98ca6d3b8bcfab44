// ============================================================================
// Menu ACL API - Role Menu Assignment Handlers
// File: crates/menuacl-api/src/handlers/assignments.rs
// Description: Assignable-menu view, navigation and the reassignment protocol
// ============================================================================

use axum::{
    extract::{Query, State},
    Json,
};

use menuacl_core::{AssignableMenus, RoleNavigation};
use menuacl_shared::{ModuleId, RoleId};

use crate::dto::{
    MoveGroupRequest, ReplaceAssignmentsRequest, RestoreAllResponse, RestoreGroupRequest,
    SaveSelectionRequest,
};
use crate::error::ApiError;
use crate::extract::{ActingOperator, AppJson, AppPath, PartitionQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

pub async fn get_assignable_menus(
    State(state): State<AppState>,
    AppPath(role_id): AppPath<RoleId>,
    Query(query): Query<PartitionQuery>,
) -> Result<Json<ApiResponse<AssignableMenus>>, ApiError> {
    let view = state
        .access
        .get_assignable_menus(role_id, query.partition_or_default())
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn role_navigation(
    State(state): State<AppState>,
    AppPath(role_id): AppPath<RoleId>,
    Query(query): Query<PartitionQuery>,
) -> Result<Json<ApiResponse<RoleNavigation>>, ApiError> {
    let nav = state
        .access
        .role_navigation(role_id, query.partition_or_default())
        .await?;
    Ok(Json(ApiResponse::success(nav)))
}

/// Body ids become the role's full selection; the map decides placement.
pub async fn replace_assignments(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(role_id): AppPath<RoleId>,
    AppJson(req): AppJson<ReplaceAssignmentsRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .access
        .replace_assignments(operator, role_id, req.menu_ids, req.menu_move_map)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn save_selection(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(role_id): AppPath<RoleId>,
    Query(query): Query<PartitionQuery>,
    AppJson(req): AppJson<SaveSelectionRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .access
        .save_selection(
            operator,
            role_id,
            query.partition_or_default(),
            req.checked_menu_ids,
            req.menu_move_map,
        )
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn move_group(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(role_id): AppPath<RoleId>,
    AppJson(req): AppJson<MoveGroupRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .access
        .move_group(operator, role_id, req.menu_ids, req.target_module_id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn restore_group(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(role_id): AppPath<RoleId>,
    AppJson(req): AppJson<RestoreGroupRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .access
        .restore_group(operator, role_id, req.menu_ids)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn restore_all(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath((role_id, module_id)): AppPath<(RoleId, ModuleId)>,
) -> Result<Json<ApiResponse<RestoreAllResponse>>, ApiError> {
    let restored_count = state.access.restore_all(operator, role_id, module_id).await?;
    Ok(Json(ApiResponse::success(RestoreAllResponse { restored_count })))
}
