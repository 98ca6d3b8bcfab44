// ============================================================================
// Menu ACL API - Menu Handlers
// File: crates/menuacl-api/src/handlers/menus.rs
// ============================================================================

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use menuacl_core::domain::{MenuDraft, MenuNode};
use menuacl_core::MenuTreeNode;
use menuacl_shared::MenuId;

use crate::dto::DeletedResponse;
use crate::error::ApiError;
use crate::extract::{ActingOperator, AppJson, AppPath, PartitionQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Without `partition` every live menu is returned.
pub async fn list_menus(
    State(state): State<AppState>,
    Query(query): Query<PartitionQuery>,
) -> Result<Json<ApiResponse<Vec<MenuNode>>>, ApiError> {
    let menus = state.menus.list(query.partition.as_deref()).await?;
    Ok(Json(ApiResponse::success(menus)))
}

pub async fn menu_tree(
    State(state): State<AppState>,
    Query(query): Query<PartitionQuery>,
) -> Result<Json<ApiResponse<Vec<MenuTreeNode>>>, ApiError> {
    let tree = state.menus.tree(query.partition_or_default()).await?;
    Ok(Json(ApiResponse::success(tree)))
}

pub async fn get_menu(
    State(state): State<AppState>,
    AppPath(id): AppPath<MenuId>,
) -> Result<Json<ApiResponse<MenuNode>>, ApiError> {
    let menu = state.menus.get(id).await?;
    Ok(Json(ApiResponse::success(menu)))
}

pub async fn create_menu(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppJson(draft): AppJson<MenuDraft>,
) -> Result<(StatusCode, Json<ApiResponse<MenuNode>>), ApiError> {
    let menu = state.menus.create(operator, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(menu))))
}

pub async fn update_menu(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(id): AppPath<MenuId>,
    AppJson(draft): AppJson<MenuDraft>,
) -> Result<Json<ApiResponse<MenuNode>>, ApiError> {
    let menu = state.menus.update(operator, id, draft).await?;
    Ok(Json(ApiResponse::success(menu)))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    ActingOperator(operator): ActingOperator,
    AppPath(id): AppPath<MenuId>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state.menus.delete(operator, id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse { id })))
}
