use axum::{extract::State, Json};

use menuacl_core::domain::Module;
use menuacl_shared::ModuleId;

use crate::error::ApiError;
use crate::extract::AppPath;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Modules in display order (priority desc, then id).
pub async fn list_modules(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Module>>>, ApiError> {
    let modules = state.modules.list().await?;
    Ok(Json(ApiResponse::success(modules)))
}

pub async fn get_module(
    State(state): State<AppState>,
    AppPath(id): AppPath<ModuleId>,
) -> Result<Json<ApiResponse<Module>>, ApiError> {
    let module = state.modules.get(id).await?;
    Ok(Json(ApiResponse::success(module)))
}
