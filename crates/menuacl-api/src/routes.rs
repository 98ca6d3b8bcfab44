use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handlers::{assignments, health, menus, modules};
use crate::state::AppState;

/// Every route, with request ids and tracing. CORS is left to the binary.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/modules", get(modules::list_modules))
        .route("/modules/{id}", get(modules::get_module))
        .route("/menus", get(menus::list_menus).post(menus::create_menu))
        .route("/menus/tree", get(menus::menu_tree))
        .route(
            "/menus/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route(
            "/roles/{role_id}/menus",
            get(assignments::get_assignable_menus).put(assignments::replace_assignments),
        )
        .route("/roles/{role_id}/menus/save", post(assignments::save_selection))
        .route("/roles/{role_id}/menus/move", post(assignments::move_group))
        .route("/roles/{role_id}/menus/restore", post(assignments::restore_group))
        .route(
            "/roles/{role_id}/modules/{module_id}/restore",
            post(assignments::restore_all),
        )
        .route("/roles/{role_id}/navigation", get(assignments::role_navigation));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
