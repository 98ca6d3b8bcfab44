use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    backend: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// 503 when the store does not answer.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let backend = state.health.backend().to_string();
    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse { status: "ready".to_string(), backend }),
        ),
        Err(e) => {
            tracing::error!("Readiness check failed on {} store: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse { status: "unavailable".to_string(), backend }),
            )
        }
    }
}
