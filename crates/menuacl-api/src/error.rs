//! Error → HTTP mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use menuacl_core::{DomainError, ErrorKind};

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing or invalid operator header")]
    MissingOperator,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Structural => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Domain(err) => {
                let kind = err.kind();
                if kind == ErrorKind::Infrastructure {
                    tracing::error!("Request failed: {}", err);
                } else {
                    tracing::warn!("Request rejected: {}", err);
                }
                (status_of(kind), kind.as_str(), err.to_string())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::MissingOperator => {
                tracing::warn!("Mutating request without operator header");
                (
                    StatusCode::BAD_REQUEST,
                    "MISSING_OPERATOR",
                    "X-Operator-Id header with a numeric id is required".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (DomainError::RoleNotFound(1), StatusCode::NOT_FOUND),
            (DomainError::UnknownMenu(2), StatusCode::BAD_REQUEST),
            (DomainError::PartialGroup("1".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::MenuHasChildren(3), StatusCode::UNPROCESSABLE_ENTITY),
            (
                DomainError::MenuKeyAlreadyExists { partition: "admin".into(), key: "k".into() },
                StatusCode::CONFLICT,
            ),
            (DomainError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
        assert_eq!(ApiError::MissingOperator.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
