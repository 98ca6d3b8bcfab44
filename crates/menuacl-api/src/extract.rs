//! Request extractors

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Deserialize;

use menuacl_shared::constants::{DEFAULT_PARTITION, OPERATOR_HEADER};
use menuacl_shared::Operator;

use crate::error::ApiError;

/// JSON body whose rejection renders as an `ApiResponse` error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Path parameters with the same error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// The acting operator, read from the `X-Operator-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct ActingOperator(pub Operator);

impl<S> FromRequestParts<S> for ActingOperator
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(ApiError::MissingOperator)?;

        Ok(ActingOperator(Operator::new(id)))
    }
}

#[derive(Debug, Deserialize)]
pub struct PartitionQuery {
    pub partition: Option<String>,
}

impl PartitionQuery {
    pub fn partition_or_default(&self) -> &str {
        self.partition.as_deref().unwrap_or(DEFAULT_PARTITION)
    }
}
