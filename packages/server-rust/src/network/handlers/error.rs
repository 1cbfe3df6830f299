//! Mapping of service failures onto HTTP responses.
//!
//! | failure                  | status | body                                  |
//! |--------------------------|--------|---------------------------------------|
//! | `ServiceError::NotSaved` | 422    | `{"errors": {"fields": {...}}}`       |
//! | `ServiceError::NotFound` | 404    | `{"errors": {"message": "..."}}`      |
//! | malformed JSON body      | 400    | `{"errors": {"message": "..."}}`      |
//! | `ServiceError::Storage`  | 500    | generic message, details only logged  |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::service::ServiceError;
use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("malformed request body: {0}")]
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Service(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Service(ServiceError::NotSaved { errors }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": { "fields": errors } }),
            ),
            Self::Service(err @ ServiceError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                json!({ "errors": { "message": err.to_string() } }),
            ),
            Self::Service(ServiceError::Storage(source)) => {
                error!(error = %source, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "errors": { "message": "internal server error" } }),
                )
            }
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "errors": { "message": format!("malformed request body: {message}") } }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
