use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Everything a handler can fail with. Wire shape is always
/// `{error, details?}`; NotFound never distinguishes wrong-owner from
/// absent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authorization header missing")]
    AuthMissing,
    #[error("Invalid token")]
    AuthInvalid(String),
    #[error("Access denied")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Upstream(&'static str),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::AuthMissing => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authorization header missing" }),
            ),
            ApiError::AuthInvalid(details) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid token", "details": details }),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "Access denied" })),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Upstream(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Store operation failed: {:#}", err);
        ApiError::Internal
    }
}
