use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("unauthorized identity: {0}")]
    UnauthorizedIdentity(String),

    #[error("persistence write failed: {0}")]
    PersistenceWriteFailed(String),

    #[error("persistence subscription failed: {0}")]
    PersistenceSubscriptionFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::InvalidSelection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PositionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnauthorizedIdentity(_) => StatusCode::FORBIDDEN,
            AppError::PersistenceWriteFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::PersistenceSubscriptionFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
