use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResponse;
use crate::store::StoreError;

pub const UNEXPECTED_ERROR: &str = "Unexpected server error";

/// Failures reported by the task service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input broke one or more rules; nothing was written.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Task not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Anything a task handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Service(ServiceError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Service(ServiceError::NotFound) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Service(ServiceError::Storage(e)) => {
                tracing::error!(error = %e, "storage failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR.to_string())
            }
            ApiError::Body(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}
