use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::content::AggregationError;

/// An error returned to HTTP clients as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    /// Maps a pipeline failure onto a response. Internal details are logged
    /// here and replaced with `internal_message` for the client.
    pub fn from_aggregation(err: AggregationError, internal_message: &str) -> Self {
        match err {
            AggregationError::Validation(message) => ApiError::BadRequest(message),
            AggregationError::NotFound => ApiError::NotFound(err.to_string()),
            AggregationError::Upstream(_) | AggregationError::Persistence(_) => {
                error!("{}: {}", internal_message, err);
                ApiError::Internal(internal_message.to_string())
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m,
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
