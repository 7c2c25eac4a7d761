use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::PipelineError;

#[derive(Debug)]
pub enum ApiError {
    /// A required query parameter is absent or blank.
    MissingParam {
        message: &'static str,
        usage: String,
    },
    Pipeline(PipelineError),
    /// The detached pipeline task panicked or was cancelled.
    Unexpected(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingParam { message, usage } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "usage": usage,
                })),
            )
                .into_response(),
            Self::Pipeline(err) => {
                let status = err.status();
                if status.is_server_error() {
                    tracing::error!(%status, error = %err, "pipeline failed");
                } else {
                    tracing::warn!(%status, error = %err, "upstream rejected request");
                }
                (status, Json(json!({ "detail": err.detail() }))).into_response()
            }
            Self::Unexpected(msg) => {
                tracing::error!(error = %msg, "pipeline task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": format!("Unexpected error: {msg}") })),
                )
                    .into_response()
            }
        }
    }
}
