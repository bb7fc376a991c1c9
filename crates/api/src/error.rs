use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::error::CoreError;
use serde_json::json;

/// Error returned by every HTTP handler.
///
/// Domain failures arrive as [`CoreError`]; the remaining variants are raised
/// by the HTTP layer itself. Rendered as `{ "error": message, "code": CODE }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed query parameters or request values.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Something addressed by URL or version number rather than id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(CoreError::ConcurrencyConflict { .. } | CoreError::Conflict(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Core(CoreError::NotFound { .. }) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Core(CoreError::Validation(_)) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Core(CoreError::Internal(_)) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code. A lost optimistic-lock race has its own
    /// code so clients can reload and retry instead of reporting a clash.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Core(CoreError::ConcurrencyConflict { .. }) => "CONCURRENCY_CONFLICT",
            AppError::Core(CoreError::Conflict(_)) => "CONFLICT",
            AppError::Core(CoreError::NotFound { .. }) | AppError::NotFound(_) => "NOT_FOUND",
            AppError::Core(CoreError::Validation(_)) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Core(CoreError::Internal(_)) | AppError::InternalError(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Client-facing message. Internal details are logged, never returned.
    fn message(&self) -> String {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            AppError::Core(CoreError::Validation(msg) | CoreError::Conflict(msg))
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Core(core @ CoreError::ConcurrencyConflict { .. }) => core.to_string(),
            AppError::Core(CoreError::Internal(msg)) | AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Request failed with an internal error");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}
