use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use classdash_core::error::CoreError;
use classdash_db::store::StoreError;
use serde_json::json;

/// Application-level error type for engines and HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for row store
/// failures. Implements [`IntoResponse`] so every failure reaches the caller
/// as the same `{ "success": false, "message", "code" }` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `classdash_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The row store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Ended sessions additionally report `active: false` so clients can
        // tell "was terminated" from "never existed".
        let mut ended = false;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Unauthenticated(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
                }
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::FORBIDDEN, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::SessionPaused => (
                    StatusCode::CONFLICT,
                    "SESSION_PAUSED",
                    "Session is paused".to_string(),
                ),
                CoreError::SessionEnded { code } => {
                    ended = true;
                    (
                        StatusCode::GONE,
                        "SESSION_ENDED",
                        format!("Session {code} has ended"),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Row store errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Row store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "Storage is currently unavailable".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = if ended {
            json!({
                "success": false,
                "active": false,
                "message": message,
                "code": code,
            })
        } else {
            json!({
                "success": false,
                "message": message,
                "code": code,
            })
        };

        (status, axum::Json(body)).into_response()
    }
}
