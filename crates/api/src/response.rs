//! Shared response envelope types for API handlers.
//!
//! Successful responses are `{ "success": true, ...fields }`. Failures are
//! produced by [`crate::error::AppError`] with `success: false`.

use serde::Serialize;

/// Standard success envelope.
///
/// Flattens the payload's fields next to `success`.
///
/// # Example
///
/// ```ignore
/// Ok(Json(Success::new(CodeBody { code })))
/// ```
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

/// `{ "success": true, "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl Success<MessageBody> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(MessageBody {
            message: message.into(),
        })
    }
}

/// Body with no fields beyond `success`.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl Success<Empty> {
    pub fn ok() -> Self {
        Self::new(Empty {})
    }
}
