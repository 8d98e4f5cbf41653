#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Session is paused")]
    SessionPaused,

    #[error("Session {code} has ended")]
    SessionEnded { code: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
