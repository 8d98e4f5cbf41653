//! Identity extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classdash_core::error::CoreError;

use crate::auth::identity::verified_email;
use crate::error::AppError;
use crate::state::AppState;

/// Caller with a verified email, taken from an identity-provider Bearer
/// token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(caller: Caller) -> AppResult<Json<()>> {
///     tracing::info!(email = %caller.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller {
    /// Lowercased, trimmed email.
    pub email: String,
}

/// Optional identity. Missing, malformed, or unverified tokens all yield `None`.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Caller>);

fn unauthenticated(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthenticated(msg.into()))
}

fn caller_from_parts(parts: &Parts, state: &AppState) -> Result<Caller, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthenticated("Missing Authorization header"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        unauthenticated("Invalid Authorization format. Expected: Bearer <token>")
    })?;

    let email = verified_email(token, &state.config.identity)
        .map_err(|_| unauthenticated("Invalid or expired identity token"))?
        .ok_or_else(|| unauthenticated("Email address is not verified"))?;

    Ok(Caller { email })
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts, state)
    }
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(caller_from_parts(parts, state).ok()))
    }
}
