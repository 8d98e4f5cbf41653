//! Handlers for live sessions.
//!
//! Teacher routes take a [`Caller`] and act only on the caller's own active
//! session. Student routes need nothing but the join code.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use classdash_core::session::{
    PollOption, PollTally, Screenshot, SessionState, ANONYMOUS_STUDENT,
};
use classdash_core::types::Timestamp;
use classdash_core::widget::DashboardConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::{Caller, MaybeCaller};
use crate::response::Success;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SetPausedRequest {
    pub paused: bool,
}

#[derive(Debug, Deserialize)]
pub struct PollVoteRequest {
    /// `"A"` or `"B"`; anything else is a validation error.
    pub option: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitScreenshotRequest {
    /// Encoded image, typically a data URL. Stored as given.
    pub image: String,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CodeBody {
    pub code: String,
}

/// `success` is `false` when the teacher has nothing running.
#[derive(Debug, Serialize)]
pub struct ActiveSessionBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionState>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    pub data: SessionState,
    pub teacher_email: String,
}

#[derive(Debug, Serialize)]
pub struct SessionDataBody {
    pub data: SessionState,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct PausedBody {
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct PollsBody {
    pub polls: PollTally,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRequestBody {
    pub requested_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ScreenshotsBody {
    pub screenshots: Vec<Screenshot>,
}

// ---------------------------------------------------------------------------
// Teacher lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
///
/// Start broadcasting `config`. Any session the teacher already runs ends.
pub async fn create_session(
    caller: Caller,
    State(state): State<AppState>,
    ApiJson(config): ApiJson<DashboardConfig>,
) -> AppResult<impl IntoResponse> {
    let code = state.sessions.create_session(&caller.email, config).await?;
    Ok((StatusCode::CREATED, Json(Success::new(CodeBody { code }))))
}

/// GET /api/v1/sessions/active
///
/// `{ success: false }` (200) when the teacher has no running session.
pub async fn get_active_session(
    caller: Caller,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let active = state.sessions.get_active_session(&caller.email).await?;
    Ok(Json(ActiveSessionBody {
        success: active.is_some(),
        code: active.as_ref().map(|a| a.code.clone()),
        data: active.map(|a| a.state),
    }))
}

/// PUT /api/v1/sessions/{code}
pub async fn update_session(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    ApiJson(config): ApiJson<DashboardConfig>,
) -> AppResult<impl IntoResponse> {
    state
        .sessions
        .update_session(&code, &caller.email, config)
        .await?;
    Ok(Json(Success::ok()))
}

/// PUT /api/v1/sessions/{code}/paused
pub async fn set_session_paused(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    ApiJson(input): ApiJson<SetPausedRequest>,
) -> AppResult<impl IntoResponse> {
    let paused = state
        .sessions
        .set_paused(&code, &caller.email, input.paused)
        .await?;
    Ok(Json(Success::new(PausedBody { paused })))
}

/// POST /api/v1/sessions/{code}/end
pub async fn end_session(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    state.sessions.end_session(&code, &caller.email).await?;
    Ok(Json(Success::message("Session ended")))
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{code}/join
pub async fn join_session(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let joined = state.sessions.join_session(&code).await?;
    Ok(Json(Success::new(JoinBody {
        data: joined.state,
        teacher_email: joined.teacher_email,
    })))
}

/// GET /api/v1/sessions/{code}
///
/// Polled by clients for live refresh.
pub async fn get_session_data(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.sessions.get_session_data(&code).await?;
    Ok(Json(Success::new(SessionDataBody { data, active: true })))
}

// ---------------------------------------------------------------------------
// Student writes
// ---------------------------------------------------------------------------

/// PUT /api/v1/sessions/{code}/widgets/{widget_id}/state
///
/// The request body is the widget's new `data` value.
pub async fn update_widget_state(
    State(state): State<AppState>,
    ApiPath((code, widget_id)): ApiPath<(String, String)>,
    ApiJson(data): ApiJson<Value>,
) -> AppResult<impl IntoResponse> {
    state
        .sessions
        .update_widget_state(&code, &widget_id, data)
        .await?;
    Ok(Json(Success::ok()))
}

/// POST /api/v1/sessions/{code}/polls/{widget_id}
pub async fn submit_poll_response(
    State(state): State<AppState>,
    ApiPath((code, widget_id)): ApiPath<(String, String)>,
    ApiJson(input): ApiJson<PollVoteRequest>,
) -> AppResult<impl IntoResponse> {
    let option: PollOption = input.option.parse()?;
    let polls = state
        .sessions
        .submit_poll_response(&code, &widget_id, option)
        .await?;
    Ok(Json(Success::new(PollsBody { polls })))
}

/// POST /api/v1/sessions/{code}/screenshots
///
/// Recorded under the caller's verified email when present.
pub async fn submit_screenshot(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    ApiJson(input): ApiJson<SubmitScreenshotRequest>,
) -> AppResult<impl IntoResponse> {
    let student = caller
        .map(|c| c.email)
        .unwrap_or_else(|| ANONYMOUS_STUDENT.to_string());
    state
        .sessions
        .submit_screenshot(&code, &student, input.image)
        .await?;
    Ok(Json(Success::ok()))
}

// ---------------------------------------------------------------------------
// Screenshot rounds (teacher)
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{code}/screenshots/request
pub async fn request_screenshots(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let requested_at = state
        .sessions
        .request_screenshots(&code, &caller.email)
        .await?;
    Ok(Json(Success::new(ScreenshotRequestBody { requested_at })))
}

/// GET /api/v1/sessions/{code}/screenshots
pub async fn get_screenshots(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let screenshots = state.sessions.get_screenshots(&code, &caller.email).await?;
    Ok(Json(Success::new(ScreenshotsBody { screenshots })))
}

/// DELETE /api/v1/sessions/{code}/screenshots
pub async fn clear_screenshots(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    state
        .sessions
        .clear_screenshots(&code, &caller.email)
        .await?;
    Ok(Json(Success::ok()))
}
