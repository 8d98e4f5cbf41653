//! Handlers for saved dashboards.
//!
//! Every route acts on the caller's own dashboard set. Writes require a
//! verified identity; the listing degrades to an empty map without one.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use classdash_core::dashboard::DashboardSet;
use classdash_core::widget::DashboardConfig;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::{Caller, MaybeCaller};
use crate::response::Success;
use crate::state::AppState;

/// Body for `POST /dashboards/{name}/rename`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameDashboardRequest {
    pub new_name: String,
}

/// GET /api/v1/dashboards
///
/// The caller's full name -> config map, unwrapped.
pub async fn list_dashboards(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let set = match caller {
        Some(caller) => state.dashboards.list_all(&caller.email).await?,
        None => DashboardSet::new(),
    };
    Ok(Json(set))
}

/// PUT /api/v1/dashboards/{name}
pub async fn save_dashboard(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(config): ApiJson<DashboardConfig>,
) -> AppResult<impl IntoResponse> {
    let name = state.dashboards.save(&caller.email, &name, config).await?;
    Ok(Json(Success::message(format!("Dashboard '{name}' saved"))))
}

/// DELETE /api/v1/dashboards/{name}
pub async fn delete_dashboard(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    state.dashboards.delete(&caller.email, &name).await?;
    Ok(Json(Success::message(format!("Dashboard '{name}' deleted"))))
}

/// POST /api/v1/dashboards/{name}/rename
pub async fn rename_dashboard(
    caller: Caller,
    State(state): State<AppState>,
    ApiPath(old_name): ApiPath<String>,
    ApiJson(input): ApiJson<RenameDashboardRequest>,
) -> AppResult<impl IntoResponse> {
    let new_name = state
        .dashboards
        .rename(&caller.email, &old_name, &input.new_name)
        .await?;
    Ok(Json(Success::message(format!(
        "Dashboard '{old_name}' renamed to '{new_name}'"
    ))))
}
