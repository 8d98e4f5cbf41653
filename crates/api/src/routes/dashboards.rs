//! Route definitions for saved dashboards.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::dashboards;
use crate::state::AppState;

/// Routes mounted at `/dashboards`.
///
/// ```text
/// GET     /                -> list_dashboards
/// PUT     /{name}          -> save_dashboard
/// DELETE  /{name}          -> delete_dashboard
/// POST    /{name}/rename   -> rename_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboards::list_dashboards))
        .route(
            "/{name}",
            put(dashboards::save_dashboard).delete(dashboards::delete_dashboard),
        )
        .route("/{name}/rename", post(dashboards::rename_dashboard))
}
