pub mod dashboards;
pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboards                                      list (identity optional)
/// /dashboards/{name}                               save, delete
/// /dashboards/{name}/rename                        rename (POST)
///
/// /sessions                                        create (POST)
/// /sessions/active                                 caller's running session
/// /sessions/{code}                                 poll state, push structure
/// /sessions/{code}/join                            student join (POST)
/// /sessions/{code}/paused                          pause, resume (PUT)
/// /sessions/{code}/end                             end (POST)
/// /sessions/{code}/widgets/{widget_id}/state       student widget write (PUT)
/// /sessions/{code}/polls/{widget_id}               poll vote (POST)
/// /sessions/{code}/screenshots                     submit, list, clear
/// /sessions/{code}/screenshots/request             open a round (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dashboards", dashboards::router())
        .nest("/sessions", sessions::router())
}
