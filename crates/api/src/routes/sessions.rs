//! Route definitions for live sessions.
//!
//! Teacher routes require a verified identity; student routes are open to
//! anyone holding the code.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST    /                                     -> create_session
/// GET     /active                               -> get_active_session
/// GET     /{code}                               -> get_session_data
/// PUT     /{code}                               -> update_session
/// POST    /{code}/join                          -> join_session
/// PUT     /{code}/paused                        -> set_session_paused
/// POST    /{code}/end                           -> end_session
/// PUT     /{code}/widgets/{widget_id}/state     -> update_widget_state
/// POST    /{code}/polls/{widget_id}             -> submit_poll_response
/// POST    /{code}/screenshots                   -> submit_screenshot
/// GET     /{code}/screenshots                   -> get_screenshots
/// DELETE  /{code}/screenshots                   -> clear_screenshots
/// POST    /{code}/screenshots/request           -> request_screenshots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create_session))
        .route("/active", get(sessions::get_active_session))
        .route(
            "/{code}",
            get(sessions::get_session_data).put(sessions::update_session),
        )
        .route("/{code}/join", post(sessions::join_session))
        .route("/{code}/paused", put(sessions::set_session_paused))
        .route("/{code}/end", post(sessions::end_session))
        .route(
            "/{code}/widgets/{widget_id}/state",
            put(sessions::update_widget_state),
        )
        .route("/{code}/polls/{widget_id}", post(sessions::submit_poll_response))
        .route(
            "/{code}/screenshots",
            post(sessions::submit_screenshot)
                .get(sessions::get_screenshots)
                .delete(sessions::clear_screenshots),
        )
        .route(
            "/{code}/screenshots/request",
            post(sessions::request_screenshots),
        )
}
