//! HTTP-level integration tests for saved dashboards.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get, get_auth, post_json_auth, put_json, put_json_auth, token_for,
};
use serde_json::json;

const TEACHER: &str = "teacher@school.org";

fn math_board() -> serde_json::Value {
    json!({
        "widgets": [
            {"id": "w1", "type": "counter", "allowInteraction": true, "data": {"n": 1}}
        ],
        "bg": "#abc"
    })
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_without_identity_is_empty_map() {
    let app = common::build_test_app();
    let response = get(&app, "/api/v1/dashboards").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn list_returns_saved_configs_by_name() {
    let app = common::build_test_app();
    let token = token_for(TEACHER);

    let response = put_json_auth(&app, "/api/v1/dashboards/Math", &token, math_board()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    put_json_auth(
        &app,
        "/api/v1/dashboards/Period%202",
        &token,
        json!({"widgets": []}),
    )
    .await;

    let json = body_json(get_auth(&app, "/api/v1/dashboards", &token).await).await;
    assert_eq!(json["Math"], math_board());
    assert_eq!(json["Period 2"], json!({"widgets": []}));
}

#[tokio::test]
async fn dashboards_are_scoped_to_caller() {
    let app = common::build_test_app();
    put_json_auth(&app, "/api/v1/dashboards/Math", &token_for(TEACHER), math_board()).await;

    let other = token_for("someone@school.org");
    let json = body_json(get_auth(&app, "/api/v1/dashboards", &other).await).await;
    assert_eq!(json, json!({}));
}

#[tokio::test]
async fn email_case_does_not_split_ownership() {
    let app = common::build_test_app();
    put_json_auth(&app, "/api/v1/dashboards/Math", &token_for(TEACHER), math_board()).await;

    let shouting = token_for("Teacher@School.ORG");
    let json = body_json(get_auth(&app, "/api/v1/dashboards", &shouting).await).await;
    assert_eq!(json["Math"], math_board());
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_requires_identity() {
    let app = common::build_test_app();
    let response = put_json(&app, "/api/v1/dashboards/Math", math_board()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = common::build_test_app();
    let response =
        put_json_auth(&app, "/api/v1/dashboards/Math", "not-a-jwt", math_board()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = common::build_test_app();
    let response =
        put_json_auth(&app, "/api/v1/dashboards/%20%20", &token_for(TEACHER), math_board())
            .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn delete_removes_entry_and_missing_is_404() {
    let app = common::build_test_app();
    let token = token_for(TEACHER);
    put_json_auth(&app, "/api/v1/dashboards/Math", &token, math_board()).await;

    let response = delete_auth(&app, "/api/v1/dashboards/Math", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(&app, "/api/v1/dashboards", &token).await).await;
    assert_eq!(json, json!({}));

    let response = delete_auth(&app, "/api/v1/dashboards/Math", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_moves_config_and_refuses_existing_target() {
    let app = common::build_test_app();
    let token = token_for(TEACHER);
    put_json_auth(&app, "/api/v1/dashboards/A", &token, math_board()).await;
    put_json_auth(&app, "/api/v1/dashboards/B", &token, json!({"widgets": []})).await;

    let response = post_json_auth(
        &app,
        "/api/v1/dashboards/A/rename",
        &token,
        json!({"newName": "B"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        &app,
        "/api/v1/dashboards/A/rename",
        &token,
        json!({"newName": "C"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(&app, "/api/v1/dashboards", &token).await).await;
    assert!(json.get("A").is_none());
    assert_eq!(json["C"], math_board());
    assert_eq!(json["B"], json!({"widgets": []}));
}

#[tokio::test]
async fn rename_of_missing_dashboard_is_404() {
    let app = common::build_test_app();
    let response = post_json_auth(
        &app,
        "/api/v1/dashboards/Ghost/rename",
        &token_for(TEACHER),
        json!({"newName": "Real"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn padded_names_resolve_to_the_same_dashboard() {
    let app = common::build_test_app();
    let token = token_for(TEACHER);
    put_json_auth(&app, "/api/v1/dashboards/%20Math", &token, math_board()).await;

    let json = body_json(get_auth(&app, "/api/v1/dashboards", &token).await).await;
    assert_eq!(json["Math"], math_board());

    let response = delete_auth(&app, "/api/v1/dashboards/%20Math", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get_auth(&app, "/api/v1/dashboards", &token).await).await;
    assert_eq!(json, json!({}));
}

#[tokio::test]
async fn mistyped_body_gets_json_error_envelope() {
    let app = common::build_test_app();
    let response = put_json_auth(
        &app,
        "/api/v1/dashboards/Math",
        &token_for(TEACHER),
        json!({"widgets": [{"allowInteraction": true}]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}
