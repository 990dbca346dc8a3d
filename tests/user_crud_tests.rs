// SPDX-License-Identifier: MIT

//! User CRUD route tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use profile_hub::models::Role;
use tower::ServiceExt;

mod common;

fn json_request(method: &str, uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn list_and_get_users_public() {
    let (app, state) = common::create_test_app();
    state
        .db
        .insert_user(&common::sample_user("gh-1", "alice", Role::User))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["provider_id"], "gh-1");
}

#[tokio::test]
async fn get_unknown_user_is_404() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "manual"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_user_authenticated() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/users",
            &cookie,
            serde_json::json!({
                "username": "manual",
                "display_name": "Manual M",
                "email": "manual@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["username"], "manual");
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn create_user_with_short_username_is_422() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/users",
            &cookie,
            serde_json::json!({"username": "ab"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_user_with_bad_email_is_422() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/users",
            &cookie,
            serde_json::json!({"username": "manual", "email": "not-an-email"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_create_is_409() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let payload = serde_json::json!({"username": "manual"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/users", &cookie, payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/users", &cookie, payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_user_applies_partial_fields() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/alice",
            &cookie,
            serde_json::json!({"display_name": "Renamed", "theme_name": "dark"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["display_name"], "Renamed");
    assert_eq!(body["theme_name"], "dark");
    // Untouched fields survive
    assert_eq!(body["email"], "alice@example.com");

    let stored = state.db.find_user("gh-1").await.unwrap().unwrap();
    assert_eq!(stored.display_name.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn update_with_empty_body_is_400() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/alice",
            &cookie,
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_user_is_404() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/ghost",
            &cookie,
            serde_json::json!({"display_name": "Ghost"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_user_is_404_for_admin() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "root", Role::Admin)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/users/ghost")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
