// SPDX-License-Identifier: MIT

//! Theme CRUD route tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use profile_hub::models::{Role, Theme};
use tower::ServiceExt;

mod common;

fn sample_theme(name: &str) -> Theme {
    Theme {
        theme_name: name.to_string(),
        color: "#336699".to_string(),
        layout: "grid".to_string(),
        font_family: Some("monospace".to_string()),
        font_size: Some(14),
    }
}

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
async fn list_and_get_themes_public() {
    let (app, state) = common::create_test_app();
    state.db.insert_theme(&sample_theme("dark")).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/themes")
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
                .uri("/themes/dark")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["color"], "#336699");
}

#[tokio::test]
async fn get_unknown_theme_is_404() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/themes/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn theme_writes_require_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/themes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "theme_name": "dark",
                        "color": "#000000",
                        "layout": "grid"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_theme_authenticated() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/themes",
            &cookie,
            serde_json::json!({
                "theme_name": "dark",
                "color": "#000000",
                "layout": "full-width",
                "font_size": 16
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["theme_name"], "dark");

    assert!(state.db.find_theme("dark").await.unwrap().is_some());
}

#[tokio::test]
async fn create_theme_with_invalid_color_is_422() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/themes",
            &cookie,
            serde_json::json!({
                "theme_name": "dark",
                "color": "black",
                "layout": "grid"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_theme_is_409() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;
    state.db.insert_theme(&sample_theme("dark")).await.unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/themes",
            &cookie,
            serde_json::json!({
                "theme_name": "dark",
                "color": "#000000",
                "layout": "grid"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_theme_partial() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;
    state.db.insert_theme(&sample_theme("dark")).await.unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/themes/dark",
            &cookie,
            serde_json::json!({"color": "#FFFFFF"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["color"], "#FFFFFF");
    // Layout untouched
    assert_eq!(body["layout"], "grid");
}

#[tokio::test]
async fn update_theme_empty_body_is_400() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;
    state.db.insert_theme(&sample_theme("dark")).await.unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/themes/dark",
            &cookie,
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_theme_roundtrip() {
    let (app, state) = common::create_test_app();
    let cookie = common::login(&state, &common::sample_user("gh-1", "alice", Role::User)).await;
    state.db.insert_theme(&sample_theme("dark")).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/themes/dark")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.db.find_theme("dark").await.unwrap().is_none());

    // Second delete: gone
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/themes/dark")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
