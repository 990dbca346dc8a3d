// SPDX-License-Identifier: MIT

use profile_hub::config::Config;
use profile_hub::db::DocumentDb;
use profile_hub::models::{Role, User};
use profile_hub::routes::create_router;
use profile_hub::services::{GithubService, SessionService};
use profile_hub::AppState;
use std::sync::Arc;

/// Create a test app over the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = DocumentDb::new_memory();
    let sessions = SessionService::new(db.clone(), config.session_ttl_hours);
    let github = GithubService::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.oauth_state_key.clone(),
        db.clone(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
        github,
    });

    (create_router(state.clone()), state)
}

/// Build a user document for tests.
#[allow(dead_code)]
pub fn sample_user(provider_id: &str, username: &str, role: Role) -> User {
    User {
        provider_id: provider_id.to_string(),
        username: username.to_string(),
        display_name: Some(format!("{} Display", username)),
        email: Some(format!("{}@example.com", username)),
        avatar_url: None,
        role,
        theme_name: None,
        info: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        last_login: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Persist a user and open a session for it.
/// Returns the value for a `Cookie` request header.
#[allow(dead_code)]
pub async fn login(state: &AppState, user: &User) -> String {
    state.db.insert_user(user).await.expect("insert user");
    let token = state.sessions.issue(user).expect("issue session");
    format!("hub_session={}", token)
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}
