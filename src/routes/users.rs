// SPDX-License-Identifier: MIT

//! User CRUD routes.
//!
//! Reads are public; writes require an authenticated session, and deletion
//! is an explicit administrative operation. OAuth is the sole authentication
//! path, so none of these payloads carry credentials.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{username}", get(get_user))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{username}", put(update_user))
}

/// Deletion is admin-only (layered with `require_admin` in routes/mod.rs).
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/{username}", delete(delete_user))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.db.list_users().await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<User>> {
    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found with username: {}", username)))?;

    Ok(Json(user))
}

#[derive(Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "username must be at least 3 characters long"))]
    pub username: String,
    pub display_name: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub theme_name: Option<String>,
    pub info: Option<serde_json::Value>,
}

/// Create a user document directly (no OAuth identity involved).
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = chrono::Utc::now().to_rfc3339();
    let user = User {
        // Manually created users get a synthetic identity distinct from any
        // provider-issued one.
        provider_id: format!("local-{}", payload.username),
        username: payload.username,
        display_name: payload.display_name,
        email: payload.email,
        avatar_url: payload.avatar_url,
        role: Role::User,
        theme_name: payload.theme_name,
        info: payload.info,
        created_at: now.clone(),
        last_login: now,
    };

    state.db.insert_user(&user).await?;
    tracing::info!(username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserPayload {
    pub display_name: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub theme_name: Option<String>,
    pub info: Option<serde_json::Value>,
}

impl UpdateUserPayload {
    fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.avatar_url.is_none()
            && self.theme_name.is_none()
            && self.info.is_none()
    }
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest(
            "Update data cannot be empty.".to_string(),
        ));
    }

    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found with username: {}", username)))?;

    if let Some(display_name) = payload.display_name {
        user.display_name = Some(display_name);
    }
    if let Some(email) = payload.email {
        user.email = Some(email);
    }
    if let Some(avatar_url) = payload.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    if let Some(theme_name) = payload.theme_name {
        user.theme_name = Some(theme_name);
    }
    if let Some(info) = payload.info {
        user.info = Some(info);
    }

    state.db.update_user(&user).await?;
    tracing::info!(username = %user.username, "User updated");

    Ok(Json(user))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found with username: {}", username)))?;

    state.db.delete_user(&user.provider_id).await?;
    tracing::info!(username = %username, "User deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}
