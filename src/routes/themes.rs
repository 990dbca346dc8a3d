// SPDX-License-Identifier: MIT

//! Theme CRUD routes. Reads are public, writes require authentication.

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
use crate::models::Theme;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/themes", get(list_themes))
        .route("/themes/{theme_name}", get(get_theme))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/themes", post(create_theme))
        .route("/themes/{theme_name}", put(update_theme))
        .route("/themes/{theme_name}", delete(delete_theme))
}

/// Hex color of the form #RRGGBB.
fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

async fn list_themes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Theme>>> {
    Ok(Json(state.db.list_themes().await?))
}

async fn get_theme(
    State(state): State<Arc<AppState>>,
    Path(theme_name): Path<String>,
) -> Result<Json<Theme>> {
    let theme = state
        .db
        .find_theme(&theme_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Theme not found with name: {}", theme_name)))?;

    Ok(Json(theme))
}

#[derive(Deserialize, Validate)]
pub struct CreateThemePayload {
    #[validate(length(min = 1, message = "theme name cannot be empty"))]
    pub theme_name: String,
    pub color: String,
    #[validate(length(min = 1, message = "layout cannot be empty"))]
    pub layout: String,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
}

async fn create_theme(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateThemePayload>,
) -> Result<(StatusCode, Json<Theme>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if !is_hex_color(&payload.color) {
        return Err(AppError::Validation(
            "color must be a valid hex code (e.g., #RRGGBB)".to_string(),
        ));
    }

    let theme = Theme {
        theme_name: payload.theme_name,
        color: payload.color,
        layout: payload.layout,
        font_family: payload.font_family,
        font_size: payload.font_size,
    };

    state.db.insert_theme(&theme).await?;
    tracing::info!(theme = %theme.theme_name, "Theme created");

    Ok((StatusCode::CREATED, Json(theme)))
}

#[derive(Deserialize, Validate)]
pub struct UpdateThemePayload {
    pub color: Option<String>,
    #[validate(length(min = 1, message = "layout cannot be empty"))]
    pub layout: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
}

async fn update_theme(
    State(state): State<Arc<AppState>>,
    Path(theme_name): Path<String>,
    Json(payload): Json<UpdateThemePayload>,
) -> Result<Json<Theme>> {
    if payload.color.is_none()
        && payload.layout.is_none()
        && payload.font_family.is_none()
        && payload.font_size.is_none()
    {
        return Err(AppError::BadRequest(
            "Update data cannot be empty.".to_string(),
        ));
    }

    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(color) = &payload.color {
        if !is_hex_color(color) {
            return Err(AppError::Validation(
                "color must be a valid hex code (e.g., #RRGGBB)".to_string(),
            ));
        }
    }

    let mut theme = state
        .db
        .find_theme(&theme_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Theme not found with name: {}", theme_name)))?;

    if let Some(color) = payload.color {
        theme.color = color;
    }
    if let Some(layout) = payload.layout {
        theme.layout = layout;
    }
    if let Some(font_family) = payload.font_family {
        theme.font_family = Some(font_family);
    }
    if let Some(font_size) = payload.font_size {
        theme.font_size = Some(font_size);
    }

    state.db.update_theme(&theme).await?;
    tracing::info!(theme = %theme.theme_name, "Theme updated");

    Ok(Json(theme))
}

async fn delete_theme(
    State(state): State<Arc<AppState>>,
    Path(theme_name): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !state.db.delete_theme(&theme_name).await? {
        return Err(AppError::NotFound(format!(
            "Theme not found with name: {}",
            theme_name
        )));
    }

    tracing::info!(theme = %theme_name, "Theme deleted");
    Ok(Json(serde_json::json!({
        "message": "Theme was deleted successfully."
    })))
}
