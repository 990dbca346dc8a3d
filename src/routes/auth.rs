// SPDX-License-Identifier: MIT

//! GitHub OAuth authentication routes.
//!
//! Flow: `/auth/github` redirects to GitHub; the callback exchanges the code
//! for a profile, finds or creates the user, and issues a session cookie.
//! Any callback failure redirects to the frontend's login-failure page, never
//! a silent success.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::models::User;
use crate::services::SessionInfo;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/github", get(auth_start))
        .route("/auth/github/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
        .route("/check-session", get(check_session))
}

/// Routes that require an authenticated session (layered in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(profile))
}

/// Derive the externally visible callback URL from the Host header.
fn callback_url(headers: &axum::http::HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/github/callback", scheme, host)
}

/// Start OAuth flow - redirect to GitHub authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let callback = callback_url(&headers);
    let auth_url = state
        .github
        .authorize_url(&callback, &state.config.frontend_url)?;

    tracing::info!(
        client_id = %state.config.github_client_id,
        callback = %callback,
        "Starting OAuth flow, redirecting to GitHub"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a profile, find-or-create the user,
/// issue a session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    // Decode and verify the frontend URL from the state parameter
    let frontend_url = params
        .state
        .as_deref()
        .and_then(|s| state.github.verify_state(s))
        .unwrap_or_else(|| {
            tracing::warn!("Invalid or missing state parameter, falling back to default frontend URL");
            state.config.frontend_url.clone()
        });

    // Provider-reported errors (user denied access, etc.)
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from GitHub");
        return (jar, failure_redirect(&frontend_url, &error));
    }

    let Some(code) = params.code else {
        tracing::warn!("OAuth callback without authorization code");
        return (jar, failure_redirect(&frontend_url, "missing_code"));
    };

    match complete_auth(&state, &code).await {
        Ok((user, token)) => {
            tracing::info!(
                provider_id = %user.provider_id,
                username = %user.username,
                "OAuth successful, session issued"
            );

            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.config.secure_cookies)
                .max_age(time::Duration::hours(state.config.session_ttl_hours))
                .build();

            let redirect = format!("{}/profile", frontend_url);
            (jar.add(cookie), Redirect::temporary(&redirect))
        }
        Err(e) => {
            tracing::error!(error = %e, "OAuth callback failed");
            (jar, failure_redirect(&frontend_url, "login_failed"))
        }
    }
}

/// The callback's fallible core: code exchange, profile fetch,
/// find-or-create, session issuance.
async fn complete_auth(state: &AppState, code: &str) -> Result<(User, String)> {
    let access_token = state.github.exchange_code(code).await?;
    let profile = state.github.fetch_profile(&access_token).await?;
    let user = state.github.find_or_create_user(&profile).await?;
    let token = state.sessions.issue(&user)?;
    Ok((user, token))
}

fn failure_redirect(frontend_url: &str, error: &str) -> Redirect {
    let url = format!(
        "{}/login-failure?error={}",
        frontend_url,
        urlencoding::encode(error)
    );
    Redirect::temporary(&url)
}

/// Logout - destroy the session and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.revoke(cookie.value());
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    let frontend = state.config.frontend_url.clone();
    (jar.remove(removal), Redirect::temporary(&frontend))
}

/// Diagnostics response for `/check-session`.
#[derive(Serialize)]
pub struct CheckSessionResponse {
    pub authenticated: bool,
    pub user: Option<User>,
    pub session: Option<SessionInfo>,
}

/// Report whether the request carries a live session (public diagnostics).
async fn check_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Json<CheckSessionResponse> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let user = match &token {
        Some(token) => match state.sessions.resolve(token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(error = %e, "Store failure during session check");
                None
            }
        },
        None => None,
    };

    let session = match (&user, &token) {
        (Some(_), Some(token)) => state.sessions.session_info(token),
        _ => None,
    };

    Json(CheckSessionResponse {
        authenticated: user.is_some(),
        user,
        session,
    })
}

/// Profile response for the authenticated user.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: User,
}

/// Current user's profile (protected).
async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: "Welcome to your profile!".to_string(),
        user,
    })
}
