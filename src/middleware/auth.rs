// SPDX-License-Identifier: MIT

//! Session authentication middleware (the access gate).
//!
//! Read-only: resolution never mutates user or session state. A session that
//! cannot be resolved is treated as anonymous; a store outage during
//! resolution is logged at error severity but still reads as anonymous so
//! the request pipeline never crashes on it.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "hub_session";

/// Authenticated user attached to the request by the gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the request's session cookie to a user, if possible.
async fn resolve_session(state: &AppState, jar: &CookieJar) -> Option<User> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();

    match state.sessions.resolve(&token).await {
        Ok(user) => user,
        Err(e) => {
            // Masks a real outage, so it must be loud in the logs
            tracing::error!(error = %e, "Store failure during session resolution, treating as unauthenticated");
            None
        }
    }
}

/// Middleware that requires an authenticated session (401 otherwise).
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_session(&state, &jar)
        .await
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Middleware that additionally requires the admin role.
///
/// An unresolved session is 401; a resolved session without the admin role
/// is 403. The two are never conflated.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_session(&state, &jar)
        .await
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        tracing::warn!(username = %user.username, "Admin route rejected for non-admin user");
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
