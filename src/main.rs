// SPDX-License-Identifier: MIT

//! Profile-Hub API Server
//!
//! Small CRUD backend for user profiles and UI themes, authenticated via
//! GitHub OAuth with server-side sessions.

use profile_hub::{
    config::Config,
    db::DocumentDb,
    services::{GithubService, SessionService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Profile-Hub API");

    // Initialize the document store
    let db = DocumentDb::connect(&config)
        .await
        .expect("Failed to connect to document store");

    // Session store (opaque tokens, server-side records)
    let sessions = SessionService::new(db.clone(), config.session_ttl_hours);

    // GitHub OAuth client
    let github = GithubService::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.oauth_state_key.clone(),
        db.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
        github,
    });

    // Build router
    let app = profile_hub::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("profile_hub=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
