//! Application configuration loaded from environment variables.
//!
//! OAuth credentials and the state-signing key are read once at startup and
//! kept in memory for the lifetime of the process.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub OAuth client ID (public)
    pub github_client_id: String,
    /// GitHub OAuth client secret
    pub github_client_secret: String,
    /// HMAC key for signing the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
    /// Frontend URL for post-login redirects
    pub frontend_url: String,
    /// GCP project ID; when unset the in-memory store is used
    pub gcp_project_id: Option<String>,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Whether session cookies carry the `Secure` attribute
    pub secure_cookies: bool,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            github_client_id: env::var("GITHUB_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_ID"))?,
            github_client_secret: env::var("GITHUB_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_SECRET"))?,
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").ok(),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            secure_cookies: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for tests: in-memory store, insecure cookies.
    pub fn test_default() -> Self {
        Self {
            github_client_id: "test_client_id".to_string(),
            github_client_secret: "test_secret".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: None,
            session_ttl_hours: 24,
            secure_cookies: false,
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
