// SPDX-License-Identifier: MIT

//! GitHub OAuth exchange.
//!
//! Handles:
//! - Authorize redirect URL with a signed `state` parameter
//! - Authorization-code exchange
//! - Profile fetch (`/user`, plus `/user/emails` when needed)
//! - Find-or-create of the application user from the provider profile

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::db::DocumentDb;
use crate::error::AppError;
use crate::models::{Role, User};

type HmacSha256 = Hmac<Sha256>;

/// Provider calls that hang must fail the login, not stall the service.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// GitHub profile payload, treated as untrusted input. Every field the
/// provider may omit is an explicit `Option` with a defined default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubProfile {
    /// GitHub user ID; the stable identity. Required.
    pub id: Option<u64>,
    /// GitHub login name
    pub login: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Public email, often absent
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Entry from GitHub's `/user/emails` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    pub verified: bool,
    pub primary: bool,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

/// GitHub OAuth client.
#[derive(Clone)]
pub struct GithubService {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
    client_id: String,
    client_secret: String,
    state_key: Vec<u8>,
    db: DocumentDb,
}

impl GithubService {
    pub fn new(
        client_id: String,
        client_secret: String,
        state_key: Vec<u8>,
        db: DocumentDb,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://api.github.com".to_string(),
            oauth_base: "https://github.com/login/oauth".to_string(),
            client_id,
            client_secret,
            state_key,
            db,
        }
    }

    // ─── Begin Auth ──────────────────────────────────────────────

    /// Build the GitHub authorize URL with the `user:email` scope and a
    /// signed state carrying the frontend URL to return to.
    pub fn authorize_url(
        &self,
        callback_url: &str,
        frontend_url: &str,
    ) -> Result<String, AppError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
            .as_millis();

        let state = sign_state(frontend_url, timestamp, &self.state_key)?;

        Ok(format!(
            "{}/authorize?client_id={}&redirect_uri={}&scope=user:email&state={}",
            self.oauth_base,
            self.client_id,
            urlencoding::encode(callback_url),
            state
        ))
    }

    /// Verify the state parameter from the callback and recover the frontend
    /// URL. Tampered or malformed state yields `None`; the caller falls back
    /// to the configured frontend URL.
    pub fn verify_state(&self, state: &str) -> Option<String> {
        verify_and_decode_state(state, &self.state_key)
    }

    // ─── Complete Auth ───────────────────────────────────────────

    /// Exchange the authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/access_token", self.oauth_base))
            .timeout(PROVIDER_TIMEOUT)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, "profile-hub")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Token exchange returned {}",
                response.status()
            )));
        }

        let body: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Invalid token response: {}", e)))?;

        body.access_token.ok_or_else(|| {
            AppError::Provider(format!(
                "Token exchange rejected: {}",
                body.error_description.unwrap_or_default()
            ))
        })
    }

    /// Fetch the authenticated user's profile. When the public profile has no
    /// email, `/user/emails` is consulted for the first verified address.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GithubProfile, AppError> {
        let mut profile: GithubProfile = self
            .get_json(&format!("{}/user", self.api_base), access_token)
            .await?;

        if profile.email.is_none() {
            profile.email = self.fetch_verified_email(access_token).await?;
        }

        Ok(profile)
    }

    async fn fetch_verified_email(&self, access_token: &str) -> Result<Option<String>, AppError> {
        let emails: Vec<GithubEmail> = self
            .get_json(&format!("{}/user/emails", self.api_base), access_token)
            .await?;

        // Prefer the primary address, otherwise the first verified one
        let chosen = emails
            .iter()
            .find(|e| e.verified && e.primary)
            .or_else(|| emails.iter().find(|e| e.verified))
            .map(|e| e.email.clone());

        Ok(chosen)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .timeout(PROVIDER_TIMEOUT)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "profile-hub")
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "GitHub returned {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Invalid GitHub response: {}", e)))
    }

    // ─── Find or Create ──────────────────────────────────────────

    /// Resolve a provider profile to exactly one persisted user.
    ///
    /// An existing user gets its mutable fields refreshed (display name,
    /// last login); an unseen identity gets a new document. A concurrent
    /// callback for the same identity loses the create race at the store
    /// level and recovers by re-fetching the winner's document.
    pub async fn find_or_create_user(&self, profile: &GithubProfile) -> Result<User, AppError> {
        let provider_id = match profile.id {
            Some(id) => id.to_string(),
            None => {
                return Err(AppError::ProfileInvalid(
                    "provider payload has no user id".to_string(),
                ))
            }
        };

        let now = chrono::Utc::now().to_rfc3339();

        if let Some(mut user) = self.db.find_user(&provider_id).await? {
            user.display_name = profile.name.clone().or(user.display_name);
            user.last_login = now;
            self.db.update_user(&user).await?;
            tracing::info!(provider_id = %provider_id, username = %user.username, "Returning user logged in");
            return Ok(user);
        }

        let user = User {
            provider_id: provider_id.clone(),
            username: profile.login.clone().unwrap_or_else(|| provider_id.clone()),
            display_name: profile.name.clone(),
            email: profile.email.clone(),
            avatar_url: profile.avatar_url.clone(),
            role: Role::User,
            theme_name: None,
            info: None,
            created_at: now.clone(),
            last_login: now,
        };

        match self.db.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(provider_id = %provider_id, username = %user.username, "New user created");
                Ok(user)
            }
            Err(AppError::DuplicateIdentity(_)) => {
                // Lost the create race to a concurrent callback; the winner's
                // document is authoritative.
                tracing::debug!(provider_id = %provider_id, "Create race lost, re-fetching user");
                self.db.find_user(&provider_id).await?.ok_or_else(|| {
                    AppError::Database(format!(
                        "user {} vanished after duplicate-key conflict",
                        provider_id
                    ))
                })
            }
            Err(e) => Err(e),
        }
    }
}

// ─── OAuth State Signing ─────────────────────────────────────────

/// Sign "frontend_url|timestamp_hex" with HMAC-SHA256 and base64url-encode
/// the whole "payload|signature_hex" blob for use as the state parameter.
fn sign_state(frontend_url: &str, timestamp: u128, key: &[u8]) -> Result<String, AppError> {
    let payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature and decode the frontend URL from the OAuth
/// state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}
