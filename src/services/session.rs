// SPDX-License-Identifier: MIT

//! Server-side session store.
//!
//! A session record holds only the user's stable provider identity, never a
//! profile snapshot; every resolve re-fetches the current user from the
//! document store. Sessions with no matching user are cleared and treated as
//! unauthenticated, not as errors.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use std::sync::Arc;

use crate::db::DocumentDb;
use crate::error::AppError;
use crate::models::User;

const TOKEN_BYTES: usize = 32;

/// Server-held session record, keyed by the opaque session token.
#[derive(Debug, Clone)]
struct SessionRecord {
    provider_id: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Session metadata for diagnostics (`/check-session`).
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub created_at: String,
    pub expires_at: String,
}

/// Session store: issues opaque tokens and resolves them back to users.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<DashMap<String, SessionRecord>>,
    rng: SystemRandom,
    db: DocumentDb,
    ttl: Duration,
}

impl SessionService {
    pub fn new(db: DocumentDb, ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            db,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a new session for an authenticated user. Only the stable
    /// identity key is stored against the token.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session token RNG failure")))?;
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now();
        self.sessions.insert(
            token.clone(),
            SessionRecord {
                provider_id: user.provider_id.clone(),
                created_at: now,
                expires_at: now + self.ttl,
            },
        );

        Ok(token)
    }

    /// Resolve a session token back to the current user.
    ///
    /// Returns `Ok(None)` for unknown, expired, or orphaned sessions (the
    /// record is removed in the latter two cases). Store failures propagate
    /// as `Err` so the caller can log the outage; they must still be treated
    /// as unauthenticated, never as a crash.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, AppError> {
        let record = match self.sessions.get(token) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };

        if record.expires_at <= Utc::now() {
            self.sessions.remove(token);
            tracing::debug!("Session expired, removed");
            return Ok(None);
        }

        match self.db.find_user(&record.provider_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                // The user behind this session was deleted; the session is
                // dead and must not linger.
                tracing::info!(provider_id = %record.provider_id, "Session user no longer exists, clearing session");
                self.sessions.remove(token);
                Ok(None)
            }
        }
    }

    /// Destroy a session (logout). Unknown tokens are a no-op.
    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Diagnostics view of a live session, if any.
    pub fn session_info(&self, token: &str) -> Option<SessionInfo> {
        self.sessions.get(token).and_then(|record| {
            if record.expires_at <= Utc::now() {
                return None;
            }
            Some(SessionInfo {
                created_at: record.created_at.to_rfc3339(),
                expires_at: record.expires_at.to_rfc3339(),
            })
        })
    }

    #[cfg(test)]
    fn force_expire(&self, token: &str) {
        if let Some(mut record) = self.sessions.get_mut(token) {
            record.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}
