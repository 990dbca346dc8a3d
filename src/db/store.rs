// SPDX-License-Identifier: MIT

//! Document store client with typed operations.
//!
//! Two backends share one interface:
//! - Firestore for production (selected when a GCP project ID is configured)
//! - an in-memory map for tests and local development
//!
//! User documents are keyed by their provider identity, so a create-only
//! insert enforces identity uniqueness at the store level. Concurrent
//! callbacks for the same identity surface as `DuplicateIdentity`, which the
//! OAuth exchange recovers from by re-fetching.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::Config;
use crate::db::collections;
use crate::error::AppError;
use crate::models::{Theme, User};

/// Upper bound on any single store operation. A slow store fails the request
/// rather than stalling the whole service.
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Document store client.
#[derive(Clone)]
pub struct DocumentDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
}

#[derive(Default)]
struct MemoryStore {
    users: DashMap<String, User>,
    themes: DashMap<String, Theme>,
}

/// Run a store future with the operation timeout applied.
async fn bounded<T>(
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(STORE_TIMEOUT, fut)
        .await
        .map_err(|_| AppError::Database("document store operation timed out".to_string()))?
}

impl DocumentDb {
    /// Connect to the store selected by the configuration.
    ///
    /// With a GCP project ID this connects to Firestore (set
    /// FIRESTORE_EMULATOR_HOST for local emulator use). Without one, an
    /// in-memory store is used and nothing is persisted across restarts.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match &config.gcp_project_id {
            Some(project_id) => {
                let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                    AppError::Database(format!("Failed to connect to Firestore: {}", e))
                })?;
                tracing::info!(project = %project_id, "Connected to Firestore");
                Ok(Self {
                    backend: Backend::Firestore(client),
                })
            }
            None => {
                tracing::warn!("No GCP_PROJECT_ID set, using in-memory store (non-persistent)");
                Ok(Self::new_memory())
            }
        }
    }

    /// Create an in-memory store (tests and local development).
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Find a user by provider identity.
    pub async fn find_user(&self, provider_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    client
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(provider_id)
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await
            }
            Backend::Memory(store) => Ok(store.users.get(provider_id).map(|u| u.clone())),
        }
    }

    /// Find a user by username (CRUD surface; usernames are not the identity key).
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let username = username.to_string();
                bounded(async {
                    let mut matches: Vec<User> = client
                        .fluent()
                        .select()
                        .from(collections::USERS)
                        .filter(|q| q.field("username").eq(username.clone()))
                        .limit(1)
                        .obj()
                        .query()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    Ok(matches.pop())
                })
                .await
            }
            Backend::Memory(store) => Ok(store
                .users
                .iter()
                .find(|entry| entry.username == username)
                .map(|entry| entry.clone())),
        }
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    client
                        .fluent()
                        .select()
                        .from(collections::USERS)
                        .obj()
                        .query()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await
            }
            Backend::Memory(store) => {
                let mut users: Vec<User> =
                    store.users.iter().map(|entry| entry.clone()).collect();
                users.sort_by(|a, b| a.username.cmp(&b.username));
                Ok(users)
            }
        }
    }

    /// Insert a new user. Fails with `DuplicateIdentity` if a document with
    /// the same provider identity already exists; this is the uniqueness
    /// guarantee the OAuth find-or-create sequence relies on.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    let result: Result<User, _> = client
                        .fluent()
                        .insert()
                        .into(collections::USERS)
                        .document_id(&user.provider_id)
                        .object(user)
                        .execute()
                        .await;

                    match result {
                        Ok(_) => Ok(()),
                        Err(firestore::errors::FirestoreError::DataConflictError(_)) => Err(
                            AppError::DuplicateIdentity(user.provider_id.clone()),
                        ),
                        Err(e) => Err(AppError::Database(e.to_string())),
                    }
                })
                .await
            }
            Backend::Memory(store) => match store.users.entry(user.provider_id.clone()) {
                dashmap::Entry::Occupied(_) => {
                    Err(AppError::DuplicateIdentity(user.provider_id.clone()))
                }
                dashmap::Entry::Vacant(entry) => {
                    entry.insert(user.clone());
                    Ok(())
                }
            },
        }
    }

    /// Update an existing user (full-document write keyed by identity).
    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    let _: User = client
                        .fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.provider_id)
                        .object(user)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    Ok(())
                })
                .await
            }
            Backend::Memory(store) => {
                store.users.insert(user.provider_id.clone(), user.clone());
                Ok(())
            }
        }
    }

    /// Delete a user by provider identity. Returns whether a document existed.
    pub async fn delete_user(&self, provider_id: &str) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let existed = self.find_user(provider_id).await?.is_some();
                if !existed {
                    return Ok(false);
                }
                bounded(async {
                    client
                        .fluent()
                        .delete()
                        .from(collections::USERS)
                        .document_id(provider_id)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await?;
                Ok(true)
            }
            Backend::Memory(store) => Ok(store.users.remove(provider_id).is_some()),
        }
    }

    // ─── Theme Operations ────────────────────────────────────────

    /// Find a theme by name.
    pub async fn find_theme(&self, theme_name: &str) -> Result<Option<Theme>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    client
                        .fluent()
                        .select()
                        .by_id_in(collections::THEMES)
                        .obj()
                        .one(theme_name)
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await
            }
            Backend::Memory(store) => Ok(store.themes.get(theme_name).map(|t| t.clone())),
        }
    }

    /// List all themes.
    pub async fn list_themes(&self) -> Result<Vec<Theme>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    client
                        .fluent()
                        .select()
                        .from(collections::THEMES)
                        .obj()
                        .query()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await
            }
            Backend::Memory(store) => {
                let mut themes: Vec<Theme> =
                    store.themes.iter().map(|entry| entry.clone()).collect();
                themes.sort_by(|a, b| a.theme_name.cmp(&b.theme_name));
                Ok(themes)
            }
        }
    }

    /// Insert a new theme. Fails with `DuplicateIdentity` on a name collision.
    pub async fn insert_theme(&self, theme: &Theme) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    let result: Result<Theme, _> = client
                        .fluent()
                        .insert()
                        .into(collections::THEMES)
                        .document_id(&theme.theme_name)
                        .object(theme)
                        .execute()
                        .await;

                    match result {
                        Ok(_) => Ok(()),
                        Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                            Err(AppError::DuplicateIdentity(theme.theme_name.clone()))
                        }
                        Err(e) => Err(AppError::Database(e.to_string())),
                    }
                })
                .await
            }
            Backend::Memory(store) => match store.themes.entry(theme.theme_name.clone()) {
                dashmap::Entry::Occupied(_) => {
                    Err(AppError::DuplicateIdentity(theme.theme_name.clone()))
                }
                dashmap::Entry::Vacant(entry) => {
                    entry.insert(theme.clone());
                    Ok(())
                }
            },
        }
    }

    /// Update an existing theme (full-document write keyed by name).
    pub async fn update_theme(&self, theme: &Theme) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                bounded(async {
                    let _: Theme = client
                        .fluent()
                        .update()
                        .in_col(collections::THEMES)
                        .document_id(&theme.theme_name)
                        .object(theme)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    Ok(())
                })
                .await
            }
            Backend::Memory(store) => {
                store
                    .themes
                    .insert(theme.theme_name.clone(), theme.clone());
                Ok(())
            }
        }
    }

    /// Delete a theme by name. Returns whether a document existed.
    pub async fn delete_theme(&self, theme_name: &str) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let existed = self.find_theme(theme_name).await?.is_some();
                if !existed {
                    return Ok(false);
                }
                bounded(async {
                    client
                        .fluent()
                        .delete()
                        .from(collections::THEMES)
                        .document_id(theme_name)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .await?;
                Ok(true)
            }
            Backend::Memory(store) => Ok(store.themes.remove(theme_name).is_some()),
        }
    }
}
