//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Authorization role consulted by privileged routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User profile stored in the document store.
///
/// `provider_id` is the stable identity a user is found and created by; it is
/// also the document ID, so repeated OAuth logins can never create duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// GitHub user ID (also used as document ID)
    pub provider_id: String,
    /// GitHub login, falls back to the provider ID when absent
    pub username: String,
    /// Display name from the provider profile
    pub display_name: Option<String>,
    /// First verified email address (may be None if not shared)
    pub email: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Authorization role
    #[serde(default)]
    pub role: Role,
    /// Preferred theme, by name
    pub theme_name: Option<String>,
    /// Free-form profile payload, not validated beyond shape
    pub info: Option<serde_json::Value>,
    /// When the user first signed in (RFC 3339)
    pub created_at: String,
    /// Last successful login (RFC 3339)
    pub last_login: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_user_on_deserialize() {
        let json = serde_json::json!({
            "provider_id": "gh-42",
            "username": "alice",
            "display_name": "Alice A",
            "email": "a@x.com",
            "avatar_url": null,
            "theme_name": null,
            "info": null,
            "created_at": "2026-01-01T00:00:00Z",
            "last_login": "2026-01-01T00:00:00Z"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn role_serializes_lowercase() {
        let value = serde_json::to_value(Role::Admin).unwrap();
        assert_eq!(value, serde_json::json!("admin"));
    }
}
