//! Database layer (Firestore, with an in-memory backend for tests/local dev).

pub mod store;

pub use store::DocumentDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const THEMES: &str = "themes";
}
