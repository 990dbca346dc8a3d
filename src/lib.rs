// SPDX-License-Identifier: MIT

//! Profile-Hub: user and theme backend with GitHub OAuth sign-in.
//!
//! This crate provides a small CRUD API for user profiles and UI themes.
//! Authentication is GitHub OAuth only; sessions are opaque server-side
//! tokens delivered as an httpOnly cookie.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::DocumentDb;
use services::{GithubService, SessionService};

/// Shared application state, constructed once in `main` and injected into
/// every handler. There is no module-level connection singleton.
pub struct AppState {
    pub config: Config,
    pub db: DocumentDb,
    pub sessions: SessionService,
    pub github: GithubService,
}
