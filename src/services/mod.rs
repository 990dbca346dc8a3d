// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod github;
pub mod session;

pub use github::{GithubProfile, GithubService};
pub use session::{SessionInfo, SessionService};
