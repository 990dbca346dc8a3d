// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod theme;
pub mod user;

pub use theme::Theme;
pub use user::{Role, User};
