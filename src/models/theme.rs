//! Theme model: a named style configuration.

use serde::{Deserialize, Serialize};

/// Theme document, keyed by `theme_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Unique theme name (also used as document ID)
    pub theme_name: String,
    /// Primary color as a hex code (#RRGGBB)
    pub color: String,
    /// Layout identifier (e.g. "grid", "full-width")
    pub layout: String,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
}
