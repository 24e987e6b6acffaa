//! Tunables read from `cover.toml`.
//!
//! Every field has a default, so the file is optional and may set only the
//! values it wants to change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub matcher: MatcherSettings,
    pub load: LoadSettings,
    pub headers: HeaderSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub fuzzy_threshold: f64,
    pub fuzzy_margin: f64,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_margin: 0.05,
        }
    }
}

/// How published ranges such as `35% to 69%` are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Store as a suppressed record that keeps the range text.
    #[default]
    Suppress,
    /// Store the midpoint as the percentage.
    Midpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Period key for snapshot sheets whose name carries no year range.
    pub default_period: Option<String>,
    /// Area that single-area time series describe.
    pub historical_area: String,
    pub range_policy: RangePolicy,
    /// Allowed gap, in percentage points, between a published percentage
    /// and the one implied by its counts.
    pub percentage_tolerance: f64,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            default_period: None,
            historical_area: "E92000001".to_string(),
            range_policy: RangePolicy::default(),
            percentage_tolerance: 0.1,
        }
    }
}

/// Extra header decoration patterns. Empty lists keep the built-in rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSettings {
    pub strip_prefixes: Vec<String>,
    pub strip_suffixes: Vec<String>,
}

/// Reads settings from `path`; a missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "settings file absent, using defaults");
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| StandardsError::io(path, source))?;
    toml::from_str(&text).map_err(|source| StandardsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
