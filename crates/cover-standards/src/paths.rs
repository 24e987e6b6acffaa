//! Standards directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "COVER_STANDARDS_DIR";

pub const AREAS_FILE: &str = "areas.csv";
pub const CATEGORIES_FILE: &str = "categories.csv";
pub const ALIASES_FILE: &str = "aliases.csv";
pub const COHORTS_FILE: &str = "cohorts.csv";
pub const PERIODS_FILE: &str = "periods.csv";
pub const MARKERS_FILE: &str = "markers.csv";
pub const SETTINGS_FILE: &str = "cover.toml";

/// Get the standards root directory.
///
/// Resolution order:
/// 1. `COVER_STANDARDS_DIR` environment variable
/// 2. `standards/` directory relative to workspace root
pub fn standards_root() -> PathBuf {
    if let Ok(root) = std::env::var(STANDARDS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards")
}
