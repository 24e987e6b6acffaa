//! CLI library components for the `cover` binary.

pub mod logging;
pub mod summary;
pub mod types;
