#![deny(unsafe_code)]

//! Reference data and settings loaded from the standards directory.
//!
//! The directory holds one CSV file per reference entity plus an optional
//! `cover.toml` with tunables. Everything is loaded once into an immutable
//! [`ReferenceData`] snapshot that loaders and the reconstructor share.

pub mod csv_utils;
pub mod error;
pub mod loaders;
pub mod paths;
pub mod reference;
pub mod settings;

pub use error::{Result, StandardsError};
pub use loaders::{
    Standards, load_aliases, load_areas, load_categories, load_cohorts, load_default_standards,
    load_markers, load_periods, load_reference_data, load_standards,
};
pub use paths::{STANDARDS_ENV_VAR, standards_root};
pub use reference::{AreaOrder, ReferenceData};
pub use settings::{
    HeaderSettings, LoadSettings, MatcherSettings, RangePolicy, Settings, load_settings,
};
