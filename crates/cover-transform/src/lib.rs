//! Normalization of published cell text and column headers.

pub mod error;
pub mod normalization;

pub use error::TransformError;
pub use normalization::header::{
    HeaderRules, MeasureHint, age_in_months, measure_hint, note_reference, strip_note_references,
};
pub use normalization::numeric::{ValueCleaner, is_blank_like, parse_number};
