use serde::Serialize;
use thiserror::Error;

/// Errors raised while building model values from raw text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown layout type: {0}")]
    UnknownLayout(String),
    #[error("unknown area kind: {0}")]
    UnknownAreaKind(String),
    #[error("unknown marker kind: {0}")]
    UnknownMarkerKind(String),
    #[error("invalid period label: {0}")]
    InvalidPeriod(String),
}

/// A record that violates a coverage invariant.
///
/// Validation failures never abort a load; they are attached to the
/// offending row in the load report.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    NegativeCount { field: &'static str, value: f64 },

    #[error("numerator {numerator} exceeds denominator {denominator}")]
    NumeratorExceedsDenominator { numerator: f64, denominator: f64 },

    #[error("percentage {value} is outside 0..=100")]
    PercentageOutOfRange { value: f64 },

    #[error("percentage {actual} disagrees with counts (expected {expected:.2})")]
    InconsistentPercentage { expected: f64, actual: f64 },

    #[error("suppressed record carries counts")]
    SuppressedWithCounts,
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
