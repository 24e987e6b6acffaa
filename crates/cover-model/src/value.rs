//! Cleaned cell values and the suppression marker table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Meaning of a published suppression marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Withheld to protect confidentiality, `[c]`.
    Confidential,
    /// Not applicable, `[z]`.
    NotApplicable,
    /// Not available, `[x]`.
    NotAvailable,
    /// Estimate too unreliable to publish.
    LowReliability,
    /// Bracketed marker with no table entry.
    Unrecognized,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confidential => "confidential",
            Self::NotApplicable => "not_applicable",
            Self::NotAvailable => "not_available",
            Self::LowReliability => "low_reliability",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "confidential" => Ok(Self::Confidential),
            "not_applicable" => Ok(Self::NotApplicable),
            "not_available" => Ok(Self::NotAvailable),
            "low_reliability" => Ok(Self::LowReliability),
            _ => Err(ModelError::UnknownMarkerKind(raw.to_string())),
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionMarker {
    pub token: String,
    pub kind: MarkerKind,
    pub description: Option<String>,
}

impl SuppressionMarker {
    pub fn new(token: impl Into<String>, kind: MarkerKind) -> Self {
        Self {
            token: token.into(),
            kind,
            description: None,
        }
    }
}

/// Lookup table of known suppression markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerTable {
    markers: Vec<SuppressionMarker>,
}

impl MarkerTable {
    pub fn new(markers: Vec<SuppressionMarker>) -> Self {
        Self { markers }
    }

    /// Finds the marker whose token equals `token`, ignoring case and
    /// surrounding whitespace.
    pub fn lookup(&self, token: &str) -> Option<&SuppressionMarker> {
        let token = token.trim();
        self.markers
            .iter()
            .find(|marker| marker.token.eq_ignore_ascii_case(token))
    }

    pub fn markers(&self) -> &[SuppressionMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::new(vec![
            SuppressionMarker::new("[c]", MarkerKind::Confidential),
            SuppressionMarker::new("[z]", MarkerKind::NotApplicable),
            SuppressionMarker::new("[x]", MarkerKind::NotAvailable),
        ])
    }
}

/// A raw cell after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleanedValue {
    Number { value: f64 },
    Suppressed { kind: MarkerKind, token: String },
    /// Published range such as `35% to 69%`.
    Range { low: f64, high: f64, text: String },
    Missing,
}

impl CleanedValue {
    pub fn number(value: f64) -> Self {
        Self::Number { value }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn midpoint(&self) -> Option<f64> {
        match self {
            Self::Range { low, high, .. } => Some((low + high) / 2.0),
            _ => None,
        }
    }
}

/// One cell of a reconstructed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Token(String),
    Empty,
}

impl DisplayValue {
    /// Text form: numbers without trailing zeros, tokens verbatim, empty as "".
    pub fn render(&self) -> String {
        match self {
            Self::Number(value) => format_numeric(*value),
            Self::Token(token) => token.clone(),
            Self::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
