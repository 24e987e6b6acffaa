//! Column roles assigned while locating a sheet's table region.

use serde::{Deserialize, Serialize};

/// Identifier columns that describe a row rather than a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    AreaCode,
    AreaName,
    ParentArea,
    Period,
    Note,
    /// Eligible population shared by every measurement in the row.
    Denominator,
    /// Known but unused identifier, e.g. an ODS code.
    Auxiliary,
}

/// What a value column measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Percentage,
    Numerator,
    Denominator,
}

/// A measurement column resolved to a point on the sheet's value axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueColumn {
    /// Resolved code on the column axis: a category, area or cohort.
    pub target: String,
    pub measure: Measure,
    /// Header text as published.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ColumnRole {
    Key { field: KeyField },
    Value(ValueColumn),
    /// Looked like a measurement but could not be resolved.
    Unmatched { label: String },
    Ignored,
}

impl ColumnRole {
    pub fn key(field: KeyField) -> Self {
        Self::Key { field }
    }

    pub fn key_field(&self) -> Option<KeyField> {
        match self {
            Self::Key { field } => Some(*field),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&ValueColumn> {
        match self {
            Self::Value(column) => Some(column),
            _ => None,
        }
    }
}
