//! Per-sheet load outcome.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;
use crate::layout::LayoutType;
use crate::scope::LoadScope;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Row area could not be resolved against reference data.
    UnknownArea,
    /// Row period label could not be resolved.
    UnknownPeriod,
    /// A value column header did not match any known category or area.
    UnmatchedColumn,
    /// A non-blank cell could not be read as a number or marker.
    InvalidValue,
    /// The cell describes a record outside the scope the sheet replaces.
    OutOfScope,
    /// The assembled record failed validation.
    Invalid { error: ValidationError },
}

/// A row- or cell-level problem that was skipped without aborting the load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based row number in the sheet, when the problem is tied to a row.
    pub row: Option<usize>,
    /// 1-based column number, when the problem is tied to a cell or header.
    pub column: Option<usize>,
    pub kind: RowErrorKind,
    /// Offending raw text.
    pub raw: String,
}

impl RowError {
    pub fn row(index: usize, kind: RowErrorKind, raw: impl Into<String>) -> Self {
        Self {
            row: Some(index + 1),
            column: None,
            kind,
            raw: raw.into(),
        }
    }

    pub fn cell(row: usize, column: usize, kind: RowErrorKind, raw: impl Into<String>) -> Self {
        Self {
            row: Some(row + 1),
            column: Some(column + 1),
            kind,
            raw: raw.into(),
        }
    }

    pub fn column(column: usize, kind: RowErrorKind, raw: impl Into<String>) -> Self {
        Self {
            row: None,
            column: Some(column + 1),
            kind,
            raw: raw.into(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            RowErrorKind::UnknownArea => "unknown area",
            RowErrorKind::UnknownPeriod => "unknown period",
            RowErrorKind::UnmatchedColumn => "unmatched column",
            RowErrorKind::InvalidValue => "invalid value",
            RowErrorKind::OutOfScope => "out of scope",
            RowErrorKind::Invalid { .. } => "validation",
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.column) {
            (Some(row), Some(column)) => write!(f, "row {row}, column {column}: ")?,
            (Some(row), None) => write!(f, "row {row}: ")?,
            (None, Some(column)) => write!(f, "column {column}: ")?,
            (None, None) => {}
        }
        match &self.kind {
            RowErrorKind::Invalid { error } => write!(f, "{error} ('{}')", self.raw),
            _ => write!(f, "{} '{}'", self.kind_label(), self.raw),
        }
    }
}

/// Outcome of loading one sheet into its scope.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub sheet: String,
    pub layout: LayoutType,
    pub scope: LoadScope,
    /// Records written to the store.
    pub inserted: usize,
    /// Stored records removed when the scope was cleared.
    pub deleted: usize,
    /// Rows, columns or cells skipped; each has an entry in `errors`.
    pub skipped: usize,
    pub errors: Vec<RowError>,
    /// Bracketed tokens treated as suppression without a marker table entry.
    pub unrecognized_markers: BTreeSet<String>,
    /// Label lookups answered from the matcher cache.
    pub match_hits: usize,
    /// Label lookups that ran the full match.
    pub match_misses: usize,
    /// SHA-256 of the sheet content.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn new(sheet: impl Into<String>, scope: LoadScope, fingerprint: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            layout: scope.layout,
            scope,
            inserted: 0,
            deleted: 0,
            skipped: 0,
            errors: Vec::new(),
            unrecognized_markers: BTreeSet::new(),
            match_hits: 0,
            match_misses: 0,
            fingerprint: fingerprint.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn skip(&mut self, error: RowError) {
        self.skipped += 1;
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
