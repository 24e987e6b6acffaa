//! Error types for sheet ingestion.

use std::path::PathBuf;

use cover_model::{KeyField, LayoutType};
use thiserror::Error;

/// Errors that stop a single sheet from loading.
///
/// None of these affect sibling sheets; callers report them per sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open a sheet file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    #[error("failed to parse CSV sheet {sheet}: {source}")]
    CsvParse {
        sheet: String,
        #[source]
        source: csv::Error,
    },

    // === Classification Errors ===
    /// Sheet name does not map to any known layout.
    #[error("unrecognized layout for sheet {sheet}")]
    UnrecognizedLayout { sheet: String },

    /// Sheet name and header shape disagree.
    #[error("sheet {sheet} is named as {layout} but {reason}")]
    ShapeMismatch {
        sheet: String,
        layout: LayoutType,
        reason: String,
    },

    // === Table Location Errors ===
    #[error("could not detect header row in sheet {sheet}")]
    NoHeaderDetected { sheet: String },

    #[error("sheet {sheet} has no recognizable value columns")]
    NoValueColumns { sheet: String },

    #[error("sheet {sheet} has no {field:?} column")]
    MissingKeyColumn { sheet: String, field: KeyField },

    // === Scope Errors ===
    #[error("sheet {sheet}: unknown cohort '{token}'")]
    UnknownCohort { sheet: String, token: String },

    #[error("sheet {sheet}: unknown period '{label}'")]
    UnknownPeriod { sheet: String, label: String },

    #[error("sheet {sheet} names no period and no default period is configured")]
    MissingPeriod { sheet: String },

    #[error("sheet {sheet}: unknown category '{token}'")]
    UnknownCategory { sheet: String, token: String },

    #[error("sheet {sheet}: unknown area '{code}'")]
    UnknownArea { sheet: String, code: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_sheet() {
        let err = IngestError::NoHeaderDetected {
            sheet: "T4a_UTLA12m".to_string(),
        };
        assert_eq!(err.to_string(), "could not detect header row in sheet T4a_UTLA12m");

        let err = IngestError::ShapeMismatch {
            sheet: "T9_Eng12m".to_string(),
            layout: LayoutType::HistoricalByYear,
            reason: "its header has no period column".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sheet T9_Eng12m is named as historical_by_year but its header has no period column"
        );
    }
}
