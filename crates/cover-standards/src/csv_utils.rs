//! Shared CSV utilities for loading standards files.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, StandardsError};

/// One CSV record keyed by header.
pub type CsvRow = BTreeMap<String, String>;

/// Read a CSV file into a vector of row maps.
///
/// Handles BOM characters and trims whitespace from headers and values.
/// Blank lines and lines starting with `#` are skipped.
pub fn read_csv_rows(path: &Path) -> Result<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|source| StandardsError::csv(path, source))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| StandardsError::csv(path, source))?
        .iter()
        .map(|header| header.trim().trim_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StandardsError::csv(path, source))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers.get(idx).cloned().unwrap_or_default();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Fails when any of `columns` is absent from the first row.
pub fn require_columns(path: &Path, rows: &[CsvRow], columns: &[&str]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for column in columns {
        if !first.contains_key(*column) {
            return Err(StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Get a field value from a row, returning empty string if not present.
pub fn get_field(row: &CsvRow, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// Get an optional field value from a row (None if empty or missing).
pub fn get_optional(row: &CsvRow, key: &str) -> Option<String> {
    row.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
