//! Reading sheets exported as CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use cover_model::RawSheet;

use crate::error::{IngestError, Result};

/// Sheet name for a file: its stem, e.g. `T4a_UTLA12m`.
pub fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads every record of a CSV export. Records made only of empty cells are
/// kept so row numbers in diagnostics stay aligned with the spreadsheet.
pub fn read_sheet(path: &Path) -> Result<RawSheet> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(sheet_name(path), file)
}

/// Parses CSV text already held in memory.
pub fn parse_sheet(name: &str, text: &str) -> Result<RawSheet> {
    read_rows(name.to_string(), text.as_bytes())
}

fn read_rows<R: Read>(name: String, source: R) -> Result<RawSheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            sheet: name.clone(),
            source,
        })?;
        let row: Vec<String> = record
            .iter()
            .map(|bytes| normalize_cell(&String::from_utf8_lossy(bytes)))
            .collect();
        rows.push(row);
    }
    tracing::debug!(sheet = %name, rows = rows.len(), "read sheet");
    Ok(RawSheet::new(name, rows))
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ragged_and_blank_rows() {
        let sheet = parse_sheet(
            "T1_UK12m",
            "\u{feff}Title row\n,,\nArea,Code, Value \nEngland,E92000001,\"1,234\"\n",
        )
        .unwrap();
        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.cell(0, 0), "Title row");
        assert!(sheet.rows[1].iter().all(String::is_empty));
        assert_eq!(sheet.cell(2, 2), "Value");
        assert_eq!(sheet.cell(3, 2), "1,234");
    }

    #[test]
    fn reads_files_named_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T9_Eng12m.csv");
        std::fs::write(&path, "a,b\n").unwrap();
        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.name, "T9_Eng12m");
        assert!(matches!(
            read_sheet(&dir.path().join("missing.csv")),
            Err(IngestError::FileRead { .. })
        ));
    }
}
