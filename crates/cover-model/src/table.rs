//! Raw sheets as read from disk and wide tables rebuilt from stored facts.

use serde::{Deserialize, Serialize};

use crate::value::DisplayValue;

/// A worksheet as a plain grid of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Returns the cell text, or "" outside the populated grid.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the sheet.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideColumn {
    /// Category or area code.
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    /// Area code or period key.
    pub key: String,
    pub label: String,
    pub note: Option<String>,
    pub cells: Vec<DisplayValue>,
}

/// A publication-shaped table: one row per area or period, one column per
/// category or area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    pub title: String,
    /// Heading of the row-label column, e.g. "Area" or "Financial year".
    pub row_heading: String,
    pub columns: Vec<WideColumn>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn cell(&self, row_key: &str, column_code: &str) -> Option<&DisplayValue> {
        let column = self.columns.iter().position(|c| c.code == column_code)?;
        self.rows
            .iter()
            .find(|row| row.key == row_key)
            .and_then(|row| row.cells.get(column))
    }

    pub fn has_notes(&self) -> bool {
        self.rows.iter().any(|row| row.note.is_some())
    }

    /// Header row followed by one line per row, all rendered to text.
    pub fn to_text_rows(&self) -> Vec<Vec<String>> {
        let with_notes = self.has_notes();
        let mut header = vec![self.row_heading.clone()];
        if with_notes {
            header.push("Note".to_string());
        }
        header.extend(self.columns.iter().map(|column| column.label.clone()));
        let mut out = vec![header];
        for row in &self.rows {
            let mut line = vec![row.label.clone()];
            if with_notes {
                line.push(row.note.clone().unwrap_or_default());
            }
            line.extend(row.cells.iter().map(DisplayValue::render));
            out.push(line);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_outside_grid_is_empty() {
        let sheet = RawSheet::new("T1", vec![vec!["a".to_string()], vec![]]);
        assert_eq!(sheet.cell(0, 0), "a");
        assert_eq!(sheet.cell(1, 3), "");
        assert_eq!(sheet.cell(9, 0), "");
        assert_eq!(sheet.width(), 1);
    }

    #[test]
    fn text_rows_include_notes_only_when_present() {
        let mut table = WideTable {
            title: "t".to_string(),
            row_heading: "Area".to_string(),
            columns: vec![WideColumn {
                code: "MMR1".to_string(),
                label: "MMR1".to_string(),
            }],
            rows: vec![WideRow {
                key: "E92000001".to_string(),
                label: "England".to_string(),
                note: None,
                cells: vec![DisplayValue::Number(89.5)],
            }],
        };
        assert_eq!(
            table.to_text_rows(),
            vec![vec!["Area", "MMR1"], vec!["England", "89.5"]]
        );
        table.rows[0].note = Some("[note 3]".to_string());
        assert_eq!(table.to_text_rows()[0], vec!["Area", "Note", "MMR1"]);
        assert_eq!(
            table.cell("E92000001", "MMR1"),
            Some(&DisplayValue::Number(89.5))
        );
    }
}
