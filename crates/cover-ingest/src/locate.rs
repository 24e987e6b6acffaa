//! Header and data boundary detection.
//!
//! Published sheets open with title, contents and notes rows and close with
//! footnotes. The table itself is the block whose rows share the most common
//! width; its header is the first such row made of text rather than numbers.

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

use cover_model::{ColumnRole, RawSheet};
use cover_transform::{is_blank_like, parse_number};

use crate::error::{IngestError, Result};

/// Assigns a role to each header cell of a located table.
///
/// Implementations may keep state (such as a name matcher cache) across
/// columns, hence `&mut self`.
pub trait ColumnClassifier {
    /// `index` is 0-based; `header` is the trimmed header text.
    fn classify_column(&mut self, index: usize, header: &str) -> ColumnRole;
}

/// Rows making up the table proper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    /// 0-based index of the header row.
    pub header_row: usize,
    /// Rows between the header and the trailing footnote run.
    pub data_rows: Range<usize>,
    /// Header cells with whitespace collapsed, one per column.
    pub headers: Vec<String>,
}

impl TableRegion {
    pub fn data_row_count(&self) -> usize {
        self.data_rows.len()
    }
}

/// A table region together with its column roles.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedTable {
    pub region: TableRegion,
    pub roles: Vec<ColumnRole>,
}

impl LocatedTable {
    /// Index of the first column with the given key role.
    pub fn key_column(&self, field: cover_model::KeyField) -> Option<usize> {
        self.roles
            .iter()
            .position(|role| role.key_field() == Some(field))
    }

    /// Value columns with their indices.
    pub fn value_columns(&self) -> impl Iterator<Item = (usize, &cover_model::ValueColumn)> {
        self.roles
            .iter()
            .enumerate()
            .filter_map(|(idx, role)| role.value().map(|column| (idx, column)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    /// Index of the last non-empty cell plus one.
    width: usize,
    non_empty: usize,
    numeric: usize,
    alpha: usize,
}

impl RowStats {
    fn ratio(part: usize, whole: usize) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64
        }
    }

    fn fill_ratio(self, table_width: usize) -> f64 {
        Self::ratio(self.non_empty, table_width)
    }

    fn numeric_ratio(self) -> f64 {
        Self::ratio(self.numeric, self.non_empty)
    }

    fn alpha_ratio(self) -> f64 {
        Self::ratio(self.alpha, self.non_empty)
    }
}

fn row_stats(row: &[String]) -> RowStats {
    let mut stats = RowStats::default();
    for (idx, cell) in row.iter().enumerate() {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.width = idx + 1;
        stats.non_empty += 1;
        if is_value_like(trimmed) {
            stats.numeric += 1;
        } else if trimmed.chars().any(char::is_alphabetic) {
            stats.alpha += 1;
        }
    }
    stats
}

/// Numbers, placeholders and bracketed markers all count as values.
fn is_value_like(cell: &str) -> bool {
    parse_number(cell).is_some()
        || is_blank_like(cell)
        || (cell.starts_with('[') && cell.ends_with(']') && cell.len() <= 4)
}

/// Most common width among multi-cell rows; ties go to the wider table.
fn mode_width(stats: &[RowStats]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for stat in stats.iter().filter(|stat| stat.non_empty >= 2) {
        *counts.entry(stat.width).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map(|(width, _)| width)
}

fn is_header_like(stats: RowStats, table_width: usize) -> bool {
    stats.width >= table_width
        && stats.fill_ratio(table_width) >= 0.5
        && stats.alpha_ratio() >= 0.6
        && stats.numeric_ratio() <= 0.2
}

/// Footnote and padding rows: mostly empty relative to the table width.
fn is_trailing_noise(stats: RowStats, table_width: usize) -> bool {
    stats.non_empty < 2 || stats.fill_ratio(table_width) < 0.25
}

/// Finds the header row and the data rows below it.
pub fn find_table_region(sheet: &RawSheet) -> Result<TableRegion> {
    let not_found = || IngestError::NoHeaderDetected {
        sheet: sheet.name.clone(),
    };
    let stats: Vec<RowStats> = sheet.rows.iter().map(|row| row_stats(row)).collect();
    let table_width = mode_width(&stats).ok_or_else(not_found)?;
    let header_row = stats
        .iter()
        .position(|stat| is_header_like(*stat, table_width))
        .ok_or_else(not_found)?;

    let header_width = stats[header_row].width;
    let mut end = stats.len();
    while end > header_row + 1 && is_trailing_noise(stats[end - 1], header_width) {
        end -= 1;
    }

    let headers = (0..header_width)
        .map(|idx| collapse_whitespace(sheet.cell(header_row, idx)))
        .collect();
    let region = TableRegion {
        header_row,
        data_rows: header_row + 1..end,
        headers,
    };
    debug!(
        sheet = %sheet.name,
        header_row = region.header_row + 1,
        data_rows = region.data_row_count(),
        width = header_width,
        "located table"
    );
    Ok(region)
}

/// Finds the table region and assigns a role to every column.
///
/// Fails when no column resolves to a value column.
pub fn locate<C>(sheet: &RawSheet, classifier: &mut C) -> Result<LocatedTable>
where
    C: ColumnClassifier + ?Sized,
{
    let region = find_table_region(sheet)?;
    let roles: Vec<ColumnRole> = region
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            if header.is_empty() {
                ColumnRole::Ignored
            } else {
                classifier.classify_column(idx, header)
            }
        })
        .collect();
    if !roles.iter().any(|role| role.value().is_some()) {
        return Err(IngestError::NoValueColumns {
            sheet: sheet.name.clone(),
        });
    }
    Ok(LocatedTable { region, roles })
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
