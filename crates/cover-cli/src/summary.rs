//! Terminal rendering of load summaries and rebuilt tables.

use std::io;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use cover_model::{LoadReport, RowErrorKind, WideTable};

use crate::types::LoadRun;

/// Skipped-row entries listed per sheet before the rest are folded.
const ERRORS_PER_SHEET: usize = 20;

pub fn print_load_summary(run: &LoadRun) {
    println!("Database: {}", run.db.display());
    println!("{}", load_table(run));
    if let Some(table) = row_error_table(run) {
        println!();
        println!("Skipped:");
        println!("{table}");
    }
    let markers: Vec<&str> = run
        .reports()
        .flat_map(|report| report.unrecognized_markers.iter().map(String::as_str))
        .collect();
    if !markers.is_empty() {
        println!();
        println!("Unrecognized markers (stored as suppressed): {}", markers.join(", "));
    }
    let failures: Vec<_> = run
        .outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (&outcome.sheet, error))
        })
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (sheet, error) in failures {
            eprintln!("- {sheet}: {error}");
        }
    }
}

/// One row per sheet with a TOTAL row.
pub fn load_table(run: &LoadRun) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Layout"),
        header_cell("Scope"),
        header_cell("Inserted"),
        header_cell("Deleted"),
        header_cell("Skipped"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);

    let mut inserted = 0usize;
    let mut deleted = 0usize;
    let mut skipped = 0usize;
    for outcome in &run.outcomes {
        match &outcome.result {
            Ok(report) => {
                inserted += report.inserted;
                deleted += report.deleted;
                skipped += report.skipped;
                table.add_row(vec![
                    sheet_cell(&outcome.sheet),
                    Cell::new(report.layout),
                    scope_cell(report),
                    Cell::new(report.inserted),
                    Cell::new(report.deleted),
                    count_cell(Some(report.skipped), Color::Yellow),
                    status_cell(report),
                ]);
            }
            Err(_) => {
                table.add_row(vec![
                    sheet_cell(&outcome.sheet),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("FAILED")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    let failed = run.failed();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} sheets", run.outcomes.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(inserted).add_attribute(Attribute::Bold),
        Cell::new(deleted).add_attribute(Attribute::Bold),
        count_cell(Some(skipped), Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(Some(failed), Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Skipped rows, columns and cells of every loaded sheet, or `None` when
/// nothing was skipped.
pub fn row_error_table(run: &LoadRun) -> Option<Table> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Problem"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let mut any = false;
    for report in run.reports() {
        for error in report.errors.iter().take(ERRORS_PER_SHEET) {
            any = true;
            table.add_row(vec![
                Cell::new(&report.sheet),
                position_cell(error.row),
                position_cell(error.column),
                problem_cell(&error.kind, error.kind_label()),
                Cell::new(&error.raw),
            ]);
        }
        let folded = report.errors.len().saturating_sub(ERRORS_PER_SHEET);
        if folded > 0 {
            table.add_row(vec![
                Cell::new(&report.sheet),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell(format!("... and {folded} more")),
                dim_cell("-"),
            ]);
        }
    }
    any.then_some(table)
}

/// Rebuilt table with the row heading first and one column per key.
pub fn wide_table(wide: &WideTable) -> Table {
    let mut rows = wide.to_text_rows().into_iter();
    let mut table = Table::new();
    if let Some(header) = rows.next() {
        table.set_header(header.iter().map(|label| header_cell(label)).collect::<Vec<_>>());
    }
    apply_table_style(&mut table);
    let first_value = if wide.has_notes() { 2 } else { 1 };
    for index in first_value..first_value + wide.columns.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        table.add_row(
            row.into_iter()
                .enumerate()
                .map(|(index, text)| value_cell(index, first_value, text))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Writes the rebuilt table as CSV with a header line.
pub fn write_csv<W: io::Write>(wide: &WideTable, writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in wide.to_text_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn sheet_cell(sheet: &str) -> Cell {
    Cell::new(sheet)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn scope_cell(report: &LoadReport) -> Cell {
    let scope = &report.scope;
    let parts: Vec<&str> = [&scope.cohort, &scope.period, &scope.category]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect();
    if parts.is_empty() {
        dim_cell("all")
    } else {
        Cell::new(parts.join(", "))
    }
}

fn status_cell(report: &LoadReport) -> Cell {
    if report.skipped > 0 {
        Cell::new("partial").fg(Color::Yellow)
    } else {
        Cell::new("ok")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    }
}

fn problem_cell(kind: &RowErrorKind, label: &str) -> Cell {
    match kind {
        RowErrorKind::UnmatchedColumn | RowErrorKind::OutOfScope => {
            Cell::new(label).fg(Color::Yellow)
        }
        RowErrorKind::Invalid { error } => Cell::new(error).fg(Color::Red),
        _ => Cell::new(label).fg(Color::Red),
    }
}

fn position_cell(position: Option<usize>) -> Cell {
    position.map_or_else(|| dim_cell("-"), Cell::new)
}

fn value_cell(index: usize, first_value: usize, text: String) -> Cell {
    if index == 0 {
        Cell::new(text).add_attribute(Attribute::Bold)
    } else if index < first_value {
        dim_cell(text)
    } else if text.starts_with('[') {
        Cell::new(text).fg(Color::DarkGrey)
    } else {
        Cell::new(text)
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
