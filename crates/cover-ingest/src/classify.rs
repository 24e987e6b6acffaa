//! Structural classification of published sheets.
//!
//! Sheets are named after their table in the publication, e.g.
//! `T4a_UTLA12m` or `T14_RegDTaP24m_2024-to-2025`. Exported files often
//! put the publication name first, as in
//! `cover-anual-data-tables-2024-to-2025_T10_Eng24m`. The table number
//! selects the layout; the rest of the name carries the cohort, the subject
//! (a vaccine or program) and sometimes the reporting period. The header shape
//! is then checked against the layout so a misnamed sheet fails instead of
//! being read with the wrong axes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use cover_model::{KeyField, LayoutType, RawSheet, normalize_period_label};

use crate::columns::key_field;
use crate::error::{IngestError, Result};

/// Table token at the start of the name or after a separator.
static SHEET_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[_\-\s])T(\d+)([ab])?_(.*)$").expect("Invalid sheet name regex")
});

static TRAILING_PERIOD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[_\-\s]*(\d{4})\s*(?:[_\-\s]*to[_\-\s]*|[\-/_])\s*(\d{2}|\d{4})[_\-\s]*$")
        .expect("Invalid period regex")
});

static PREFIX_PERIOD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{4})\s*(?:[_\-\s]*to[_\-\s]*|[\-/])\s*(\d{4}|\d{2})(?:\D|$)")
        .expect("Invalid period regex")
});

static COHORT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)([my])$").expect("Invalid cohort regex"));

/// Geography prefixes that precede the subject token.
const GEOGRAPHY_PREFIXES: &[&str] = &["UTLA", "UK", "Eng", "Reg", "LA"];

/// Rows scanned for header-shape verification.
const HEADER_SCAN_ROWS: usize = 40;

/// Which half of a paired table a sheet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetVariant {
    /// `a` sheets: coverage percentages.
    Percentages,
    /// `b` sheets: vaccinated counts.
    Counts,
}

impl fmt::Display for SheetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Percentages => "a",
            Self::Counts => "b",
        })
    }
}

/// Everything the sheet name says about a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetDescriptor {
    pub name: String,
    pub table: u32,
    pub variant: Option<SheetVariant>,
    pub layout: LayoutType,
    /// Cohort age from a `12m` / `5y` token.
    pub cohort_months: Option<u32>,
    /// Vaccine or program token, e.g. `DTaP`, `MMR`, `HepB`.
    pub subject: Option<String>,
    /// Period key when the name embeds a year range.
    pub period: Option<String>,
}

/// A sheet name split around its `T<n>[ab]_` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableToken<'a> {
    pub table: u32,
    pub variant: Option<SheetVariant>,
    /// Text before the token, e.g. a publication name.
    pub prefix: &'a str,
    /// Text after the token.
    pub rest: &'a str,
}

pub(crate) fn table_token(name: &str) -> Option<TableToken<'_>> {
    let name = name.trim();
    let captures = SHEET_NAME_REGEX.captures(name)?;
    let table = captures.get(1)?.as_str().parse().ok()?;
    let variant = captures.get(2).map(|variant| {
        if variant.as_str().eq_ignore_ascii_case("b") {
            SheetVariant::Counts
        } else {
            SheetVariant::Percentages
        }
    });
    Some(TableToken {
        table,
        variant,
        prefix: &name[..captures.get(0)?.start()],
        rest: captures.get(3).map_or("", |rest| rest.as_str()),
    })
}

/// Layout published under a table number.
pub fn layout_for_table(table: u32) -> Option<LayoutType> {
    match table {
        1..=3 => Some(LayoutType::SnapshotByNation),
        4..=6 => Some(LayoutType::SnapshotByLocalArea),
        7 | 8 => Some(LayoutType::SpecialProgram),
        9..=13 => Some(LayoutType::HistoricalByYear),
        14 | 15 => Some(LayoutType::HistoricalByRegionColumns),
        _ => None,
    }
}

/// Reads the sheet name alone.
pub fn describe_sheet_name(name: &str) -> Result<SheetDescriptor> {
    let unrecognized = || IngestError::UnrecognizedLayout {
        sheet: name.to_string(),
    };
    let token = table_token(name).ok_or_else(unrecognized)?;
    let layout = layout_for_table(token.table).ok_or_else(unrecognized)?;

    let mut rest = token.rest.to_string();

    let mut period = None;
    if let Some(found) = TRAILING_PERIOD_REGEX.captures(&rest) {
        let label = format!("{} to {}", &found[1], &found[2]);
        period = normalize_period_label(&label);
        let start = found.get(0).map_or(rest.len(), |whole| whole.start());
        rest.truncate(start);
    }
    if period.is_none()
        && let Some(found) = PREFIX_PERIOD_REGEX.captures(token.prefix)
    {
        period = normalize_period_label(&format!("{} to {}", &found[1], &found[2]));
    }

    let mut cohort_months = None;
    if let Some(found) = COHORT_TOKEN_REGEX.captures(&rest) {
        let amount: Option<u32> = found[1].parse().ok();
        let months = if found[2].eq_ignore_ascii_case("y") {
            amount.and_then(|years| years.checked_mul(12))
        } else {
            amount
        };
        if months.is_some() {
            cohort_months = months;
            let start = found.get(0).map_or(rest.len(), |whole| whole.start());
            rest.truncate(start);
        }
    }

    let mut subject = rest.trim_matches(['_', '-', ' ']).to_string();
    for prefix in GEOGRAPHY_PREFIXES {
        if let Some(head) = subject.get(..prefix.len())
            && head.eq_ignore_ascii_case(prefix)
        {
            subject = subject[prefix.len()..].trim_matches(['_', '-', ' ']).to_string();
            break;
        }
    }

    Ok(SheetDescriptor {
        name: name.to_string(),
        table: token.table,
        variant: token.variant,
        layout,
        cohort_months,
        subject: (!subject.is_empty()).then_some(subject),
        period,
    })
}

/// Axis named by the first identifier column of a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowAxis {
    Area,
    Period,
}

fn header_axis(sheet: &RawSheet) -> Option<RowAxis> {
    sheet
        .rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .filter(|row| row.iter().filter(|cell| !cell.is_empty()).count() >= 2)
        .find_map(|row| {
            row.iter().find_map(|cell| match key_field(cell) {
                Some(KeyField::AreaCode | KeyField::AreaName) => Some(RowAxis::Area),
                Some(KeyField::Period) => Some(RowAxis::Period),
                _ => None,
            })
        })
}

/// Classifies a sheet from its name and checks the header shape agrees.
///
/// A sheet without any recognizable identifier header passes this check;
/// the table locator reports it instead.
pub fn classify(sheet: &RawSheet) -> Result<SheetDescriptor> {
    let descriptor = describe_sheet_name(&sheet.name)?;
    let expected = if descriptor.layout.is_time_series() {
        RowAxis::Period
    } else {
        RowAxis::Area
    };
    match header_axis(sheet) {
        Some(found) if found != expected => Err(IngestError::ShapeMismatch {
            sheet: sheet.name.clone(),
            layout: descriptor.layout,
            reason: match expected {
                RowAxis::Period => "its rows are keyed by area, not by period".to_string(),
                RowAxis::Area => "its rows are keyed by period, not by area".to_string(),
            },
        }),
        _ => {
            tracing::debug!(
                sheet = %sheet.name,
                layout = %descriptor.layout,
                table = descriptor.table,
                cohort_months = ?descriptor.cohort_months,
                subject = ?descriptor.subject,
                "classified sheet"
            );
            Ok(descriptor)
        }
    }
}
