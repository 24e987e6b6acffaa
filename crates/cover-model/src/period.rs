//! Age cohorts and reporting periods.

use serde::{Deserialize, Serialize};

/// Age at which coverage is measured, e.g. "12 months".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub name: String,
    pub age_months: u32,
    pub description: Option<String>,
}

impl Cohort {
    pub fn new(name: impl Into<String>, age_months: u32) -> Self {
        Self {
            name: name.into(),
            age_months,
            description: None,
        }
    }
}

/// A financial year such as `2024-2025`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Canonical key, `YYYY-YYYY`.
    pub key: String,
    /// Label as published, e.g. "2024 to 2025".
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl Period {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            key: format!("{start_year}-{end_year}"),
            label: format!("{start_year} to {end_year}"),
            start_year,
            end_year,
        }
    }

    /// Chronological ordering key.
    pub fn sort_key(&self) -> (i32, i32) {
        (self.start_year, self.end_year)
    }
}

/// Normalizes a financial-year label to its canonical `YYYY-YYYY` key.
///
/// Accepts "2009 to 2010", "2009-2010", "2009/10", "2009-10" and
/// "2009 - 2010". Returns `None` when the text is not a year range.
pub fn normalize_period_label(raw: &str) -> Option<String> {
    let (start, end) = split_years(raw.trim())?;
    Some(format!("{start}-{end}"))
}

fn split_years(value: &str) -> Option<(i32, i32)> {
    let lowered = value.to_lowercase();
    let (left, right) = if let Some(parts) = lowered.split_once(" to ") {
        parts
    } else if let Some(parts) = lowered.split_once('/') {
        parts
    } else {
        lowered.split_once('-')?
    };
    let left = left.trim();
    let right = right.trim();
    if left.len() != 4 || !left.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let start: i32 = left.parse().ok()?;
    if !right.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let end: i32 = match right.len() {
        4 => right.parse().ok()?,
        2 => {
            let century = start - start % 100;
            let short: i32 = right.parse().ok()?;
            let mut end = century + short;
            if end < start {
                end += 100;
            }
            end
        }
        _ => return None,
    };
    if end < start {
        return None;
    }
    Some((start, end))
}
