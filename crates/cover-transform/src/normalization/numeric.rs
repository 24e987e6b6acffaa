//! Cell value cleaning.
//!
//! Published cells mix plain numbers with thousands separators, percent
//! signs, suppression markers such as `[c]`, ranges such as `35% to 69%`,
//! and inline note references. [`ValueCleaner::clean`] maps every input to a
//! [`CleanedValue`] and never fails.

use std::sync::LazyLock;

use regex::Regex;

use cover_model::{CleanedValue, MarkerKind, MarkerTable};

use super::header::strip_note_references;

static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*%?\s*to\s*(\d+(?:\.\d+)?)\s*%$").expect("Invalid range regex")
});

static BRACKET_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Za-z]\]").expect("Invalid marker regex"));

/// Placeholders that mean "no value" without being suppression markers.
const BLANK_TOKENS: &[&str] = &["-", "\u{2013}", "\u{2014}", "n/a", "na", "..", ":"];

/// Cleans raw cell text against a marker table.
#[derive(Debug, Clone, Default)]
pub struct ValueCleaner {
    markers: MarkerTable,
}

impl ValueCleaner {
    pub fn new(markers: MarkerTable) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    /// Cleans one cell.
    ///
    /// Rules apply in order: blank text is missing; a marker anywhere in the
    /// cell suppresses it and any residual digits are discarded; `X% to Y%`
    /// is a range; otherwise separators, note references and a trailing
    /// percent sign are removed and the rest is parsed as a number. Text
    /// that still does not parse is missing.
    pub fn clean(&self, raw: &str) -> CleanedValue {
        let value = raw.trim().trim_matches('\u{feff}').trim();
        if value.is_empty() || is_blank_like(value) {
            return CleanedValue::Missing;
        }
        if let Some((kind, token)) = self.find_marker(value) {
            return CleanedValue::Suppressed { kind, token };
        }
        let without_notes = strip_note_references(value);
        if let Some(range) = parse_range(&without_notes) {
            return range;
        }
        match parse_number(&without_notes) {
            Some(number) => CleanedValue::number(number),
            None => CleanedValue::Missing,
        }
    }

    /// Kind of the first marker in the cell, with the marker text as the
    /// cell spells it.
    fn find_marker(&self, value: &str) -> Option<(MarkerKind, String)> {
        if let Some(marker) = self.markers.lookup(value) {
            return Some((marker.kind, value.to_string()));
        }
        let folded = value.to_ascii_lowercase();
        for marker in self.markers.markers() {
            let token = marker.token.to_ascii_lowercase();
            if token.is_empty() {
                continue;
            }
            if let Some(start) = folded.find(&token)
                && let Some(written) = value.get(start..start + token.len())
            {
                return Some((marker.kind, written.to_string()));
            }
        }
        BRACKET_MARKER_REGEX
            .find(value)
            .map(|found| (MarkerKind::Unrecognized, found.as_str().to_string()))
    }
}

/// True for placeholders such as "-" or "n/a" that carry no value.
pub fn is_blank_like(raw: &str) -> bool {
    let value = raw.trim();
    value.is_empty()
        || BLANK_TOKENS
            .iter()
            .any(|token| token.eq_ignore_ascii_case(value))
}

fn parse_range(value: &str) -> Option<CleanedValue> {
    let captures = RANGE_REGEX.captures(value)?;
    let first: f64 = captures.get(1)?.as_str().parse().ok()?;
    let second: f64 = captures.get(2)?.as_str().parse().ok()?;
    Some(CleanedValue::Range {
        low: first.min(second),
        high: first.max(second),
        text: value.to_string(),
    })
}

/// Parses a published number: thousands separators and a trailing percent
/// sign are ignored. Non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|ch| *ch != ',').collect();
    let trimmed = stripped.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }
    let number: f64 = trimmed.parse().ok()?;
    number.is_finite().then_some(number)
}
