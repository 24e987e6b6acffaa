//! Recognition of identifier column headers.

use std::sync::LazyLock;

use regex::Regex;

use cover_model::KeyField;
use cover_transform::strip_note_references;

static POPULATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(number\s+aged\s+\d+\s+(months?|years?)|eligible\s+population|population|denominator)$")
        .expect("Invalid population regex")
});

const AREA_CODE_HEADERS: &[&str] = &[
    "code",
    "area code",
    "ons code",
    "la code",
    "utla code",
    "geography code",
    "country code",
];

const AREA_NAME_HEADERS: &[&str] = &[
    "area",
    "area name",
    "geographic area",
    "geography",
    "local authority",
    "local authority name",
    "upper tier local authority",
    "utla",
    "utla name",
    "country",
    "nation",
    "name",
];

const PARENT_HEADERS: &[&str] = &["region", "region name", "region code", "parent", "parent area"];

const PERIOD_HEADERS: &[&str] = &["financial year", "year", "period", "reporting year"];

const NOTE_HEADERS: &[&str] = &["note", "notes"];

/// Lowercased header with note references and extra whitespace removed.
pub fn normalize_header(raw: &str) -> String {
    strip_note_references(raw).to_lowercase()
}

/// Identifier field named by a header, if any.
///
/// An unqualified "Number aged 12 months" is the row's eligible population.
pub fn key_field(header: &str) -> Option<KeyField> {
    let normalized = normalize_header(header);
    if normalized.is_empty() {
        return None;
    }
    if normalized.split(|ch: char| !ch.is_alphanumeric()).any(|word| word == "ods") {
        return Some(KeyField::Auxiliary);
    }
    let field = if AREA_CODE_HEADERS.contains(&normalized.as_str()) {
        KeyField::AreaCode
    } else if AREA_NAME_HEADERS.contains(&normalized.as_str()) {
        KeyField::AreaName
    } else if PARENT_HEADERS.contains(&normalized.as_str()) {
        KeyField::ParentArea
    } else if PERIOD_HEADERS.contains(&normalized.as_str()) {
        KeyField::Period
    } else if NOTE_HEADERS.contains(&normalized.as_str()) {
        KeyField::Note
    } else if POPULATION_REGEX.is_match(&normalized) {
        KeyField::Denominator
    } else {
        return None;
    };
    Some(field)
}
