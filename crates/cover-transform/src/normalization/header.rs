//! Column header normalization.
//!
//! Value-column headers carry publication decoration around the category
//! name: "Coverage at 12 months DTaP/IPV/Hib/HepB (%)", "Coverage of MMR1 (%)",
//! "PCV1 Prim [note 7]". [`HeaderRules`] removes that decoration so the
//! remaining label can be matched against the category vocabulary.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::TransformError;

static NOTE_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[note\s*(\d+)\]").expect("Invalid note regex"));

static AGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(months?|years?|m|y)\b").expect("Invalid age regex")
});

pub const DEFAULT_PREFIXES: &[&str] = &[
    r"^coverage\s+at\s+\d+\s+(months?|years?)\s+",
    r"^coverage\s+of\s+",
    r"^number\s+aged\s+\d+\s+(months?|years?)\s+(vaccinated\s+(with\s+)?)?",
    r"^percentage\s+(vaccinated\s+(with\s+)?)?",
];

pub const DEFAULT_SUFFIXES: &[&str] = &[r"\s*\(%\)$", r"\s*%$", r"\s+prim$"];

/// Ordered prefix and suffix patterns stripped from value-column headers.
#[derive(Debug, Clone)]
pub struct HeaderRules {
    prefixes: Vec<Regex>,
    suffixes: Vec<Regex>,
}

impl HeaderRules {
    /// Compiles case-insensitive patterns.
    pub fn new<S: AsRef<str>>(prefixes: &[S], suffixes: &[S]) -> Result<Self, TransformError> {
        Ok(Self {
            prefixes: compile_all(prefixes)?,
            suffixes: compile_all(suffixes)?,
        })
    }

    /// Returns the category part of a header.
    ///
    /// Note references are dropped first, then every matching prefix and
    /// suffix, and whitespace is collapsed. The result may be empty when the
    /// header is pure decoration such as "Number aged 12 months".
    pub fn category_label(&self, header: &str) -> String {
        let mut label = collapse_whitespace(&strip_note_references(header));
        loop {
            let before = label.len();
            for pattern in &self.prefixes {
                label = pattern.replace(&label, "").trim().to_string();
            }
            for pattern in &self.suffixes {
                label = pattern.replace(&label, "").trim().to_string();
            }
            if label.len() == before {
                break;
            }
        }
        label
    }
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            prefixes: compile_all(DEFAULT_PREFIXES).unwrap_or_default(),
            suffixes: compile_all(DEFAULT_SUFFIXES).unwrap_or_default(),
        }
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, TransformError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern.as_ref())
                .case_insensitive(true)
                .build()
                .map_err(|source| TransformError::InvalidPattern {
                    pattern: pattern.as_ref().to_string(),
                    source,
                })
        })
        .collect()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes `[note N]` references and tidies the surrounding whitespace.
pub fn strip_note_references(raw: &str) -> String {
    collapse_whitespace(&NOTE_REF_REGEX.replace_all(raw, " "))
}

/// First `[note N]` reference in the text, normalized to `[note N]`.
pub fn note_reference(raw: &str) -> Option<String> {
    NOTE_REF_REGEX
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|number| format!("[note {}]", number.as_str()))
}

/// Age in months mentioned in a header or sheet token, e.g. "aged 5 years"
/// or "24m".
pub fn age_in_months(raw: &str) -> Option<u32> {
    let captures = AGE_REGEX.captures(raw)?;
    let amount: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();
    if unit.starts_with('y') {
        amount.checked_mul(12)
    } else {
        Some(amount)
    }
}

/// Measure implied by header wording in cohort-grouped layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureHint {
    Eligible,
    Vaccinated,
    Coverage,
}

pub fn measure_hint(header: &str) -> Option<MeasureHint> {
    let lowered = header.to_lowercase();
    if lowered.contains("eligible") {
        Some(MeasureHint::Eligible)
    } else if lowered.contains("vaccinated") {
        Some(MeasureHint::Vaccinated)
    } else if lowered.contains("coverage") || lowered.contains('%') {
        Some(MeasureHint::Coverage)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_publication_decoration() {
        let rules = HeaderRules::default();
        assert_eq!(
            rules.category_label("Coverage at 12 months DTaP/IPV/Hib/HepB (%)"),
            "DTaP/IPV/Hib/HepB"
        );
        assert_eq!(rules.category_label("Coverage of MMR1 (%)"), "MMR1");
        assert_eq!(rules.category_label("PCV1 Prim [note 7]"), "PCV1");
        assert_eq!(
            rules.category_label("Number aged 24 months vaccinated with MMR1"),
            "MMR1"
        );
        assert_eq!(rules.category_label("Number aged 12 months"), "Number aged 12 months");
        assert_eq!(rules.category_label("  Rotavirus  "), "Rotavirus");
    }

    #[test]
    fn custom_rules_are_case_insensitive() {
        let rules = HeaderRules::new(&[r"^uptake of\s+"], &[r"\s+total$"]).unwrap();
        assert_eq!(rules.category_label("UPTAKE OF MenB Total"), "MenB");
        assert!(HeaderRules::new(&["("], &[]).is_err());
    }

    #[test]
    fn reads_note_references_and_ages() {
        assert_eq!(note_reference("England [Note 23]").as_deref(), Some("[note 23]"));
        assert_eq!(note_reference("England"), None);
        assert_eq!(strip_note_references("City of London [note 18]"), "City of London");
        assert_eq!(age_in_months("Coverage at 12 months (%)"), Some(12));
        assert_eq!(age_in_months("T3_UK5y"), None);
        assert_eq!(age_in_months("aged 5 years"), Some(60));
        assert_eq!(age_in_months("24m"), Some(24));
    }

    #[test]
    fn measure_hints() {
        assert_eq!(
            measure_hint("Number aged 12 months eligible"),
            Some(MeasureHint::Eligible)
        );
        assert_eq!(
            measure_hint("Number aged 12 months vaccinated"),
            Some(MeasureHint::Vaccinated)
        );
        assert_eq!(
            measure_hint("Coverage at 12 months (%)"),
            Some(MeasureHint::Coverage)
        );
        assert_eq!(measure_hint("Local authority"), None);
    }
}
