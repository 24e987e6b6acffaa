//! Merging cleaned cells into coverage records.
//!
//! Several cells can describe one record: a percentage and a count on
//! paired sheets, or the eligible / vaccinated / coverage columns of a
//! special-program cohort. Cells are collected per key and turned into
//! records once the whole sheet has been read.

use std::collections::BTreeMap;

use cover_model::{
    CleanedValue, CoverageRecord, LayoutType, LoadReport, MarkerKind, Measure, RecordKey,
    RowError, RowErrorKind,
};
use cover_standards::RangePolicy;

/// A withheld value and the text shown in its place.
#[derive(Debug, Clone, PartialEq)]
struct Withheld {
    token: String,
    confidential: bool,
}

#[derive(Debug, Clone, Default)]
struct Draft {
    /// 0-based sheet row the record was first seen on.
    row: usize,
    label: String,
    numerator: Option<f64>,
    denominator: Option<f64>,
    percentage: Option<f64>,
    /// Suppression of the percentage cell.
    withheld: Option<Withheld>,
    /// Suppression of a count cell; only used when nothing else is known.
    withheld_count: Option<Withheld>,
    note: Option<String>,
}

/// Records under construction for one sheet load.
#[derive(Debug)]
pub struct RecordBuilder {
    layout: LayoutType,
    series: Option<String>,
    range_policy: RangePolicy,
    drafts: BTreeMap<RecordKey, Draft>,
}

impl RecordBuilder {
    pub fn new(layout: LayoutType, range_policy: RangePolicy) -> Self {
        Self {
            layout,
            series: None,
            range_policy,
            drafts: BTreeMap::new(),
        }
    }

    /// Builds records for a single-subject series instead of the main tables.
    #[must_use]
    pub fn with_series(mut self, series: Option<String>) -> Self {
        self.series = series;
        self
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Adds one cleaned cell. Blank cells leave no trace.
    pub fn add_cell(
        &mut self,
        key: RecordKey,
        row: usize,
        label: &str,
        measure: Measure,
        value: CleanedValue,
    ) {
        let number = match value {
            CleanedValue::Missing => return,
            CleanedValue::Number { value } => Some(value),
            CleanedValue::Range { low, high, text } => match self.range_policy {
                RangePolicy::Midpoint => Some((low + high) / 2.0),
                RangePolicy::Suppress => {
                    self.withhold(key, row, label, measure, text, false);
                    return;
                }
            },
            CleanedValue::Suppressed { kind, token } => {
                let confidential = kind == MarkerKind::Confidential;
                self.withhold(key, row, label, measure, token, confidential);
                return;
            }
        };
        let draft = self.draft(key, row, label);
        match measure {
            Measure::Percentage => draft.percentage = number,
            Measure::Numerator => draft.numerator = number,
            Measure::Denominator => draft.denominator = number,
        }
    }

    /// Row-level eligible population, applied to the given records when
    /// they carry no denominator of their own.
    pub fn apply_denominator(&mut self, keys: &[RecordKey], denominator: f64) {
        for key in keys {
            if let Some(draft) = self.drafts.get_mut(key) {
                draft.denominator.get_or_insert(denominator);
            }
        }
    }

    /// Row-level note; the first note seen for a record wins.
    pub fn apply_note(&mut self, keys: &[RecordKey], note: &str) {
        for key in keys {
            if let Some(draft) = self.drafts.get_mut(key) {
                draft.note.get_or_insert_with(|| note.to_string());
            }
        }
    }

    /// Validates and returns the finished records in key order.
    ///
    /// Records that break an invariant are reported and left out.
    pub fn finish(self, tolerance: f64, report: &mut LoadReport) -> Vec<CoverageRecord> {
        let mut records = Vec::with_capacity(self.drafts.len());
        for (key, draft) in self.drafts {
            let row = draft.row;
            let label = draft.label.clone();
            let Some(record) = build_record(self.layout, key, draft) else {
                continue;
            };
            let record = record.with_series(self.series.clone());
            match record.validate(tolerance) {
                Ok(()) => records.push(record),
                Err(error) => report.skip(RowError::row(
                    row,
                    RowErrorKind::Invalid { error },
                    label,
                )),
            }
        }
        records
    }

    fn draft(&mut self, key: RecordKey, row: usize, label: &str) -> &mut Draft {
        self.drafts.entry(key).or_insert_with(|| Draft {
            row,
            label: label.to_string(),
            ..Draft::default()
        })
    }

    fn withhold(
        &mut self,
        key: RecordKey,
        row: usize,
        label: &str,
        measure: Measure,
        token: String,
        confidential: bool,
    ) {
        let withheld = Withheld {
            token,
            confidential,
        };
        let draft = self.draft(key, row, label);
        match measure {
            Measure::Percentage => draft.withheld = Some(withheld),
            Measure::Numerator | Measure::Denominator => {
                draft.withheld_count.get_or_insert(withheld);
            }
        }
    }
}

fn build_record(layout: LayoutType, key: RecordKey, draft: Draft) -> Option<CoverageRecord> {
    let mut record = CoverageRecord::new(layout, key);
    record.note = draft.note;

    let withheld = draft.withheld.or_else(|| {
        (draft.percentage.is_none() && draft.numerator.is_none())
            .then_some(draft.withheld_count)
            .flatten()
    });
    if let Some(withheld) = withheld {
        record.suppressed = true;
        record.confidential = withheld.confidential;
        record.display_token = Some(withheld.token);
        return Some(record);
    }

    if draft.percentage.is_none() && draft.numerator.is_none() {
        return None;
    }
    record.numerator = draft.numerator;
    record.denominator = draft.denominator;
    record.percentage = draft.percentage;
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(area: &str) -> RecordKey {
        RecordKey::new(area, "MMR1", "24 months", "2024-2025")
    }

    fn report() -> LoadReport {
        LoadReport::new(
            "T5a_UTLA24m",
            cover_model::LoadScope::new(LayoutType::SnapshotByLocalArea),
            "",
        )
    }

    #[test]
    fn merges_percentage_and_counts() {
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(key("E09000033"), 7, "Westminster", Measure::Percentage, CleanedValue::number(78.5));
        builder.add_cell(key("E09000033"), 7, "Westminster", Measure::Numerator, CleanedValue::number(1963.0));
        builder.apply_denominator(&[key("E09000033")], 2500.0);
        let records = builder.finish(0.1, &mut report());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].numerator, Some(1963.0));
        assert_eq!(records[0].denominator, Some(2500.0));
        assert_eq!(records[0].percentage, Some(78.5));
    }

    #[test]
    fn suppressed_percentage_drops_counts() {
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(
            key("E09000001"),
            8,
            "City of London",
            Measure::Percentage,
            CleanedValue::Suppressed {
                kind: MarkerKind::Confidential,
                token: "[c]".to_string(),
            },
        );
        builder.add_cell(key("E09000001"), 8, "City of London", Measure::Numerator, CleanedValue::number(4.0));
        builder.apply_denominator(&[key("E09000001")], 6.0);
        let records = builder.finish(0.1, &mut report());
        assert!(records[0].suppressed);
        assert!(records[0].confidential);
        assert_eq!(records[0].numerator, None);
        assert_eq!(records[0].denominator, None);
        assert_eq!(records[0].display_token.as_deref(), Some("[c]"));
    }

    #[test]
    fn suppressed_count_keeps_published_percentage() {
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(key("E09000001"), 8, "City of London", Measure::Percentage, CleanedValue::number(90.0));
        builder.add_cell(
            key("E09000001"),
            8,
            "City of London",
            Measure::Numerator,
            CleanedValue::Suppressed {
                kind: MarkerKind::Confidential,
                token: "[c]".to_string(),
            },
        );
        let records = builder.finish(0.1, &mut report());
        assert!(!records[0].suppressed);
        assert_eq!(records[0].percentage, Some(90.0));
    }

    #[test]
    fn range_follows_policy() {
        let range = || CleanedValue::Range {
            low: 35.0,
            high: 69.0,
            text: "35% to 69%".to_string(),
        };
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(key("E09000001"), 8, "City of London", Measure::Percentage, range());
        let records = builder.finish(0.1, &mut report());
        assert!(records[0].suppressed);
        assert!(!records[0].confidential);
        assert_eq!(records[0].display_token.as_deref(), Some("35% to 69%"));

        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Midpoint);
        builder.add_cell(key("E09000001"), 8, "City of London", Measure::Percentage, range());
        let records = builder.finish(0.1, &mut report());
        assert!(!records[0].suppressed);
        assert_eq!(records[0].percentage, Some(52.0));
    }

    #[test]
    fn invalid_records_are_reported_not_clamped() {
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(key("E09000007"), 9, "Camden", Measure::Percentage, CleanedValue::number(104.2));
        builder.add_cell(key("E09000033"), 10, "Westminster", Measure::Percentage, CleanedValue::number(90.0));
        builder.add_cell(key("E09000033"), 10, "Westminster", Measure::Numerator, CleanedValue::Missing);
        let mut report = report();
        let records = builder.finish(0.1, &mut report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].numerator, None);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors[0].row, Some(10));
        assert_eq!(report.errors[0].raw, "Camden");
    }

    #[test]
    fn denominator_alone_makes_no_record() {
        let mut builder = RecordBuilder::new(LayoutType::SnapshotByLocalArea, RangePolicy::Suppress);
        builder.add_cell(key("E09000007"), 9, "Camden", Measure::Denominator, CleanedValue::number(2000.0));
        assert_eq!(builder.len(), 1);
        assert!(builder.finish(0.1, &mut report()).is_empty());
    }
}
