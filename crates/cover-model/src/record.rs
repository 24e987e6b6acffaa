//! The normalized coverage fact.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::layout::LayoutType;

/// Natural key of a coverage fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub area_code: String,
    pub category_code: String,
    pub cohort: String,
    pub period: String,
}

impl RecordKey {
    pub fn new(
        area_code: impl Into<String>,
        category_code: impl Into<String>,
        cohort: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            area_code: area_code.into(),
            category_code: category_code.into(),
            cohort: cohort.into(),
            period: period.into(),
        }
    }
}

/// One coverage measurement for an area, category, cohort and period.
///
/// Records are partitioned by the layout they were published in and, within
/// a layout, by series, so the same key may exist once per partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub layout: LayoutType,
    /// Single-subject series the record was published in, e.g. `MMR1` for
    /// `T13_EngMMR24m`. `None` for a layout's main tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub key: RecordKey,
    pub numerator: Option<f64>,
    pub denominator: Option<f64>,
    pub percentage: Option<f64>,
    pub suppressed: bool,
    pub confidential: bool,
    /// Published text for suppressed cells, e.g. `[c]` or `35% to 69%`.
    pub display_token: Option<String>,
    pub note: Option<String>,
}

impl CoverageRecord {
    pub fn new(layout: LayoutType, key: RecordKey) -> Self {
        Self {
            layout,
            series: None,
            key,
            numerator: None,
            denominator: None,
            percentage: None,
            suppressed: false,
            confidential: false,
            display_token: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: Option<String>) -> Self {
        self.series = series;
        self
    }

    /// Percentage implied by the counts, when both are present and the
    /// denominator is positive.
    pub fn computed_percentage(&self) -> Option<f64> {
        match (self.numerator, self.denominator) {
            (Some(numerator), Some(denominator)) if denominator > 0.0 => {
                Some(100.0 * numerator / denominator)
            }
            _ => None,
        }
    }

    /// Checks the record invariants.
    ///
    /// `tolerance` bounds the allowed difference, in percentage points,
    /// between a published percentage and the one implied by the counts.
    pub fn validate(&self, tolerance: f64) -> Result<(), ValidationError> {
        if self.suppressed && (self.numerator.is_some() || self.denominator.is_some()) {
            return Err(ValidationError::SuppressedWithCounts);
        }
        for (field, value) in [("numerator", self.numerator), ("denominator", self.denominator)] {
            if let Some(value) = value
                && (value < 0.0 || !value.is_finite())
            {
                return Err(ValidationError::NegativeCount { field, value });
            }
        }
        if let (Some(numerator), Some(denominator)) = (self.numerator, self.denominator)
            && numerator > denominator
        {
            return Err(ValidationError::NumeratorExceedsDenominator {
                numerator,
                denominator,
            });
        }
        if let Some(value) = self.percentage {
            if !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::PercentageOutOfRange { value });
            }
            if let Some(expected) = self.computed_percentage()
                && (expected - value).abs() > tolerance + f64::EPSILON * 100.0
            {
                return Err(ValidationError::InconsistentPercentage {
                    expected,
                    actual: value,
                });
            }
        }
        Ok(())
    }
}
