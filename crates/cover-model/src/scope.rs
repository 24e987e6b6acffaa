use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutType;
use crate::record::{CoverageRecord, RecordKey};

/// The slice of stored facts a single sheet load replaces.
///
/// Unset fields match any value. The series is the exception: it always
/// matches exactly, so a layout's main tables and each single-subject
/// series never share records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadScope {
    pub layout: LayoutType,
    pub series: Option<String>,
    pub cohort: Option<String>,
    pub period: Option<String>,
    pub category: Option<String>,
}

impl LoadScope {
    pub fn new(layout: LayoutType) -> Self {
        Self {
            layout,
            series: None,
            cohort: None,
            period: None,
            category: None,
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    #[must_use]
    pub fn with_cohort(mut self, cohort: impl Into<String>) -> Self {
        self.cohort = Some(cohort.into());
        self
    }

    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn contains(&self, record: &CoverageRecord) -> bool {
        record.layout == self.layout
            && record.series == self.series
            && self.contains_key(&record.key)
    }

    /// Whether a key of this scope's layout falls inside the scope.
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        matches_optional(self.cohort.as_deref(), &key.cohort)
            && matches_optional(self.period.as_deref(), &key.period)
            && matches_optional(self.category.as_deref(), &key.category_code)
    }
}

fn matches_optional(expected: Option<&str>, actual: &str) -> bool {
    expected.is_none_or(|value| value == actual)
}

impl fmt::Display for LoadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.layout)?;
        if let Some(series) = &self.series {
            write!(f, " series={series}")?;
        }
        if let Some(cohort) = &self.cohort {
            write!(f, " cohort={cohort}")?;
        }
        if let Some(period) = &self.period {
            write!(f, " period={period}")?;
        }
        if let Some(category) = &self.category {
            write!(f, " category={category}")?;
        }
        Ok(())
    }
}
