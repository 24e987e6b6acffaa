//! The store abstraction shared by loaders and the table reconstructor.

use cover_model::{CoverageRecord, LayoutType, LoadScope};

use crate::error::Result;

/// Read filter for [`CoverageStore::query`]. Unset fields match anything;
/// empty lists match any area or category.
///
/// The series matches exactly, as in [`LoadScope`]: the default filter reads
/// the main tables and never a single-subject series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub layout: Option<LayoutType>,
    pub series: Option<String>,
    pub cohort: Option<String>,
    pub period: Option<String>,
    pub areas: Vec<String>,
    pub categories: Vec<String>,
}

impl RecordFilter {
    pub fn for_layout(layout: LayoutType) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: Option<String>) -> Self {
        self.series = series;
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
    pub fn with_areas(mut self, areas: Vec<String>) -> Self {
        self.areas = areas;
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn matches(&self, record: &CoverageRecord) -> bool {
        self.layout.is_none_or(|layout| layout == record.layout)
            && self.series == record.series
            && self
                .cohort
                .as_deref()
                .is_none_or(|cohort| cohort == record.key.cohort)
            && self
                .period
                .as_deref()
                .is_none_or(|period| period == record.key.period)
            && (self.areas.is_empty() || self.areas.contains(&record.key.area_code))
            && (self.categories.is_empty() || self.categories.contains(&record.key.category_code))
    }
}

/// Writes staged inside one store transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every write made through it.
pub trait StoreTransaction {
    /// Removes every record inside `scope`, returning how many were removed.
    fn delete_scope(&mut self, scope: &LoadScope) -> Result<usize>;

    /// Inserts the record or replaces the one stored under the same layout
    /// and key.
    fn upsert(&mut self, record: &CoverageRecord) -> Result<()>;

    fn commit(self) -> Result<()>;
}

/// A persistent collection of coverage records.
pub trait CoverageStore {
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    fn begin(&mut self) -> Result<Self::Transaction<'_>>;

    /// Committed records matching `filter`, ordered by layout and key.
    fn query(&self, filter: &RecordFilter) -> Result<Vec<CoverageRecord>>;

    /// Number of committed records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
