//! Rebuilding publication-shaped tables from stored records.

use std::collections::{BTreeSet, HashMap};

use cover_model::{
    CoverageRecord, DisplayValue, LayoutType, Measure, WideColumn, WideRow, WideTable,
};
use cover_standards::ReferenceData;
use cover_store::{CoverageStore, RecordFilter};
use tracing::debug;

use crate::error::ReconstructError;
use crate::strategy::{KeyPart, default_registry};

/// Which slice of the store to lay out as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructRequest {
    pub layout: LayoutType,
    /// Single-subject series to read instead of the main tables, e.g. `MMR1`.
    pub series: Option<String>,
    pub cohort: Option<String>,
    /// Required when rows are areas.
    pub period: Option<String>,
    /// Required when columns are areas or cohorts.
    pub category: Option<String>,
    /// Restricts area rows; empty keeps all.
    pub areas: Vec<String>,
    /// Restricts category columns; empty keeps all.
    pub categories: Vec<String>,
    /// Figure shown in unsuppressed cells.
    pub measure: Measure,
}

impl ReconstructRequest {
    pub fn new(layout: LayoutType) -> Self {
        Self {
            layout,
            series: None,
            cohort: None,
            period: None,
            category: None,
            areas: Vec::new(),
            categories: Vec::new(),
            measure: Measure::Percentage,
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

    #[must_use]
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }
}

/// Builds the wide table for one slice of the store.
///
/// Rows and columns follow the layout: areas in hierarchy order, periods
/// chronologically, categories in canonical order and cohorts by age.
/// Suppressed records show their published token; absent records show an
/// empty cell.
///
/// # Errors
///
/// Fails when a key part the layout needs is missing or unknown, or when
/// the store cannot be read.
pub fn reconstruct<S: CoverageStore>(
    store: &S,
    reference: &ReferenceData,
    request: &ReconstructRequest,
) -> Result<WideTable, ReconstructError> {
    let layout = request.layout;
    let strategy = default_registry()
        .get(layout)
        .ok_or(ReconstructError::UnsupportedLayout(layout))?;
    let row_part = strategy.row_part();
    let column_part = strategy.column_part();

    if row_part == KeyPart::Area && request.period.is_none() {
        return Err(ReconstructError::PeriodRequired { layout });
    }
    if matches!(column_part, KeyPart::Area | KeyPart::Cohort) && request.category.is_none() {
        return Err(ReconstructError::CategoryRequired { layout });
    }
    if column_part != KeyPart::Cohort && request.cohort.is_none() {
        return Err(ReconstructError::CohortRequired { layout });
    }

    let mut filter = RecordFilter::for_layout(layout).with_areas(request.areas.clone());
    let mut title = vec![layout.description().to_string()];
    if let Some(token) = &request.series {
        // Series that are not a vaccine are stored under their own name.
        let series = category_code(reference, token).unwrap_or_else(|_| token.trim().to_string());
        title.push(format!("{series} series"));
        filter = filter.with_series(Some(series));
    }
    if let Some(name) = &request.cohort {
        let cohort = reference
            .cohort(name)
            .ok_or_else(|| ReconstructError::UnknownCohort(name.clone()))?;
        filter = filter.with_cohort(&cohort.name);
        title.push(cohort.name.clone());
    }
    if let Some(label) = &request.period {
        let period = reference
            .period(label)
            .ok_or_else(|| ReconstructError::UnknownPeriod(label.clone()))?;
        filter = filter.with_period(&period.key);
        title.push(period.label.clone());
    }
    let mut categories = request
        .categories
        .iter()
        .map(|token| category_code(reference, token))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(token) = &request.category {
        let code = category_code(reference, token)?;
        if column_part != KeyPart::Category {
            title.push(code.clone());
        }
        categories.push(code);
    }
    filter = filter.with_categories(categories);

    let records = store.query(&filter)?;
    debug!(%layout, records = records.len(), "reconstructing table");

    let row_keys = ordered_keys(reference, row_part, &records);
    let column_keys = ordered_keys(reference, column_part, &records);
    let by_cell: HashMap<(&str, &str), &CoverageRecord> = records
        .iter()
        .map(|record| {
            (
                (row_part.of(&record.key), column_part.of(&record.key)),
                record,
            )
        })
        .collect();

    let rows = row_keys
        .iter()
        .map(|row_key| {
            let cells: Vec<&CoverageRecord> = column_keys
                .iter()
                .filter_map(|column_key| {
                    by_cell.get(&(row_key.as_str(), column_key.as_str())).copied()
                })
                .collect();
            WideRow {
                key: row_key.clone(),
                label: label_for(reference, row_part, row_key),
                note: cells.iter().find_map(|record| record.note.clone()),
                cells: column_keys
                    .iter()
                    .map(|column_key| {
                        by_cell
                            .get(&(row_key.as_str(), column_key.as_str()))
                            .map_or(DisplayValue::Empty, |record| {
                                display(record, request.measure)
                            })
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(WideTable {
        title: title.join(", "),
        row_heading: match row_part {
            KeyPart::Period => "Financial year".to_string(),
            _ => "Area".to_string(),
        },
        columns: column_keys
            .iter()
            .map(|code| WideColumn {
                code: code.clone(),
                label: label_for(reference, column_part, code),
            })
            .collect(),
        rows,
    })
}

/// Accepts a category code or its published name.
fn category_code(reference: &ReferenceData, token: &str) -> Result<String, ReconstructError> {
    let token = token.trim();
    reference
        .category(token)
        .or_else(|| {
            reference
                .categories()
                .iter()
                .find(|category| category.name.eq_ignore_ascii_case(token))
        })
        .map(|category| category.code.clone())
        .ok_or_else(|| ReconstructError::UnknownCategory(token.to_string()))
}

/// Distinct values of one key part, in publication order.
fn ordered_keys(
    reference: &ReferenceData,
    part: KeyPart,
    records: &[CoverageRecord],
) -> Vec<String> {
    let distinct: BTreeSet<&str> = records.iter().map(|record| part.of(&record.key)).collect();
    let mut keys: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    match part {
        KeyPart::Area => keys.sort_by_cached_key(|code| {
            let order = reference.area_order(code);
            (order.is_none(), order)
        }),
        KeyPart::Period => {
            keys.sort_by_cached_key(|key| reference.period(key).map(|period| period.sort_key()));
        }
        KeyPart::Category => keys.sort_by_cached_key(|code| {
            reference
                .category(code)
                .map_or(usize::MAX, |category| category.ordinal)
        }),
        KeyPart::Cohort => keys.sort_by_cached_key(|name| {
            reference
                .cohort(name)
                .map_or(u32::MAX, |cohort| cohort.age_months)
        }),
    }
    keys
}

fn label_for(reference: &ReferenceData, part: KeyPart, key: &str) -> String {
    let label = match part {
        KeyPart::Area => reference.area(key).map(|area| area.name.clone()),
        KeyPart::Period => reference.period(key).map(|period| period.label.clone()),
        KeyPart::Category => reference.category(key).map(|category| category.name.clone()),
        KeyPart::Cohort => None,
    };
    label.unwrap_or_else(|| key.to_string())
}

fn display(record: &CoverageRecord, measure: Measure) -> DisplayValue {
    if record.suppressed {
        return record
            .display_token
            .clone()
            .map_or(DisplayValue::Empty, DisplayValue::Token);
    }
    let value = match measure {
        Measure::Percentage => record.percentage,
        Measure::Numerator => record.numerator,
        Measure::Denominator => record.denominator,
    };
    value.map_or(DisplayValue::Empty, DisplayValue::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cover_model::RecordKey;
    use cover_standards::load_default_standards;
    use cover_store::{MemoryStore, StoreTransaction};

    fn record(area: &str, category: &str, percentage: f64) -> CoverageRecord {
        let mut record = CoverageRecord::new(
            LayoutType::SnapshotByLocalArea,
            RecordKey::new(area, category, "12 months", "2024-2025"),
        );
        record.percentage = Some(percentage);
        record
    }

    fn store(records: &[CoverageRecord]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        for record in records {
            tx.upsert(record).unwrap();
        }
        tx.commit().unwrap();
        store
    }

    #[test]
    fn snapshot_rows_follow_hierarchy_and_columns_canonical_order() {
        let reference = load_default_standards().unwrap().reference;
        let store = store(&[
            record("E09000033", "MMR1", 78.5),
            record("E09000007", "MenB", 88.0),
            record("E12000007", "DTaP_IPV_Hib_HepB", 86.2),
        ]);
        let request = ReconstructRequest::new(LayoutType::SnapshotByLocalArea)
            .with_cohort("12 months")
            .with_period("2024 to 2025");
        let table = reconstruct(&store, &reference, &request).unwrap();

        let rows: Vec<&str> = table.rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(rows, ["London", "Camden", "Westminster"]);
        let columns: Vec<&str> = table.columns.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(columns, ["DTaP_IPV_Hib_HepB", "MenB", "MMR1"]);
        assert_eq!(table.cell("E09000007", "MMR1"), Some(&DisplayValue::Empty));
        assert_eq!(
            table.cell("E09000033", "MMR1"),
            Some(&DisplayValue::Number(78.5))
        );
    }

    #[test]
    fn missing_key_parts_are_rejected() {
        let reference = load_default_standards().unwrap().reference;
        let store = MemoryStore::new();

        let request =
            ReconstructRequest::new(LayoutType::SnapshotByLocalArea).with_cohort("12 months");
        assert!(matches!(
            reconstruct(&store, &reference, &request),
            Err(ReconstructError::PeriodRequired { .. })
        ));

        let request = ReconstructRequest::new(LayoutType::HistoricalByRegionColumns)
            .with_cohort("12 months");
        assert!(matches!(
            reconstruct(&store, &reference, &request),
            Err(ReconstructError::CategoryRequired { .. })
        ));

        let request = ReconstructRequest::new(LayoutType::HistoricalByYear);
        assert!(matches!(
            reconstruct(&store, &reference, &request),
            Err(ReconstructError::CohortRequired { .. })
        ));

        let request = ReconstructRequest::new(LayoutType::HistoricalByYear).with_cohort("7 years");
        assert!(matches!(
            reconstruct(&store, &reference, &request),
            Err(ReconstructError::UnknownCohort(_))
        ));
    }

    #[test]
    fn category_accepts_published_name() {
        let reference = load_default_standards().unwrap().reference;
        assert_eq!(
            category_code(&reference, "dtap/ipv/hib").unwrap(),
            "DTaP_IPV_Hib"
        );
        assert!(category_code(&reference, "Smallpox").is_err());
    }
}
