//! [`SqliteStore`], the SQLite implementation of [`CoverageStore`].

use std::path::Path;

use rusqlite::{Connection, Row, params};
use tracing::debug;

use cover_model::{CoverageRecord, LayoutType, LoadScope, RecordKey};

use crate::error::Result;
use crate::schema::{COPY_FROM_V1, MIGRATE_FROM_V1, SCHEMA, SCHEMA_VERSION};
use crate::store::{CoverageStore, RecordFilter, StoreTransaction};

const SELECT_RECORDS: &str = "
SELECT layout, series, area_code, category_code, cohort, period,
       numerator, denominator, percentage, suppressed, confidential,
       display_token, note
FROM coverage_records
WHERE (?1 IS NULL OR layout = ?1)
  AND series = ?2
  AND (?3 IS NULL OR cohort = ?3)
  AND (?4 IS NULL OR period = ?4)";

const UPSERT_RECORD: &str = "
INSERT OR REPLACE INTO coverage_records (
    layout, series, area_code, category_code, cohort, period,
    numerator, denominator, percentage, suppressed, confidential,
    display_token, note
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

const DELETE_SCOPE: &str = "
DELETE FROM coverage_records
WHERE layout = ?1
  AND series = ?2
  AND (?3 IS NULL OR cohort = ?3)
  AND (?4 IS NULL OR period = ?4)
  AND (?5 IS NULL OR category_code = ?5)";

/// A coverage store backed by a single SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at `path` and run schema initialisation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store, useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version == 1 {
            debug!(to = SCHEMA_VERSION, "migrating coverage schema");
            self.conn.execute_batch(MIGRATE_FROM_V1)?;
            self.conn.execute_batch(SCHEMA)?;
            self.conn.execute_batch(COPY_FROM_V1)?;
            return Ok(());
        }
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

/// Main tables are stored under the empty series.
fn series_column(series: Option<&str>) -> &str {
    series.unwrap_or_default()
}

/// Column values as stored, before the layout text is parsed.
struct RawRecord {
    layout: String,
    series: String,
    key: RecordKey,
    numerator: Option<f64>,
    denominator: Option<f64>,
    percentage: Option<f64>,
    suppressed: bool,
    confidential: bool,
    display_token: Option<String>,
    note: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            layout: row.get(0)?,
            series: row.get(1)?,
            key: RecordKey::new(
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ),
            numerator: row.get(6)?,
            denominator: row.get(7)?,
            percentage: row.get(8)?,
            suppressed: row.get(9)?,
            confidential: row.get(10)?,
            display_token: row.get(11)?,
            note: row.get(12)?,
        })
    }

    fn into_record(self) -> Result<CoverageRecord> {
        let series = (!self.series.is_empty()).then_some(self.series);
        let mut record =
            CoverageRecord::new(LayoutType::parse(&self.layout)?, self.key).with_series(series);
        record.numerator = self.numerator;
        record.denominator = self.denominator;
        record.percentage = self.percentage;
        record.suppressed = self.suppressed;
        record.confidential = self.confidential;
        record.display_token = self.display_token;
        record.note = self.note;
        Ok(record)
    }
}

/// Wraps a [`rusqlite::Transaction`]; dropping it rolls back.
pub struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
    deleted: usize,
    written: usize,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn delete_scope(&mut self, scope: &LoadScope) -> Result<usize> {
        let removed = self.tx.execute(
            DELETE_SCOPE,
            params![
                scope.layout.as_str(),
                series_column(scope.series.as_deref()),
                scope.cohort,
                scope.period,
                scope.category
            ],
        )?;
        self.deleted += removed;
        Ok(removed)
    }

    fn upsert(&mut self, record: &CoverageRecord) -> Result<()> {
        self.tx.execute(
            UPSERT_RECORD,
            params![
                record.layout.as_str(),
                series_column(record.series.as_deref()),
                record.key.area_code,
                record.key.category_code,
                record.key.cohort,
                record.key.period,
                record.numerator,
                record.denominator,
                record.percentage,
                record.suppressed,
                record.confidential,
                record.display_token,
                record.note,
            ],
        )?;
        self.written += 1;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        debug!(
            deleted = self.deleted,
            written = self.written,
            "committing coverage transaction"
        );
        self.tx.commit()?;
        Ok(())
    }
}

impl CoverageStore for SqliteStore {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> Result<Self::Transaction<'_>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction {
            tx,
            deleted: 0,
            written: 0,
        })
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<CoverageRecord>> {
        let layout = filter.layout.map(LayoutType::as_str);
        let mut stmt = self.conn.prepare(SELECT_RECORDS)?;
        let raw = stmt
            .query_map(
                params![
                    layout,
                    series_column(filter.series.as_deref()),
                    filter.cohort,
                    filter.period
                ],
                RawRecord::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(raw.len());
        for row in raw {
            let record = row.into_record()?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        records.sort_by(|a, b| (a.layout, &a.series, &a.key).cmp(&(b.layout, &b.series, &b.key)));
        Ok(records)
    }

    fn len(&self) -> Result<usize> {
        let count: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM coverage_records", [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }
}
