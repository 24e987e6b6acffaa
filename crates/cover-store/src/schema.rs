//! SQL schema for the SQLite coverage store.
//!
//! Executed on every open; `PRAGMA user_version` records the schema revision.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per (layout, series, natural key). Rows are only ever replaced whole.
CREATE TABLE IF NOT EXISTS coverage_records (
    layout        TEXT NOT NULL,   -- LayoutType, snake_case
    series        TEXT NOT NULL DEFAULT '',  -- '' for a layout's main tables
    area_code     TEXT NOT NULL,
    category_code TEXT NOT NULL,
    cohort        TEXT NOT NULL,
    period        TEXT NOT NULL,   -- period key, YYYY-YYYY
    numerator     REAL,
    denominator   REAL,
    percentage    REAL,
    suppressed    INTEGER NOT NULL DEFAULT 0,
    confidential  INTEGER NOT NULL DEFAULT 0,
    display_token TEXT,
    note          TEXT,
    PRIMARY KEY (layout, series, area_code, category_code, cohort, period),
    CHECK (percentage IS NULL OR (percentage >= 0 AND percentage <= 100))
);

DROP INDEX IF EXISTS coverage_scope_idx;
CREATE INDEX IF NOT EXISTS coverage_series_scope_idx
    ON coverage_records(layout, series, cohort, period, category_code);

PRAGMA user_version = 2;
";

/// Revision written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 2;

/// Moves a revision 1 table, which had no series column, aside so
/// [`SCHEMA`] can recreate it. Every old row belongs to a main table.
pub const MIGRATE_FROM_V1: &str = "
ALTER TABLE coverage_records RENAME TO coverage_records_v1;
";

/// Copies revision 1 rows into the recreated table.
pub const COPY_FROM_V1: &str = "
INSERT INTO coverage_records (
    layout, series, area_code, category_code, cohort, period,
    numerator, denominator, percentage, suppressed, confidential,
    display_token, note
)
SELECT layout, '', area_code, category_code, cohort, period,
       numerator, denominator, percentage, suppressed, confidential,
       display_token, note
FROM coverage_records_v1;
DROP TABLE coverage_records_v1;
";
