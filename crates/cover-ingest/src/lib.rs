//! Coverage sheet ingestion.
//!
//! Reads published sheets exported as CSV, pairs percentage and count
//! sheets, classifies each sheet into one of the known layouts and finds
//! the table inside it.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use cover_ingest::{classify, find_table_region, list_csv_files, read_sheet};
//!
//! for path in list_csv_files(Path::new("data"))? {
//!     let sheet = read_sheet(&path)?;
//!     let descriptor = classify(&sheet)?;
//!     let region = find_table_region(&sheet)?;
//!     println!("{} {} rows", descriptor.layout, region.data_row_count());
//! }
//! ```

mod classify;
mod columns;
mod discovery;
mod error;
mod locate;
mod sheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sheet Reading ===
pub use sheet::{parse_sheet, read_sheet, sheet_name};

// === File Discovery ===
pub use discovery::{SheetGroup, list_csv_files, pair_sheets};

// === Classification ===
pub use classify::{
    SheetDescriptor, SheetVariant, classify, describe_sheet_name, layout_for_table,
};

// === Table Location ===
pub use columns::{key_field, normalize_header};
pub use locate::{ColumnClassifier, LocatedTable, TableRegion, find_table_region, locate};
