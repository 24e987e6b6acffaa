//! Core data types for vaccination coverage statistics.
//!
//! Everything in this crate is plain data: reference entities (areas,
//! categories, cohorts, periods), the normalized [`CoverageRecord`] fact, the
//! cleaned cell values produced while reading published sheets, and the
//! [`WideTable`] rebuilt from stored facts.

pub mod area;
pub mod category;
pub mod column;
pub mod error;
pub mod layout;
pub mod period;
pub mod record;
pub mod report;
pub mod scope;
pub mod table;
pub mod value;

pub use area::{AreaKind, GeographicArea, is_area_code};
pub use category::{Alias, Category};
pub use column::{ColumnRole, KeyField, Measure, ValueColumn};
pub use error::{ModelError, ValidationError};
pub use layout::LayoutType;
pub use period::{Cohort, Period, normalize_period_label};
pub use record::{CoverageRecord, RecordKey};
pub use report::{LoadReport, RowError, RowErrorKind};
pub use scope::LoadScope;
pub use table::{RawSheet, WideColumn, WideRow, WideTable};
pub use value::{
    CleanedValue, DisplayValue, MarkerKind, MarkerTable, SuppressionMarker, format_numeric,
};
