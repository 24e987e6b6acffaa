//! Storage for normalized coverage records.
//!
//! Loads replace one [`LoadScope`](cover_model::LoadScope) at a time: the
//! loader opens a transaction, deletes the scope, upserts the new records
//! and commits. A failed load drops its transaction and leaves the stored
//! records untouched.

mod memory;
mod schema;
mod sqlite;
mod store;

pub mod error;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, MemoryTransaction};
pub use sqlite::{SqliteStore, SqliteTransaction};
pub use store::{CoverageStore, RecordFilter, StoreTransaction};
