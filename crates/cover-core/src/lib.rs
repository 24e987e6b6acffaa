//! Loading coverage sheets into a store and rebuilding tables from it.
//!
//! Every layout goes through [`load_sheet`]; the differences between
//! layouts live in a [`LayoutStrategy`] looked up by layout.

mod assemble;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod reconstruct;
pub mod strategy;

pub use assemble::RecordBuilder;
pub use context::{LoadContext, Matchers};
pub use error::{ContextError, LoadError, ReconstructError};
pub use pipeline::{
    SheetInput, SheetOutcome, load_directory, load_groups, load_sheet, load_sheet_with,
};
pub use reconstruct::{ReconstructRequest, reconstruct};
pub use strategy::{
    HistoricalStrategy, KeyPart, KeyParts, LayoutStrategy, RegionalStrategy, SheetScope,
    SnapshotStrategy, SpecialProgramStrategy, StrategyRegistry, default_registry,
};
