//! Error types for loading and reconstruction.

use cover_ingest::IngestError;
use cover_map::VocabularyError;
use cover_model::LayoutType;
use cover_store::StoreError;
use cover_transform::TransformError;
use thiserror::Error;

/// Reference data or settings that cannot drive a load.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error(transparent)]
    HeaderRules(#[from] TransformError),
}

/// A sheet load that produced nothing.
///
/// Row-level problems never surface here; they are collected in the
/// [`LoadReport`](cover_model::LoadReport).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The sheet could not be classified or its table could not be found.
    #[error(transparent)]
    Structural(#[from] IngestError),

    /// The store rejected the scope replacement; the scope was rolled back.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl LoadError {
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("{layout} tables need a period")]
    PeriodRequired { layout: LayoutType },

    #[error("{layout} tables need a cohort")]
    CohortRequired { layout: LayoutType },

    #[error("{layout} tables need exactly one category")]
    CategoryRequired { layout: LayoutType },

    #[error("unknown cohort '{0}'")]
    UnknownCohort(String),

    #[error("unknown period '{0}'")]
    UnknownPeriod(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("no loader is registered for {0}")]
    UnsupportedLayout(LayoutType),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}
