//! Error type for `cover-store`.

use cover_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be decoded back into a record.
    #[error("corrupt stored record: {0}")]
    Decode(#[from] ModelError),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
