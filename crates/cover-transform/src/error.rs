use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid header pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
