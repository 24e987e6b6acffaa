use thiserror::Error;

/// Inconsistent vocabulary input. Raised at construction so that matching
/// itself never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("label '{label}' is claimed by both {first} and {second}")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("alias '{alias}' points at unknown code {code}")]
    UnknownCode { alias: String, code: String },

    #[error("alias '{alias}' resolves to {alias_code} but the name belongs to {exact_code}")]
    ConflictingAlias {
        alias: String,
        alias_code: String,
        exact_code: String,
    },
}
