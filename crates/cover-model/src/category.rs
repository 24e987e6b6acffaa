use serde::{Deserialize, Serialize};

/// A canonical vaccine or program that coverage is reported for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Position in the canonical publication order.
    pub ordinal: usize,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            ordinal,
        }
    }
}

/// Alternate spelling that resolves to a category code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub alias: String,
    pub code: String,
}

impl Alias {
    pub fn new(alias: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            code: code.into(),
        }
    }
}
