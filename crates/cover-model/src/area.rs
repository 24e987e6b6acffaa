//! Geographic areas and their hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Level of a geographic area in the publication hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Nation,
    Region,
    LocalArea,
}

impl AreaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nation => "nation",
            Self::Region => "region",
            Self::LocalArea => "local_area",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "nation" | "country" => Ok(Self::Nation),
            "region" => Ok(Self::Region),
            "local_area" | "local" | "utla" | "local_authority" => Ok(Self::LocalArea),
            _ => Err(ModelError::UnknownAreaKind(raw.to_string())),
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A nation, region, or local area identified by its statistical code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicArea {
    pub code: String,
    pub name: String,
    pub kind: AreaKind,
    /// Code of the containing area. Nations may omit it.
    pub parent_code: Option<String>,
}

impl GeographicArea {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AreaKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            parent_code: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    pub fn is_nation(&self) -> bool {
        self.kind == AreaKind::Nation
    }
}

/// Returns true for nine-character statistical codes such as `E09000033`.
///
/// The leading letter is the country prefix (E, W, S, N) or `K` for the
/// United Kingdom aggregates.
pub fn is_area_code(raw: &str) -> bool {
    let value = raw.trim();
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first.to_ascii_uppercase(), 'E' | 'W' | 'S' | 'N' | 'K') {
        return false;
    }
    value.len() == 9 && chars.all(|ch| ch.is_ascii_digit())
}
