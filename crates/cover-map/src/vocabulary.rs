//! Immutable canonical vocabularies.

use std::collections::HashMap;

use cover_model::{Alias, AreaKind, Category, GeographicArea};

use crate::error::VocabularyError;
use crate::utils::normalize_label;

/// A canonical code with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub code: String,
    pub label: String,
}

impl VocabularyEntry {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Canonical names plus an alias table, keyed by normalized label.
///
/// Both the canonical name and the code of an entry count as exact names.
/// An alias may never shadow an exact name of a different entry, so a label
/// that resolves exactly can never resolve differently through an alias.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
    exact: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new(entries: Vec<VocabularyEntry>) -> Result<Self, VocabularyError> {
        let mut exact: HashMap<String, usize> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            for label in [&entry.label, &entry.code] {
                let key = normalize_label(label);
                if key.is_empty() {
                    continue;
                }
                match exact.get(&key) {
                    Some(&existing) if entries[existing].code != entry.code => {
                        return Err(VocabularyError::DuplicateLabel {
                            label: label.clone(),
                            first: entries[existing].code.clone(),
                            second: entry.code.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        exact.insert(key, idx);
                    }
                }
            }
        }
        Ok(Self {
            entries,
            exact,
            aliases: HashMap::new(),
        })
    }

    /// Adds `(alias, code)` pairs.
    pub fn with_aliases<I, A, C>(mut self, aliases: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: AsRef<str>,
    {
        for (alias, code) in aliases {
            let alias = alias.as_ref();
            let code = code.as_ref();
            let Some(idx) = self.entries.iter().position(|entry| entry.code == code) else {
                return Err(VocabularyError::UnknownCode {
                    alias: alias.to_string(),
                    code: code.to_string(),
                });
            };
            let key = normalize_label(alias);
            if key.is_empty() {
                continue;
            }
            if let Some(&exact_idx) = self.exact.get(&key) {
                if exact_idx != idx {
                    return Err(VocabularyError::ConflictingAlias {
                        alias: alias.to_string(),
                        alias_code: code.to_string(),
                        exact_code: self.entries[exact_idx].code.clone(),
                    });
                }
                continue;
            }
            if let Some(&existing) = self.aliases.get(&key)
                && existing != idx
            {
                return Err(VocabularyError::ConflictingAlias {
                    alias: alias.to_string(),
                    alias_code: code.to_string(),
                    exact_code: self.entries[existing].code.clone(),
                });
            }
            self.aliases.insert(key, idx);
        }
        Ok(self)
    }

    /// Category vocabulary with its alias table.
    pub fn from_categories(
        categories: &[Category],
        aliases: &[Alias],
    ) -> Result<Self, VocabularyError> {
        let entries = categories
            .iter()
            .map(|category| VocabularyEntry::new(&category.code, &category.name))
            .collect();
        Self::new(entries)?.with_aliases(
            aliases
                .iter()
                .map(|alias| (alias.alias.as_str(), alias.code.as_str())),
        )
    }

    /// Area vocabulary restricted to the given kinds.
    pub fn from_areas(areas: &[GeographicArea], kinds: &[AreaKind]) -> Result<Self, VocabularyError> {
        let entries = areas
            .iter()
            .filter(|area| kinds.contains(&area.kind))
            .map(|area| VocabularyEntry::new(&area.code, &area.name))
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup on an already normalized label.
    pub fn exact(&self, normalized: &str) -> Option<&VocabularyEntry> {
        self.exact.get(normalized).map(|&idx| &self.entries[idx])
    }

    /// Alias lookup on an already normalized label.
    pub fn alias(&self, normalized: &str) -> Option<&VocabularyEntry> {
        self.aliases.get(normalized).map(|&idx| &self.entries[idx])
    }

    pub fn entry(&self, code: &str) -> Option<&VocabularyEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }
}
