//! Everything a load needs besides the sheet itself.

use std::sync::Arc;

use cover_map::{MatchSettings, NameMatcher, Vocabulary};
use cover_model::AreaKind;
use cover_standards::{ReferenceData, Settings, Standards};
use cover_transform::normalization::header::{DEFAULT_PREFIXES, DEFAULT_SUFFIXES};
use cover_transform::{HeaderRules, ValueCleaner};

use crate::error::ContextError;

/// Immutable load configuration built once from the standards directory.
///
/// Shared by every sheet of a run. Matchers, which carry a memo cache, are
/// created per sheet through [`LoadContext::matchers`].
#[derive(Debug, Clone)]
pub struct LoadContext {
    reference: Arc<ReferenceData>,
    settings: Settings,
    cleaner: ValueCleaner,
    headers: HeaderRules,
    categories: Arc<Vocabulary>,
    regions: Arc<Vocabulary>,
    match_settings: MatchSettings,
}

impl LoadContext {
    pub fn new(reference: ReferenceData, settings: Settings) -> Result<Self, ContextError> {
        let categories = Vocabulary::from_categories(reference.categories(), reference.aliases())?;
        let regions =
            Vocabulary::from_areas(reference.areas(), &[AreaKind::Nation, AreaKind::Region])?;
        let headers = header_rules(&settings)?;
        let match_settings = MatchSettings {
            fuzzy_threshold: settings.matcher.fuzzy_threshold,
            fuzzy_margin: settings.matcher.fuzzy_margin,
        };
        Ok(Self {
            cleaner: ValueCleaner::new(reference.markers().clone()),
            reference: Arc::new(reference),
            settings,
            headers,
            categories: Arc::new(categories),
            regions: Arc::new(regions),
            match_settings,
        })
    }

    pub fn from_standards(standards: Standards) -> Result<Self, ContextError> {
        Self::new(standards.reference, standards.settings)
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cleaner(&self) -> &ValueCleaner {
        &self.cleaner
    }

    pub fn headers(&self) -> &HeaderRules {
        &self.headers
    }

    /// Fresh matchers with empty caches.
    pub fn matchers(&self) -> Matchers {
        Matchers {
            categories: NameMatcher::new(Arc::clone(&self.categories), self.match_settings),
            regions: NameMatcher::new(Arc::clone(&self.regions), self.match_settings),
        }
    }
}

/// Per-sheet matchers for the two label domains.
#[derive(Debug, Clone)]
pub struct Matchers {
    /// Vaccine and program names.
    pub categories: NameMatcher,
    /// Nation and region names, used where areas are columns.
    pub regions: NameMatcher,
}

impl Matchers {
    pub fn cache_len(&self) -> usize {
        self.categories.cache_len() + self.regions.cache_len()
    }
}

/// Built-in decoration patterns followed by any configured ones.
fn header_rules(settings: &Settings) -> Result<HeaderRules, ContextError> {
    let headers = &settings.headers;
    if headers.strip_prefixes.is_empty() && headers.strip_suffixes.is_empty() {
        return Ok(HeaderRules::default());
    }
    let prefixes: Vec<String> = DEFAULT_PREFIXES
        .iter()
        .map(|pattern| (*pattern).to_string())
        .chain(headers.strip_prefixes.iter().cloned())
        .collect();
    let suffixes: Vec<String> = DEFAULT_SUFFIXES
        .iter()
        .map(|pattern| (*pattern).to_string())
        .chain(headers.strip_suffixes.iter().cloned())
        .collect();
    Ok(HeaderRules::new(&prefixes, &suffixes)?)
}
