//! Tiered name matcher with a per-run cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::score::{MatchSettings, rank_candidates};
use crate::utils::normalize_label;
use crate::vocabulary::Vocabulary;

/// Tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Alias,
    Fuzzy,
    Unmatched,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::Alias => "alias",
            Self::Fuzzy => "fuzzy",
            Self::Unmatched => "unmatched",
        })
    }
}

/// Outcome of matching one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Label as given.
    pub raw: String,
    /// Resolved canonical code, `None` when unmatched.
    pub code: Option<String>,
    /// 1.0 for exact and alias matches, the similarity for fuzzy matches,
    /// and the best rejected similarity when unmatched.
    pub confidence: f64,
    pub tier: MatchTier,
}

impl MatchResult {
    fn matched(raw: &str, code: &str, confidence: f64, tier: MatchTier) -> Self {
        Self {
            raw: raw.to_string(),
            code: Some(code.to_string()),
            confidence,
            tier,
        }
    }

    fn unmatched(raw: &str, confidence: f64) -> Self {
        Self {
            raw: raw.to_string(),
            code: None,
            confidence,
            tier: MatchTier::Unmatched,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.code.is_some()
    }
}

/// Cache counters for one matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub hits: usize,
    pub misses: usize,
}

/// Resolves free-text labels against a shared vocabulary.
///
/// Results are memoized by normalized label for the lifetime of the
/// matcher; create one matcher per load run.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    vocabulary: Arc<Vocabulary>,
    settings: MatchSettings,
    cache: HashMap<String, MatchResult>,
    stats: MatchStats,
}

impl NameMatcher {
    pub fn new(vocabulary: Arc<Vocabulary>, settings: MatchSettings) -> Self {
        Self {
            vocabulary,
            settings,
            cache: HashMap::new(),
            stats: MatchStats::default(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Matches one label. Never fails: unresolvable labels come back with
    /// [`MatchTier::Unmatched`] and the raw text.
    pub fn match_label(&mut self, raw: &str) -> MatchResult {
        let normalized = normalize_label(raw);
        if normalized.is_empty() {
            return MatchResult::unmatched(raw, 0.0);
        }
        if let Some(cached) = self.cache.get(&normalized) {
            self.stats.hits += 1;
            let mut result = cached.clone();
            result.raw = raw.to_string();
            return result;
        }
        self.stats.misses += 1;
        let result = self.resolve(raw, &normalized);
        debug!(
            label = raw,
            code = result.code.as_deref().unwrap_or("-"),
            tier = %result.tier,
            confidence = result.confidence,
            "matched label"
        );
        self.cache.insert(normalized, result.clone());
        result
    }

    fn resolve(&self, raw: &str, normalized: &str) -> MatchResult {
        if let Some(entry) = self.vocabulary.exact(normalized) {
            return MatchResult::matched(raw, &entry.code, 1.0, MatchTier::Exact);
        }
        if let Some(entry) = self.vocabulary.alias(normalized) {
            return MatchResult::matched(raw, &entry.code, 1.0, MatchTier::Alias);
        }
        let candidates = rank_candidates(&self.vocabulary, normalized);
        let Some(best) = candidates.first() else {
            return MatchResult::unmatched(raw, 0.0);
        };
        let runner_up = candidates
            .iter()
            .find(|candidate| candidate.code != best.code)
            .map(|candidate| candidate.score);
        if self.settings.accepts(best.score, runner_up) {
            MatchResult::matched(raw, &best.code, best.score, MatchTier::Fuzzy)
        } else {
            MatchResult::unmatched(raw, best.score)
        }
    }
}
