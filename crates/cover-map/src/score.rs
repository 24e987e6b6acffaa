//! Fuzzy similarity scoring.
//!
//! Uses the normalized Indel similarity (the ratio of matching characters
//! to total length, as used by classic sequence matchers) on normalized
//! labels.

use std::cmp::Ordering;

use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

use crate::utils::normalize_label;
use crate::vocabulary::Vocabulary;

/// Acceptance rules for the fuzzy tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Minimum similarity for a fuzzy match (default: 0.85).
    pub fuzzy_threshold: f64,
    /// Minimum lead of the best candidate over the runner-up (default: 0.05).
    pub fuzzy_margin: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_margin: 0.05,
        }
    }
}

impl MatchSettings {
    /// Settings that only accept near-identical spellings.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fuzzy_threshold: 0.93,
            fuzzy_margin: 0.10,
        }
    }

    /// Settings for exploratory matching of unfamiliar sheets.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            fuzzy_margin: 0.03,
        }
    }

    /// Settings with the fuzzy tier switched off.
    #[must_use]
    pub fn exact_only() -> Self {
        Self {
            fuzzy_threshold: f64::INFINITY,
            fuzzy_margin: 0.0,
        }
    }

    /// Whether `best` is accepted given the runner-up score.
    pub fn accepts(&self, best: f64, runner_up: Option<f64>) -> bool {
        if best < self.fuzzy_threshold {
            return false;
        }
        match runner_up {
            Some(second) => best - second >= self.fuzzy_margin,
            None => true,
        }
    }
}

/// Similarity between two already normalized labels, in `0.0..=1.0`.
pub fn similarity(left: &str, right: &str) -> f64 {
    indel::normalized_similarity(left.chars(), right.chars())
}

/// A vocabulary entry scored against an input label.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    pub code: String,
    pub label: String,
    pub score: f64,
}

/// Scores every canonical name against `normalized`, best first, one
/// candidate per code.
pub fn rank_candidates(vocabulary: &Vocabulary, normalized: &str) -> Vec<FuzzyCandidate> {
    let mut candidates: Vec<FuzzyCandidate> = vocabulary
        .entries()
        .iter()
        .map(|entry| FuzzyCandidate {
            code: entry.code.clone(),
            label: entry.label.clone(),
            score: similarity(normalized, &normalize_label(&entry.label)),
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    candidates
}
