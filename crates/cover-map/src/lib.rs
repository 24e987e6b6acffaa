#![deny(unsafe_code)]

//! Resolution of free-text labels (vaccine or geographic names) onto a
//! canonical vocabulary.
//!
//! Matching runs in three tiers: exact name, alias table, then fuzzy
//! similarity guarded by a threshold and a margin over the runner-up.

pub mod error;
pub mod matcher;
pub mod score;
pub mod utils;
pub mod vocabulary;

pub use error::VocabularyError;
pub use matcher::{MatchResult, MatchStats, MatchTier, NameMatcher};
pub use score::{FuzzyCandidate, MatchSettings, rank_candidates, similarity};
pub use utils::normalize_label;
pub use vocabulary::{Vocabulary, VocabularyEntry};
