//! In-memory inverted index over the inventory snapshot.
//!
//! Provides:
//! - [`SearchIndex`]: immutable lookup tables built from one snapshot
//! - [`build_index`]: full synchronous construction (no incremental path)
//! - [`query`]: the ranked resolver and the linear-scan fallback

mod builder;
pub mod query;

pub use builder::{build_index, SearchIndex};
pub use query::{normalize_query, resolve, scan};

use crate::config::SearchConfig;

/// Split a lower-cased model number on space, hyphen, and underscore runs,
/// keeping tokens long enough to be indexed.
pub(crate) fn model_tokens(model: &str) -> impl Iterator<Item = &str> {
    model
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|token| token.chars().count() > SearchConfig::MIN_MODEL_TOKEN_LEN)
}

/// Split lower-cased free text on whitespace, keeping words long enough to be indexed.
pub(crate) fn description_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > SearchConfig::MIN_DESCRIPTION_WORD_LEN)
}
