//! Query resolution against the search index.
//!
//! Lookups accumulate item positions in first-seen order, deduplicated by
//! snapshot position rather than by model number. A linear substring scan
//! tops up sparse results. Ranking is a stable three-bucket sort on the model
//! number; no other scoring happens.

use std::collections::HashSet;

use super::{description_words, model_tokens, SearchIndex};
use crate::config::SearchConfig;
use crate::models::InventoryItem;

/// Trim and lower-case a raw query.
///
/// Returns `None` for queries too short to search.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.chars().count() < SearchConfig::MIN_QUERY_CHARS {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Resolve `query` against a built index.
pub fn resolve(index: &SearchIndex, query: &str) -> Vec<InventoryItem> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };
    let items = index.all_items();
    let mut hits = Hits::default();

    if let Some(position) = index.exact_model(&query) {
        hits.add(position);
    }

    for token in model_tokens(&query) {
        hits.extend(index.model_token(token));
    }

    hits.extend(index.brand(&query));

    for word in description_words(&query) {
        hits.extend(index.description_word(word));
    }

    hits.extend(index.category(&query));

    if hits.len() < SearchConfig::FALLBACK_SCAN_THRESHOLD {
        for (position, item) in items.iter().enumerate() {
            if contains_query(item, &query) {
                hits.add(position);
            }
        }
    }

    rank(items, hits.order, &query)
}

/// Linear substring scan, used when no fresh index is available.
pub fn scan(items: &[InventoryItem], query: &str) -> Vec<InventoryItem> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };
    let positions = items
        .iter()
        .enumerate()
        .filter(|(_, item)| contains_query(item, &query))
        .map(|(position, _)| position)
        .collect();
    rank(items, positions, &query)
}

#[derive(Default)]
struct Hits {
    seen: HashSet<usize>,
    order: Vec<usize>,
}

impl Hits {
    fn add(&mut self, position: usize) {
        if self.seen.insert(position) {
            self.order.push(position);
        }
    }

    fn extend(&mut self, positions: &[usize]) {
        for &position in positions {
            self.add(position);
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

fn contains_query(item: &InventoryItem, query: &str) -> bool {
    [item.model_number(), item.description(), item.brand()]
        .iter()
        .any(|field| !field.is_empty() && field.to_lowercase().contains(query))
}

/// 0 = exact model match, 1 = model starts with query, 2 = anything else.
fn model_rank(item: &InventoryItem, query: &str) -> u8 {
    let model = item.model_number().to_lowercase();
    if model == query {
        0
    } else if model.starts_with(query) {
        1
    } else {
        2
    }
}

fn rank(items: &[InventoryItem], mut positions: Vec<usize>, query: &str) -> Vec<InventoryItem> {
    // sort_by_cached_key is stable
    positions.sort_by_cached_key(|&position| model_rank(&items[position], query));
    positions
        .into_iter()
        .take(SearchConfig::RESULT_LIMIT)
        .map(|position| items[position].clone())
        .collect()
}
