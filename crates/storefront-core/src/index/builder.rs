use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

use super::{description_words, model_tokens};
use crate::models::InventoryItem;

/// Lookup tables over one inventory snapshot.
///
/// Every table stores positions into [`SearchIndex::all_items`], so two
/// records with the same model number stay distinct. Full model numbers and
/// model tokens live in separate tables: an exact key resolves to exactly one
/// record (the last one indexed under it), a token to every record carrying it.
#[derive(Debug)]
pub struct SearchIndex {
    exact_models: HashMap<String, usize>,
    model_tokens: HashMap<String, Vec<usize>>,
    brands: HashMap<String, Vec<usize>>,
    description_words: HashMap<String, Vec<usize>>,
    categories: HashMap<String, Vec<usize>>,
    all_items: Arc<Vec<InventoryItem>>,
    built_at: Instant,
}

impl SearchIndex {
    /// The snapshot this index was built from (same allocation).
    pub fn all_items(&self) -> &Arc<Vec<InventoryItem>> {
        &self.all_items
    }

    pub fn built_at(&self) -> Instant {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.all_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_items.is_empty()
    }

    pub fn item(&self, position: usize) -> Option<&InventoryItem> {
        self.all_items.get(position)
    }

    pub fn exact_model(&self, key: &str) -> Option<usize> {
        self.exact_models.get(key).copied()
    }

    pub fn model_token(&self, token: &str) -> &[usize] {
        self.model_tokens.get(token).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn brand(&self, key: &str) -> &[usize] {
        self.brands.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn description_word(&self, word: &str) -> &[usize] {
        self.description_words
            .get(word)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn category(&self, key: &str) -> &[usize] {
        self.categories.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn exact_model_count(&self) -> usize {
        self.exact_models.len()
    }

    pub fn model_token_count(&self) -> usize {
        self.model_tokens.len()
    }

    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    pub fn description_word_count(&self) -> usize {
        self.description_words.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

/// Build the index over a full inventory snapshot.
///
/// No scoring happens here; the resolver ranks at query time.
pub fn build_index(items: Arc<Vec<InventoryItem>>) -> SearchIndex {
    let started = Instant::now();

    let mut exact_models = HashMap::new();
    let mut model_token_table: HashMap<String, Vec<usize>> = HashMap::new();
    let mut brands: HashMap<String, Vec<usize>> = HashMap::new();
    let mut description_table: HashMap<String, Vec<usize>> = HashMap::new();
    let mut categories: HashMap<String, Vec<usize>> = HashMap::new();

    for (position, item) in items.iter().enumerate() {
        if item.has_model_number() {
            let model = item.model_number().to_lowercase();
            for token in model_tokens(&model) {
                model_token_table
                    .entry(token.to_string())
                    .or_default()
                    .push(position);
            }
            exact_models.insert(model, position);
        }

        let brand = item.brand().to_lowercase();
        if !brand.is_empty() {
            brands.entry(brand).or_default().push(position);
        }

        let description = item.description().to_lowercase();
        for word in description_words(&description) {
            description_table
                .entry(word.to_string())
                .or_default()
                .push(position);
        }

        let category = item.category_major().to_lowercase();
        if !category.is_empty() {
            categories.entry(category).or_default().push(position);
        }
    }

    debug!(
        "Built search index over {} items in {:?} ({} models, {} tokens, {} words)",
        items.len(),
        started.elapsed(),
        exact_models.len(),
        model_token_table.len(),
        description_table.len()
    );

    SearchIndex {
        exact_models,
        model_tokens: model_token_table,
        brands,
        description_words: description_table,
        categories,
        all_items: items,
        built_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Arc<Vec<InventoryItem>> {
        Arc::new(vec![
            InventoryItem::new(
                "WRF535SWHZ",
                "WHIRLPOOL",
                "French Door Refrigerator",
                "Refrigerators",
            ),
            InventoryItem::new("WTW-5000_DW", "Whirlpool", "Top Load Washer", "Laundry"),
            InventoryItem::new("GE-JB645", "GE", "Electric Range", "Cooking"),
        ])
    }

    #[test]
    fn test_all_items_is_same_snapshot() {
        let items = snapshot();
        let index = build_index(items.clone());
        assert!(Arc::ptr_eq(index.all_items(), &items));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_exact_and_token_tables() {
        let index = build_index(snapshot());

        assert_eq!(index.exact_model("wrf535swhz"), Some(0));
        assert_eq!(index.exact_model("wtw-5000_dw"), Some(1));
        assert_eq!(index.model_token("wtw"), &[1]);
        assert_eq!(index.model_token("5000"), &[1]);
        // Two-character tokens are not indexed
        assert!(index.model_token("dw").is_empty());
        assert!(index.model_token("ge").is_empty());
        assert_eq!(index.model_token("jb645"), &[2]);
    }

    #[test]
    fn test_brand_description_category_tables() {
        let index = build_index(snapshot());

        assert_eq!(index.brand("whirlpool"), &[0, 1]);
        assert_eq!(index.brand("ge"), &[2]);
        assert_eq!(index.description_word("refrigerator"), &[0]);
        assert_eq!(index.description_word("door"), &[0]);
        // Three-character words are not indexed
        assert!(index.description_word("top").is_empty());
        assert_eq!(index.category("laundry"), &[1]);
        assert_eq!(index.category_count(), 3);
    }

    #[test]
    fn test_duplicate_model_numbers() {
        let items = Arc::new(vec![
            InventoryItem::new("ABC-123", "GE", "Dryer", "Laundry"),
            InventoryItem::new("abc-123", "GE", "Dryer", "Laundry"),
        ]);
        let index = build_index(items);

        // Last indexed wins the exact slot; token lists keep both
        assert_eq!(index.exact_model("abc-123"), Some(1));
        assert_eq!(index.model_token("abc"), &[0, 1]);
        assert_eq!(index.model_token("123"), &[0, 1]);
    }

    #[test]
    fn test_items_without_fields() {
        let items = Arc::new(vec![InventoryItem::default()]);
        let index = build_index(items);
        assert_eq!(index.exact_model_count(), 0);
        assert_eq!(index.brand_count(), 0);
        assert_eq!(index.len(), 1);
    }
}
