use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::parts_cache_key;
use super::store::{KeyValueStore, MemoryStore};
use crate::config::PartsConfig;
use crate::models::{PartRecord, PartsByNumber, PartsStatus};
use crate::Result;

/// A part found by [`PartsCache::search_parts`], with the model it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMatch {
    pub model_number: String,
    pub model_id: String,
    pub part: PartRecord,
}

#[derive(Debug, Clone)]
struct ModelParts {
    model_number: String,
    model_id: String,
    parts: PartsByNumber,
}

#[derive(Debug, Default)]
struct PartsTables {
    /// `"{model}_{id}"` -> parts for that pair
    parts: BTreeMap<String, ModelParts>,
    model_ids: BTreeMap<String, String>,
}

/// Durable parts cache.
///
/// Every mutation updates the in-memory tables and then writes both tables to
/// the store while still holding the lock, so concurrent mutators never
/// interleave a stale write. Persistence failures are logged, never returned:
/// the in-memory state stays authoritative for this process.
pub struct PartsCache {
    store: Arc<dyn KeyValueStore>,
    tables: Mutex<PartsTables>,
}

impl std::fmt::Debug for PartsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartsCache")
            .field("status", &self.status())
            .finish()
    }
}

impl PartsCache {
    /// Open the cache over `store`, loading whatever it already holds.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let tables = match load_tables(store.as_ref()) {
            Ok(tables) => {
                info!(
                    "Loaded parts cache: {} models, {} model ids",
                    tables.parts.len(),
                    tables.model_ids.len()
                );
                tables
            }
            Err(e) => {
                warn!("Failed to load parts cache, starting empty: {}", e);
                PartsTables::default()
            }
        };

        Self {
            store,
            tables: Mutex::new(tables),
        }
    }

    /// A cache that persists nowhere beyond this process.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    pub fn add_model_id_mapping(&self, model_number: &str, model_id: &str) {
        let mut tables = self.lock();
        tables
            .model_ids
            .insert(model_number.to_string(), model_id.to_string());
        self.persist(&tables);
    }

    pub fn get_model_id(&self, model_number: &str) -> Option<String> {
        self.lock().model_ids.get(model_number).cloned()
    }

    /// Merge `parts` into the entry for this model/id pair.
    ///
    /// Incoming records replace existing ones with the same part number.
    pub fn add_parts_for_model(&self, model_number: &str, model_id: &str, parts: PartsByNumber) {
        let key = parts_cache_key(model_number, model_id);
        let incoming = parts.len();

        let mut tables = self.lock();
        let entry = tables.parts.entry(key).or_insert_with(|| ModelParts {
            model_number: model_number.to_string(),
            model_id: model_id.to_string(),
            parts: PartsByNumber::new(),
        });
        entry.parts.extend(parts);
        debug!(
            "Merged {} parts into {} ({} total)",
            incoming,
            model_number,
            entry.parts.len()
        );
        self.persist(&tables);
    }

    /// Parts cached for one model/id pair.
    pub fn parts_for_model(&self, model_number: &str, model_id: &str) -> Option<PartsByNumber> {
        self.lock()
            .parts
            .get(&parts_cache_key(model_number, model_id))
            .map(|entry| entry.parts.clone())
    }

    /// Search every cached part by part number or description.
    ///
    /// `manufacturer_filter` restricts results to models whose number starts
    /// with the given code. Part-number matches come before description-only
    /// matches; order is otherwise the cache's iteration order.
    pub fn search_parts(&self, term: &str, manufacturer_filter: Option<&str>) -> Vec<PartMatch> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        let prefix = manufacturer_filter
            .map(|code| code.trim().to_lowercase())
            .filter(|code| !code.is_empty());

        let tables = self.lock();
        let mut by_number = Vec::new();
        let mut by_description = Vec::new();

        for entry in tables.parts.values() {
            if let Some(prefix) = &prefix {
                if !entry.model_number.to_lowercase().starts_with(prefix.as_str()) {
                    continue;
                }
            }

            for part in entry.parts.values() {
                let bucket = if part.part_number().to_lowercase().contains(&term) {
                    &mut by_number
                } else if part.part_description().to_lowercase().contains(&term) {
                    &mut by_description
                } else {
                    continue;
                };
                bucket.push(PartMatch {
                    model_number: entry.model_number.clone(),
                    model_id: entry.model_id.clone(),
                    part: part.clone(),
                });
            }
        }

        by_number.extend(by_description);
        by_number
    }

    /// Drop every cached part and mapping, and persist the empty tables.
    pub fn clear(&self) {
        let mut tables = self.lock();
        *tables = PartsTables::default();
        self.persist(&tables);
    }

    pub fn model_count(&self) -> usize {
        self.lock().parts.len()
    }

    pub fn part_count(&self) -> usize {
        self.lock()
            .parts
            .values()
            .map(|entry| entry.parts.len())
            .sum()
    }

    pub fn status(&self) -> PartsStatus {
        let tables = self.lock();
        PartsStatus {
            cached_models: tables.parts.len(),
            cached_parts: tables.parts.values().map(|entry| entry.parts.len()).sum(),
            model_id_mappings: tables.model_ids.len(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PartsTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, tables: &PartsTables) {
        if let Err(e) = save_tables(self.store.as_ref(), tables) {
            warn!("Failed to persist parts cache: {}", e);
        }
    }
}

/// Both tables are stored as JSON arrays of `[key, value]` pairs.
fn save_tables(store: &dyn KeyValueStore, tables: &PartsTables) -> Result<()> {
    let parts: Vec<(&String, &PartsByNumber)> = tables
        .parts
        .iter()
        .map(|(key, entry)| (key, &entry.parts))
        .collect();
    let model_ids: Vec<(&String, &String)> = tables.model_ids.iter().collect();

    store.set(PartsConfig::PARTS_STORAGE_KEY, &serde_json::to_string(&parts)?)?;
    store.set(
        PartsConfig::MODEL_ID_STORAGE_KEY,
        &serde_json::to_string(&model_ids)?,
    )?;
    Ok(())
}

fn load_tables(store: &dyn KeyValueStore) -> Result<PartsTables> {
    let mut tables = PartsTables::default();

    if let Some(raw) = store.get(PartsConfig::MODEL_ID_STORAGE_KEY)? {
        let pairs: Vec<(String, String)> = serde_json::from_str(&raw)?;
        tables.model_ids.extend(pairs);
    }

    if let Some(raw) = store.get(PartsConfig::PARTS_STORAGE_KEY)? {
        let pairs: Vec<(String, PartsByNumber)> = serde_json::from_str(&raw)?;
        for (key, parts) in pairs {
            let (model_number, model_id) = split_parts_key(&key, &tables.model_ids);
            tables.parts.insert(
                key,
                ModelParts {
                    model_number,
                    model_id,
                    parts,
                },
            );
        }
    }

    Ok(tables)
}

/// Recover the model number and id behind a `"{model}_{id}"` key.
///
/// Both halves may contain '_', so a recorded mapping that reproduces the key
/// wins. Unmapped keys split at the last '_'.
fn split_parts_key(key: &str, model_ids: &BTreeMap<String, String>) -> (String, String) {
    let mapped = model_ids
        .iter()
        .find(|(model, id)| parts_cache_key(model, id) == key);
    if let Some((model, id)) = mapped {
        return (model.clone(), id.clone());
    }

    key.rsplit_once('_')
        .map(|(model, id)| (model.to_string(), id.to_string()))
        .unwrap_or_else(|| (key.to_string(), String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::FileStore;
    use std::thread;
    use tempfile::TempDir;

    fn parts(entries: &[(&str, &str)]) -> PartsByNumber {
        entries
            .iter()
            .map(|(number, description)| (number.to_string(), PartRecord::new(*number, *description)))
            .collect()
    }

    #[test]
    fn test_search_ranking() {
        let cache = PartsCache::in_memory();
        cache.add_parts_for_model("WRF535SWHZ", "9001", parts(&[("A1", "seal kit"), ("B2", "motor")]));

        let results = cache.search_parts("A1", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].part.part_number(), "A1");

        let results = cache.search_parts("seal", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].part.part_description(), "seal kit");
        assert_eq!(results[0].model_number, "WRF535SWHZ");
        assert_eq!(results[0].model_id, "9001");
    }

    #[test]
    fn test_part_number_matches_precede_description_matches() {
        let cache = PartsCache::in_memory();
        cache.add_parts_for_model(
            "WRF535SWHZ",
            "9001",
            parts(&[("AAA", "pump for drain"), ("DRAIN-1", "hose")]),
        );

        let results = cache.search_parts("drain", None);
        let numbers: Vec<&str> = results.iter().map(|m| m.part.part_number()).collect();
        assert_eq!(numbers, vec!["DRAIN-1", "AAA"]);
    }

    #[test]
    fn test_manufacturer_filter() {
        let cache = PartsCache::in_memory();
        cache.add_parts_for_model("WRF535SWHZ", "1", parts(&[("W1", "door seal")]));
        cache.add_parts_for_model("GDF520", "2", parts(&[("G1", "door seal")]));

        assert_eq!(cache.search_parts("seal", None).len(), 2);

        let results = cache.search_parts("seal", Some("wr"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].part.part_number(), "W1");

        // Blank filter is ignored
        assert_eq!(cache.search_parts("seal", Some(" ")).len(), 2);
        assert!(cache.search_parts("  ", None).is_empty());
    }

    #[test]
    fn test_add_parts_merges() {
        let cache = PartsCache::in_memory();
        cache.add_parts_for_model("M", "1", parts(&[("A1", "old"), ("B2", "motor")]));
        cache.add_parts_for_model("M", "1", parts(&[("A1", "new"), ("C3", "belt")]));

        let stored = cache.parts_for_model("M", "1").unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored["A1"].part_description(), "new");
        assert_eq!(cache.model_count(), 1);
        assert_eq!(cache.part_count(), 3);
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(temp_dir.path()));

        {
            let cache = PartsCache::open(store.clone());
            cache.add_model_id_mapping("WRF_535", "9001");
            cache.add_parts_for_model("WRF_535", "9001", parts(&[("A1", "seal kit")]));
        }

        let raw = store.get(PartsConfig::MODEL_ID_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[["WRF_535","9001"]]"#);

        let reopened = PartsCache::open(store);
        assert_eq!(reopened.get_model_id("WRF_535").as_deref(), Some("9001"));
        let results = reopened.search_parts("seal", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model_number, "WRF_535");
        assert_eq!(results[0].model_id, "9001");
    }

    #[test]
    fn test_reload_keeps_model_ids_with_underscores() {
        let store = Arc::new(MemoryStore::new());
        {
            let cache = PartsCache::open(store.clone());
            cache.add_model_id_mapping("WRF535", "90_01");
            cache.add_parts_for_model("WRF535", "90_01", parts(&[("A1", "seal kit")]));
            cache.add_parts_for_model("GDF_520", "7", parts(&[("G1", "seal ring")]));
        }

        let reopened = PartsCache::open(store);
        let results = reopened.search_parts("seal", Some("wrf"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model_number, "WRF535");
        assert_eq!(results[0].model_id, "90_01");
        assert!(reopened.parts_for_model("WRF535", "90_01").is_some());

        // Unmapped keys still split at the last '_'
        let results = reopened.search_parts("seal", Some("gdf"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model_number, "GDF_520");
        assert_eq!(results[0].model_id, "7");
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(PartsConfig::PARTS_STORAGE_KEY, "not json").unwrap();

        let cache = PartsCache::open(store);
        assert_eq!(cache.status(), PartsStatus::default());
    }

    #[test]
    fn test_clear_persists_empty_tables() {
        let store = Arc::new(MemoryStore::new());
        let cache = PartsCache::open(store.clone());
        cache.add_model_id_mapping("M", "1");
        cache.add_parts_for_model("M", "1", parts(&[("A1", "seal")]));

        cache.clear();
        assert_eq!(cache.model_count(), 0);
        assert_eq!(
            store.get(PartsConfig::PARTS_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(PartsCache::open(store).status(), PartsStatus::default());
    }

    #[test]
    fn test_concurrent_mutations_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(PartsCache::open(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    cache.add_model_id_mapping(&format!("MODEL{i}"), &i.to_string());
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(PartsCache::open(store).status().model_id_mappings, 8);
    }
}
