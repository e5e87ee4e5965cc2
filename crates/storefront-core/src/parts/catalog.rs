use std::sync::Arc;
use tracing::{info, warn};

use super::PartsCache;
use crate::models::{DiagramDescriptor, PartsByNumber};
use crate::network::PartsSource;
use crate::Result;

/// Loads diagram parts from the parts service into the parts cache.
#[derive(Clone)]
pub struct PartsCatalog {
    source: Arc<dyn PartsSource>,
    cache: Arc<PartsCache>,
}

impl PartsCatalog {
    pub fn new(source: Arc<dyn PartsSource>, cache: Arc<PartsCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<PartsCache> {
        &self.cache
    }

    pub async fn get_diagrams(
        &self,
        model_number: &str,
        model_id: &str,
    ) -> Result<Vec<DiagramDescriptor>> {
        self.source.get_diagrams(model_number, model_id).await
    }

    /// Fetch every diagram's parts for a model and merge them into the cache.
    ///
    /// Returns the number of distinct parts fetched. Failing diagram calls
    /// are skipped; a failing diagram listing fails the whole load.
    pub async fn load_model_parts(&self, model_number: &str, model_id: &str) -> Result<usize> {
        let diagrams = self.source.get_diagrams(model_number, model_id).await?;

        let mut merged = PartsByNumber::new();
        let mut failed = 0usize;
        for diagram in &diagrams {
            let Some(diagram_id) = diagram.diagram_id.as_deref() else {
                continue;
            };
            match self
                .source
                .get_diagram_parts(model_number, model_id, diagram_id)
                .await
            {
                Ok(parts) => merged.extend(parts),
                Err(e) => {
                    failed += 1;
                    warn!(
                        "Skipping diagram {} of model {}: {}",
                        diagram_id, model_number, e
                    );
                }
            }
        }

        let count = merged.len();
        self.cache.add_model_id_mapping(model_number, model_id);
        self.cache.add_parts_for_model(model_number, model_id, merged);
        info!(
            "Loaded {} parts for {} from {} diagrams ({} failed)",
            count,
            model_number,
            diagrams.len(),
            failed
        );
        Ok(count)
    }
}
