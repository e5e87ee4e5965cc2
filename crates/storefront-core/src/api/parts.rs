//! Repair-parts methods on CatalogService.

use std::sync::Arc;

use crate::error::{Result, StorefrontError};
use crate::models::{DiagramDescriptor, PartsStatus};
use crate::parts::{PartMatch, PartsCache, PartsCatalog};
use crate::CatalogService;

impl CatalogService {
    /// The durable parts cache, for direct access.
    pub fn parts(&self) -> &Arc<PartsCache> {
        &self.inner.parts
    }

    pub fn has_parts_service(&self) -> bool {
        self.inner.parts_catalog.is_some()
    }

    pub fn search_parts(&self, term: &str, manufacturer_filter: Option<&str>) -> Vec<PartMatch> {
        self.inner.parts.search_parts(term, manufacturer_filter)
    }

    pub fn get_model_id(&self, model_number: &str) -> Option<String> {
        self.inner.parts.get_model_id(model_number)
    }

    pub fn add_model_id_mapping(&self, model_number: &str, model_id: &str) {
        self.inner.parts.add_model_id_mapping(model_number, model_id);
    }

    pub fn parts_status(&self) -> PartsStatus {
        self.inner.parts.status()
    }

    /// List a model's diagrams from the parts service.
    pub async fn get_diagrams(
        &self,
        model_number: &str,
        model_id: &str,
    ) -> Result<Vec<DiagramDescriptor>> {
        self.parts_catalog()?
            .get_diagrams(model_number, model_id)
            .await
    }

    /// Load every diagram's parts for a model into the parts cache.
    ///
    /// Returns the number of distinct parts fetched.
    pub async fn load_model_parts(&self, model_number: &str, model_id: &str) -> Result<usize> {
        self.parts_catalog()?
            .load_model_parts(model_number, model_id)
            .await
    }

    fn parts_catalog(&self) -> Result<&PartsCatalog> {
        self.inner
            .parts_catalog
            .as_ref()
            .ok_or_else(|| StorefrontError::Config {
                message: "Parts service is not configured".to_string(),
            })
    }
}
