//! Repair-parts backend gateway.
//!
//! Unlike the inventory gateway, failures here are returned to the caller:
//! the parts loader decides per diagram whether to skip or abort.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::client::HttpClient;
use crate::config::{PartsConfig, PartsGatewaySettings};
use crate::models::{DiagramDescriptor, PartRecord, PartsByNumber};
use crate::{Result, StorefrontError};

/// Source of diagram and part data for appliance models.
#[async_trait]
pub trait PartsSource: Send + Sync {
    /// List the exploded-view diagrams for a model.
    async fn get_diagrams(
        &self,
        model_number: &str,
        model_id: &str,
    ) -> Result<Vec<DiagramDescriptor>>;

    /// Fetch the parts shown on one diagram, keyed by part number.
    async fn get_diagram_parts(
        &self,
        model_number: &str,
        model_id: &str,
        diagram_id: &str,
    ) -> Result<PartsByNumber>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartsRequest<'a> {
    username: &'a str,
    password: &'a str,
    model_number: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagram_id: Option<&'a str>,
}

/// Parts gateway backed by the parts REST service.
#[derive(Debug, Clone)]
pub struct HttpPartsGateway {
    client: HttpClient,
    settings: PartsGatewaySettings,
}

impl HttpPartsGateway {
    pub fn new(settings: PartsGatewaySettings) -> Result<Self> {
        let client = HttpClient::with_timeout(settings.timeout)?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn request<'a>(
        &'a self,
        model_number: &'a str,
        model_id: &'a str,
        diagram_id: Option<&'a str>,
    ) -> PartsRequest<'a> {
        PartsRequest {
            username: &self.settings.username,
            password: &self.settings.password,
            model_number,
            model_id,
            diagram_id,
        }
    }
}

#[async_trait]
impl PartsSource for HttpPartsGateway {
    async fn get_diagrams(
        &self,
        model_number: &str,
        model_id: &str,
    ) -> Result<Vec<DiagramDescriptor>> {
        let url = self.endpoint(PartsConfig::DIAGRAMS_PATH);
        let body: Value = self
            .client
            .post_json(&url, &self.request(model_number, model_id, None))
            .await?;

        let diagrams = match body {
            Value::Array(_) => serde_json::from_value::<Vec<DiagramDescriptor>>(body)?,
            _ => {
                return Err(StorefrontError::MalformedResponse {
                    endpoint: PartsConfig::DIAGRAMS_PATH.to_string(),
                })
            }
        };
        debug!("{} diagrams for model {}", diagrams.len(), model_number);
        Ok(diagrams)
    }

    async fn get_diagram_parts(
        &self,
        model_number: &str,
        model_id: &str,
        diagram_id: &str,
    ) -> Result<PartsByNumber> {
        let url = self.endpoint(PartsConfig::DIAGRAM_PARTS_PATH);
        let body: Value = self
            .client
            .post_json(&url, &self.request(model_number, model_id, Some(diagram_id)))
            .await?;

        let Value::Object(entries) = body else {
            return Err(StorefrontError::MalformedResponse {
                endpoint: PartsConfig::DIAGRAM_PARTS_PATH.to_string(),
            });
        };

        let mut parts = PartsByNumber::new();
        for (key, value) in entries {
            let mut part: PartRecord = match serde_json::from_value(value) {
                Ok(part) => part,
                Err(e) => {
                    debug!("Skipping undecodable part {}: {}", key, e);
                    continue;
                }
            };
            if part.part_number.is_none() {
                part.part_number = Some(key.clone());
            }
            parts.insert(key, part);
        }
        debug!(
            "{} parts on diagram {} of model {}",
            parts.len(),
            diagram_id,
            model_number
        );
        Ok(parts)
    }
}
