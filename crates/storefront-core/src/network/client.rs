//! HTTP client wrapper.
//!
//! Wraps reqwest with:
//! - One configurable timeout per client (no retries)
//! - Uniform mapping of transport and status failures into `StorefrontError`
//! - User-agent management

use crate::{Result, StorefrontError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client used by both gateways.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client whose every request is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storefront-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorefrontError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error("GET", url, e))?;

        let response = check_status(response, url)?;
        self.decode(response, url).await
    }

    /// POST a JSON body to `url` and decode the response body as JSON.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error("POST", url, e))?;

        let response = check_status(response, url)?;
        self.decode(response, url).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, url: &str) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error("READ", url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StorefrontError::Json {
            message: format!("Invalid JSON from {}: {}", url, e),
            source: Some(e),
        })
    }

    fn transport_error(&self, verb: &str, url: &str, err: reqwest::Error) -> StorefrontError {
        if err.is_timeout() {
            StorefrontError::Timeout(self.timeout)
        } else {
            StorefrontError::Network {
                message: format!("{} {} failed: {}", verb, url, err),
                status_code: err.status().map(|s| s.as_u16()),
            }
        }
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(StorefrontError::Network {
        message: format!("{} returned HTTP {}", url, status),
        status_code: Some(status.as_u16()),
    })
}
