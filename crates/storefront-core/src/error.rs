//! Error types for the storefront catalog library.
//!
//! The search path itself never fails: the gateway and cache manager degrade
//! to empty results. These errors surface from construction, persistence,
//! parameter validation, and the explicit (non-degrading) gateway calls.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the storefront library.
#[derive(Debug, Error)]
pub enum StorefrontError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// HTTP status returned by the upstream, if any
        status_code: Option<u16>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Unexpected response shape from {endpoint}")]
    MalformedResponse { endpoint: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for storefront operations.
pub type Result<T> = std::result::Result<T, StorefrontError>;

impl From<std::io::Error> for StorefrontError {
    fn from(err: std::io::Error) -> Self {
        StorefrontError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl StorefrontError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        StorefrontError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Network/connectivity error
    /// - -32005: Validation error
    ///
    /// Standard codes: -32602 for invalid params, -32603 for everything else.
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            StorefrontError::Network { .. }
            | StorefrontError::Timeout(_)
            | StorefrontError::MalformedResponse { .. } => -32000,

            StorefrontError::InvalidParams { .. } => -32602,

            StorefrontError::Validation { .. } => -32005,

            _ => -32603,
        }
    }
}
