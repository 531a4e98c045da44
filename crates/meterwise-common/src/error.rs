//! Error types for Meterwise
//!
//! Resolution itself is total and never fails. These errors belong to the
//! outer surfaces: loading inputs, building resources, catalog lookups,
//! configuration and run timeouts.

use thiserror::Error;

/// Result type alias using MeterwiseError
pub type Result<T> = std::result::Result<T, MeterwiseError>;

/// Unified error type for Meterwise operations
#[derive(Debug, Error)]
pub enum MeterwiseError {
    // Resource construction errors
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    // Price catalog errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),

    // Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

/// Errors raised while turning an inbound definition into a typed resource
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Unsupported resource type {resource_type} at {address}")]
    Unsupported {
        address: String,
        resource_type: String,
    },

    #[error("Missing attribute {attribute} on {address}")]
    MissingAttribute { address: String, attribute: String },
}

impl From<serde_json::Error> for MeterwiseError {
    fn from(err: serde_json::Error) -> Self {
        MeterwiseError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for MeterwiseError {
    fn from(err: std::io::Error) -> Self {
        MeterwiseError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for MeterwiseError {
    fn from(err: config::ConfigError) -> Self {
        MeterwiseError::Config(err.to_string())
    }
}

impl From<anyhow::Error> for MeterwiseError {
    fn from(err: anyhow::Error) -> Self {
        MeterwiseError::Internal(err.to_string())
    }
}
