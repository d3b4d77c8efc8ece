//! Error types for the sourcing pipeline.

use thiserror::Error;

/// Result type for sourcing operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that abort a sourcing run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Fetching from Strapi failed.
    #[error("client error: {0}")]
    Client(#[from] strapi_client::ClientError),

    /// Schema decoding failed.
    #[error("schema error: {0}")]
    Schema(#[from] strapi_schema::SchemaError),

    /// The cache backend failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// The content graph rejected an operation.
    #[error("graph error: {0}")]
    Graph(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file-backed cache).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
