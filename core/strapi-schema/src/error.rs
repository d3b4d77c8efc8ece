//! Error types for schema decoding.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while decoding content-type builder responses.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The response body did not have the `{data: [{uid, schema}]}` shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A schema entry was structurally unusable.
    #[error("invalid schema for {uid}: {reason}")]
    InvalidSchema { uid: String, reason: String },
}
