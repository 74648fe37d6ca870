//! Error types for schema loading.

use thiserror::Error;

/// Errors returned while loading or parsing a schema catalog.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Reading a schema file failed.
    #[error("failed to read schema: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a schema file failed.
    #[error("failed to parse schema: {0}")]
    ParseFailed(#[from] json5::Error),
    /// A specific schema entry is malformed.
    #[error("invalid schema at {path}: {message}")]
    InvalidEntry { path: String, message: String },
    /// Generic schema failure.
    #[error("invalid schema: {0}")]
    Invalid(String),
}
