//! Error types for rate validation and lookup.

use thiserror::Error;

/// A rate document too malformed to be checked field by field.
#[derive(Debug, Error)]
pub enum RateStructureError {
    /// The document itself is not a JSON object.
    #[error("rate document must be an object")]
    NotAnObject,
    /// A known field has the wrong shape.
    #[error("malformed {field}: {reason}")]
    Malformed { field: String, reason: String },
}

/// Errors returned by rate lookup collaborators.
#[derive(Debug, Error)]
pub enum RateLookupError {
    /// The HTTP request failed.
    #[error("rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("rate service returned status {0}")]
    Status(u16),
    /// The response body could not be decoded.
    #[error("failed to decode rate response: {0}")]
    Decode(String),
    /// Reading a local rate catalog failed.
    #[error("failed to read rate catalog: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a local rate catalog failed.
    #[error("failed to parse rate catalog: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The lookup is misconfigured or disabled.
    #[error("rate lookup unavailable: {0}")]
    Unavailable(String),
}
