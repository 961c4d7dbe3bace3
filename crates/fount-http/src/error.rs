//! Fetch error taxonomy.

use thiserror::Error;

/// Errors produced by the transport, the response decoder, or the remote API.
///
/// All three are delivered to consumers through the same channel (the `error`
/// field of an envelope); the variants exist so call sites can classify a
/// failure without inspecting message strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The fetch primitive itself failed (DNS, connection refused, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not parseable JSON. Carries the raw body text.
    #[error("Failed to decode response (status {status}): {body}")]
    Decode { status: u16, body: String },

    /// The body parsed but the status code indicates failure. Carries the
    /// server-declared message.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Request-side JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Json(e.to_string())
    }
}
