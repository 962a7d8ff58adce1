//! Error types for the tenant API client.
//!
//! # Design
//! Every variant wraps the underlying cause so callers can walk the
//! `source()` chain. HTTP status codes never produce an error: any response
//! that arrives is a successful exchange, and inspecting the status is left
//! to callers of `ApiClient::execute_raw`.

use thiserror::Error;

/// Boxed cause carried by the transport-level variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("error marshaling body object: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// The method, URL or headers could not form a valid request.
    #[error("error creating HTTP request: {0}")]
    RequestConstructionError(#[source] BoxError),

    /// The network exchange failed (connect, write, read headers, deadline).
    #[error("error making HTTP request: {0}")]
    TransportError(#[source] BoxError),

    /// The response body could not be fully read.
    #[error("error reading response body data: {0}")]
    ResponseReadError(#[source] BoxError),

    /// The response body could not be decoded into the output type. Only
    /// returned when the client is configured for strict decoding.
    #[error("error decoding response body: {0}")]
    DeserializationError(#[source] serde_json::Error),
}

impl ApiError {
    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        ApiError::RequestConstructionError(msg.into().into())
    }
}
