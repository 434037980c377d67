//! Error types for the Raindrop API client.
//!
//! # Design
//! Construction and transport failures are captured inside an
//! `OperationResponse` instead of being returned from the executing client
//! methods; they surface when the response is consumed. `NotFound` and
//! `Unauthorized` get dedicated variants because callers commonly branch on
//! them. All other non-2xx responses land in `HttpError` with the raw status
//! and body.

use thiserror::Error;

/// Errors produced while building, sending, or consuming a Raindrop request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401; the bearer token is missing or rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned a non-2xx status other than 401 and 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request URL could not be formed from the base URL and route.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never completed: connect, TLS, or timeout failure.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be read as UTF-8 text.
    #[error("reading response body failed: {0}")]
    BodyRead(String),
}
