//! Error types for the OCR HTTP client.
//!
//! # Design
//! The facade adds only two failure conditions of its own: a multipart file
//! that cannot be read (`Io`) and a response body that is not valid JSON
//! (`Parse`). Transport failures are carried through untouched so callers see
//! exactly what the underlying HTTP library reported.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed failure raised by a [`Transport`](crate::transport::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `HttpClient` operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A file referenced by an upload could not be read. No request was sent.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transport failed (connection, TLS, timeout, or an error status
    /// when `http_errors` is enabled).
    #[error(transparent)]
    Transport(TransportError),

    /// A non-empty response body did not decode as JSON.
    #[error("Failed to parse JSON: {0}")]
    Parse(String),

    /// A JSON request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The method name is not one this client knows how to send.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, HttpError>;
