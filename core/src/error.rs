//! Error types for the event-listing client.
//!
//! # Design
//! `ApiError` is what the transport client returns. Domain services never let
//! it escape: they log it and hand back a safe default. Stores surface
//! failures as an `error` string, except `CommentError`, which the comment
//! store returns so callers can tell "not logged in" from "backend rejected".

use thiserror::Error;

/// Errors returned by `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `message` is taken from the
    /// body's `message` field when present, otherwise from the body itself.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout,
    /// DNS failure).
    #[error("network error: {0}")]
    Network(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// HTTP status, or `None` for the network-error sentinel and codec errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record could not be encoded or decoded: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from loading `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading env file failed: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("building HTTP client failed: {0}")]
    Transport(String),
}

/// Errors returned by `CommentStore::add_comment`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("User ID not available. Please log in again.")]
    NotAuthenticated,

    #[error("Failed to add comment")]
    Rejected,
}
