//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers
//! distinguish "the resource does not exist" and "the input was rejected"
//! from other failures. All other non-2xx responses land in `Http`. Each of
//! the three carries the server's `message`, or `FALLBACK_MESSAGE` when the
//! body has none.

use thiserror::Error;

/// Message used when an error response carries no `message` field.
pub const FALLBACK_MESSAGE: &str = "API request failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server returned 422.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The server returned another non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A record was expected but the response was not JSON.
    #[error("response carried no JSON body")]
    EmptyBody,

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The message reported by the server, if this error came from a response.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message }
            | ApiError::Validation { message }
            | ApiError::Http { message, .. } => Some(message),
            _ => None,
        }
    }
}
