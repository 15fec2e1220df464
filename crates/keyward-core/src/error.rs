// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for keyward.

use thiserror::Error;

/// The primary error type used across all keyward adapter traits and core operations.
#[derive(Debug, Error)]
pub enum KeywardError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP transport errors (connection failure, unreadable body).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Application-level error reported inside a remote API document.
    #[error("remote API error {code}: {message}")]
    Api { code: u32, message: String },

    /// A referenced row does not exist.
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Payload encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for KeywardError {
    fn from(e: serde_json::Error) -> Self {
        KeywardError::Serialization {
            source: Box::new(e),
        }
    }
}
