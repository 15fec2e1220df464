// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed failures of a single fetch.

use keyward_core::KeywardError;
use thiserror::Error;

/// Why a fetch produced no usable document.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Non-2xx status, or no response at all (`status` is `None`).
    #[error("transport failure{}: {message}", http_status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The document carried an `error` node, reported for the first time.
    #[error("remote API error {code}: {message}")]
    Application {
        code: u32,
        message: String,
        credential_invalidated: bool,
    },

    /// The same error already reported for this cache entry.
    #[error("remote API error {code} (already reported)")]
    Suppressed {
        code: u32,
        credential_invalidated: bool,
    },

    /// The body could not be parsed as a response envelope.
    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    /// Cache or credential persistence failed.
    #[error(transparent)]
    Storage(#[from] KeywardError),
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Coarse classification used for logging and metrics-free reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    CredentialInvalidated,
    TransientApplication,
    Malformed,
    Storage,
}

impl FetchFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchFailure::Transport { .. } => FailureKind::Transport,
            FetchFailure::Application {
                credential_invalidated: true,
                ..
            }
            | FetchFailure::Suppressed {
                credential_invalidated: true,
                ..
            } => FailureKind::CredentialInvalidated,
            FetchFailure::Application { .. } | FetchFailure::Suppressed { .. } => {
                FailureKind::TransientApplication
            }
            FetchFailure::Malformed { .. } => FailureKind::Malformed,
            FetchFailure::Storage(_) => FailureKind::Storage,
        }
    }
}
