// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP transport used by the fetch pipeline.

use async_trait::async_trait;

use crate::error::KeywardError;

/// Raw transport result; interpretation of the body is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one form-encoded POST against the remote API host.
///
/// Errors are reserved for failures where no response was received at all;
/// non-2xx statuses come back as a [`TransportResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, KeywardError>;
}
