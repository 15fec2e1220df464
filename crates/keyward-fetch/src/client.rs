// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest transport for the remote API.

use std::time::Duration;

use async_trait::async_trait;
use keyward_config::model::ApiConfig;
use keyward_core::{
    AdapterType, HealthStatus, HttpTransport, KeywardError, PluginAdapter, TransportResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

/// Posts form-encoded requests to the configured API host.
///
/// No retries: a failed request is retried by the scheduler after the
/// grace period.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, KeywardError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| {
                KeywardError::Config(format!("invalid api.user_agent header value: {e}"))
            })?,
        );

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| KeywardError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ApiClient {
    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, KeywardError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KeywardError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    KeywardError::Transport {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| KeywardError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(path, status, bytes = body.len(), "API response received");

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl PluginAdapter for ApiClient {
    fn name(&self) -> &str {
        "reqwest"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        Ok(())
    }
}
