// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock HTTP transport for deterministic fetch tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use keyward_core::{
    AdapterType, HealthStatus, HttpTransport, KeywardError, PluginAdapter, TransportResponse,
};

/// A request the transport was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

type Reply = Result<TransportResponse, String>;

/// Transport that replays queued responses and records every request.
///
/// Responses queued for a specific path win over the shared FIFO. When
/// both are empty an empty `200` is returned, which the fetch pipeline
/// treats as "no document".
#[derive(Clone, Default)]
pub struct MockTransport {
    shared: Arc<Mutex<VecDeque<Reply>>>,
    routed: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `200` response with `body`.
    pub async fn push_body(&self, body: String) {
        self.shared.lock().await.push_back(Ok(TransportResponse { status: 200, body }));
    }

    /// Queue a response with an arbitrary status.
    pub async fn push_status(&self, status: u16, body: &str) {
        self.shared.lock().await.push_back(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a connection-level failure.
    pub async fn push_failure(&self, message: &str) {
        self.shared.lock().await.push_back(Err(message.to_string()));
    }

    /// Queue a `200` response served only to requests for `path`.
    pub async fn route(&self, path: &str, body: String) {
        self.routed
            .lock()
            .await
            .entry(path.to_string())
            .or_default()
            .push_back(Ok(TransportResponse { status: 200, body }));
    }

    /// Every request sent so far, in order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self, path: &str) -> Reply {
        if let Some(reply) = self
            .routed
            .lock()
            .await
            .get_mut(path)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        self.shared.lock().await.pop_front().unwrap_or_else(|| {
            Ok(TransportResponse {
                status: 200,
                body: String::new(),
            })
        })
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
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

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, KeywardError> {
        self.requests.lock().await.push(RecordedRequest {
            path: path.to_string(),
            params: params.to_vec(),
        });
        self.next_reply(path).await.map_err(|message| KeywardError::Transport {
            message,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn routed_replies_win_over_shared_queue() {
        let transport = MockTransport::new();
        transport.push_body("shared".into()).await;
        transport.route("/a", "routed".into()).await;

        let a = transport.post_form("/a", &[]).await.unwrap();
        let b = transport.post_form("/b", &[]).await.unwrap();
        let c = transport.post_form("/a", &[]).await.unwrap();
        assert_eq!(a.body, "routed");
        assert_eq!(b.body, "shared");
        assert_eq!(c.body, "");
        assert_eq!(transport.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn queued_failure_surfaces_as_transport_error() {
        let transport = MockTransport::new();
        transport.push_failure("connection reset").await;
        let err = transport.post_form("/a", &[]).await.unwrap_err();
        assert!(matches!(err, KeywardError::Transport { .. }));
    }
}
