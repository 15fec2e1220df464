// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job dispatcher that records jobs instead of queueing them.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use keyward_core::{
    AdapterType, HealthStatus, JobDispatcher, JobRequest, KeywardError, PluginAdapter, QueueClass,
};

#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    jobs: Arc<Mutex<Vec<(JobRequest, QueueClass)>>>,
    next_id: Arc<AtomicI64>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job enqueued so far, with the queue class it was sent to.
    pub async fn jobs(&self) -> Vec<(JobRequest, QueueClass)> {
        self.jobs.lock().await.clone()
    }

    /// Drain the recorded jobs.
    pub async fn take(&self) -> Vec<(JobRequest, QueueClass)> {
        std::mem::take(&mut *self.jobs.lock().await)
    }
}

#[async_trait]
impl PluginAdapter for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording-dispatcher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        Ok(())
    }
}

#[async_trait]
impl JobDispatcher for RecordingDispatcher {
    async fn enqueue(&self, job: &JobRequest, queue: QueueClass) -> Result<i64, KeywardError> {
        self.jobs.lock().await.push((job.clone(), queue));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
