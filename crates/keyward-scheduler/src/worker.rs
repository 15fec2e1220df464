// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue consumers.
//!
//! Each worker polls one queue class. A job body runs in its own task so a
//! panic is contained; whatever happens, the unit is handed back through
//! [`Scheduler::complete`] or [`Scheduler::fail`] and the queue entry is
//! acknowledged.

use std::sync::Arc;
use std::time::Duration;

use keyward_config::model::WorkersConfig;
use keyward_core::{JobQueue, JobRequest, KeywardError, QueueClass, QueuedJob};
use keyward_fetch::FailureKind;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::JobError;
use crate::runner::{JobContext, execute};
use crate::scheduler::Scheduler;

pub struct WorkerPool {
    shared: Arc<Shared>,
    low: usize,
    medium: usize,
    poll_interval: Duration,
}

struct Shared {
    queue: Arc<dyn JobQueue>,
    scheduler: Arc<Scheduler>,
    ctx: JobContext,
}

impl WorkerPool {
    pub fn new(
        config: &WorkersConfig,
        queue: Arc<dyn JobQueue>,
        scheduler: Arc<Scheduler>,
        ctx: JobContext,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue,
                scheduler,
                ctx,
            }),
            low: config.low,
            medium: config.medium,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Run every worker until `cancel` fires. In-flight jobs finish first.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut handles = Vec::with_capacity(self.low + self.medium);
        for (class, count) in [(QueueClass::Low, self.low), (QueueClass::Medium, self.medium)] {
            for index in 0..count {
                let shared = Arc::clone(&self.shared);
                let cancel = cancel.clone();
                let poll_interval = self.poll_interval;
                handles.push(tokio::spawn(async move {
                    shared.work(class, index, poll_interval, cancel).await;
                }));
            }
        }
        info!(low = self.low, medium = self.medium, "worker pool started");

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "worker task ended abnormally");
            }
        }
        info!("worker pool stopped");
    }

    /// Take and process one job from `class`. Returns `false` when the queue was empty.
    pub async fn run_once(&self, class: QueueClass) -> Result<bool, KeywardError> {
        self.shared.run_once(class).await
    }
}

impl Shared {
    async fn work(
        &self,
        class: QueueClass,
        index: usize,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) {
        debug!(queue = %class, worker = index, "worker started");
        while !cancel.is_cancelled() {
            match self.run_once(class).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => error!(queue = %class, worker = index, error = %e, "worker iteration failed"),
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
        debug!(queue = %class, worker = index, "worker stopped");
    }

    async fn run_once(&self, class: QueueClass) -> Result<bool, KeywardError> {
        let Some(queued) = self.queue.dequeue(class).await? else {
            return Ok(false);
        };
        self.process(queued).await?;
        Ok(true)
    }

    async fn process(&self, queued: QueuedJob) -> Result<(), KeywardError> {
        let job: JobRequest = match serde_json::from_str(&queued.payload) {
            Ok(job) => job,
            Err(e) => {
                error!(queue_id = queued.id, error = %e, "undecodable job payload");
                return self.queue.fail(queued.id).await;
            }
        };

        let ctx = self.ctx.clone();
        let body = job.clone();
        let outcome = tokio::spawn(async move { execute(&ctx, &body).await }).await;

        let released = match outcome {
            Ok(Ok(document)) => match self.scheduler.complete(job.state_id, document.as_ref()).await {
                Ok(_) => Ok(()),
                Err(e) => {
                    error!(state_id = job.state_id, endpoint = %job.endpoint, error = %e, "completing unit failed, releasing as failed");
                    self.release_failed(&job).await
                }
            },
            Ok(Err(e)) => {
                log_failure(&job, &e);
                self.release_failed(&job).await
            }
            Err(e) => {
                error!(state_id = job.state_id, endpoint = %job.endpoint, error = %e, "job task panicked");
                self.release_failed(&job).await
            }
        };

        // The entry is acknowledged even when the unit could not be released.
        let acked = self.queue.ack(queued.id).await;
        released.and(acked)
    }

    async fn release_failed(&self, job: &JobRequest) -> Result<(), KeywardError> {
        self.scheduler.fail(job.state_id).await.map(|_| ())
    }
}

fn log_failure(job: &JobRequest, err: &JobError) {
    let endpoint = job.endpoint;
    let credential_id = job.credential_id;
    match err.fetch_kind() {
        // Already logged once by the fetcher.
        Some(FailureKind::TransientApplication) => {
            debug!(credential_id, %endpoint, error = %err, "job failed")
        }
        Some(FailureKind::Transport | FailureKind::Malformed | FailureKind::CredentialInvalidated) => {
            warn!(credential_id, %endpoint, error = %err, "job failed")
        }
        Some(FailureKind::Storage) | None => {
            error!(credential_id, %endpoint, error = %err, "job failed")
        }
    }
}
