// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job dispatch and consumption.

use async_trait::async_trait;

use crate::endpoint::QueueClass;
use crate::error::KeywardError;
use crate::types::JobRequest;

/// A job taken off the queue by a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedJob {
    pub id: i64,
    pub queue: QueueClass,
    pub payload: String,
    pub attempts: i32,
}

/// Producer side: the scheduler hands due units to the execution transport.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Enqueue exactly one job on the given queue class. Returns the queue entry id.
    async fn enqueue(&self, job: &JobRequest, queue: QueueClass) -> Result<i64, KeywardError>;
}

/// Consumer side used by the worker pool.
#[async_trait]
pub trait JobQueue: JobDispatcher {
    /// Atomically take the oldest pending job of a queue class.
    async fn dequeue(&self, queue: QueueClass) -> Result<Option<QueuedJob>, KeywardError>;

    /// Mark a job as done. Called whether the job succeeded or failed;
    /// retry cadence belongs to the schedule state, not the queue.
    async fn ack(&self, id: i64) -> Result<(), KeywardError>;

    /// Record a delivery failure (e.g. an undecodable payload).
    async fn fail(&self, id: i64) -> Result<(), KeywardError>;

    /// Drop every pending or in-flight entry. Used on start-up recovery.
    async fn discard_unfinished(&self) -> Result<usize, KeywardError>;

    /// Number of pending entries in a queue class.
    async fn pending(&self, queue: QueueClass) -> Result<i64, KeywardError>;
}
