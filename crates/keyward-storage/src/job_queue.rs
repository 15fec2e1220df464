// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed job transport between the scheduler and the worker pool.

use async_trait::async_trait;
use tracing::{debug, warn};

use keyward_core::traits::QueuedJob;
use keyward_core::{
    AdapterType, HealthStatus, JobDispatcher, JobQueue, JobRequest, KeywardError, PluginAdapter,
    QueueClass,
};

use crate::database::Database;
use crate::queries::queue;

/// Job queue sharing the storage database.
#[derive(Clone)]
pub struct SqliteJobQueue {
    db: Database,
}

impl SqliteJobQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteJobQueue {
    fn name(&self) -> &str {
        "sqlite-queue"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        let mut backlog = 0;
        for class in QueueClass::ALL {
            backlog += queue::pending_count(&self.db, &class.to_string()).await?;
        }
        debug!(backlog, "job queue health check");
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        Ok(())
    }
}

#[async_trait]
impl JobDispatcher for SqliteJobQueue {
    async fn enqueue(&self, job: &JobRequest, class: QueueClass) -> Result<i64, KeywardError> {
        let payload = serde_json::to_string(job)?;
        let id = queue::enqueue(&self.db, &class.to_string(), &payload).await?;
        debug!(queue_id = id, queue = %class, endpoint = %job.endpoint, state_id = job.state_id, "job enqueued");
        Ok(id)
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn dequeue(&self, class: QueueClass) -> Result<Option<QueuedJob>, KeywardError> {
        let row = queue::dequeue(&self.db, &class.to_string()).await?;
        Ok(row.map(|row| QueuedJob {
            id: row.id,
            queue: class,
            payload: row.payload,
            attempts: row.attempts,
        }))
    }

    async fn ack(&self, id: i64) -> Result<(), KeywardError> {
        queue::ack(&self.db, id).await
    }

    async fn fail(&self, id: i64) -> Result<(), KeywardError> {
        queue::fail(&self.db, id).await
    }

    async fn discard_unfinished(&self) -> Result<usize, KeywardError> {
        let discarded = queue::discard_unfinished(&self.db).await?;
        if discarded > 0 {
            warn!(discarded, "discarded unfinished queue entries");
        }
        Ok(discarded)
    }

    async fn pending(&self, class: QueueClass) -> Result<i64, KeywardError> {
        queue::pending_count(&self.db, &class.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use keyward_core::Endpoint;

    #[tokio::test]
    async fn jobs_round_trip_through_their_queue_class() {
        let (db, _dir) = setup_db().await;
        let q = SqliteJobQueue::new(db);
        let job = JobRequest {
            endpoint: Endpoint::SkillQueue,
            credential_id: 1,
            state_id: 9,
            parameter: Some(90),
        };

        q.enqueue(&job, QueueClass::Medium).await.unwrap();
        assert!(q.dequeue(QueueClass::Low).await.unwrap().is_none());
        assert_eq!(q.pending(QueueClass::Medium).await.unwrap(), 1);

        let queued = q.dequeue(QueueClass::Medium).await.unwrap().unwrap();
        assert_eq!(queued.queue, QueueClass::Medium);
        let decoded: JobRequest = serde_json::from_str(&queued.payload).unwrap();
        assert_eq!(decoded, job);
        q.ack(queued.id).await.unwrap();
        assert_eq!(q.pending(QueueClass::Medium).await.unwrap(), 0);
    }
}
