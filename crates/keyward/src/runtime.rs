// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of storage, queue, fetch pipeline and scheduler from config.

use std::sync::Arc;

use keyward_config::KeywardConfig;
use keyward_core::{Clock, JobQueue, KeywardError, ScheduleStore, StorageAdapter, SystemClock};
use keyward_fetch::{ApiClient, Fetcher, RequestCache};
use keyward_scheduler::{JobContext, Scheduler, WorkerPool};
use keyward_storage::{SqliteJobQueue, SqliteStorage};
use tracing::info;

pub struct Runtime {
    pub storage: Arc<SqliteStorage>,
    pub queue: Arc<SqliteJobQueue>,
    pub scheduler: Arc<Scheduler>,
    pub ctx: JobContext,
    pub clock: Arc<dyn Clock>,
}

impl Runtime {
    pub async fn open(config: &KeywardConfig) -> Result<Self, KeywardError> {
        Self::open_with_clock(config, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        config: &KeywardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, KeywardError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        let queue = Arc::new(SqliteJobQueue::new(storage.database()?.clone()));

        let fetcher = Fetcher::new(
            RequestCache::new(storage.clone(), clock.clone()),
            Arc::new(ApiClient::new(&config.api)?),
            storage.clone(),
        );
        let scheduler = Arc::new(Scheduler::new(
            &config.scheduler,
            storage.clone(),
            storage.clone(),
            queue.clone(),
            clock.clone(),
        ));
        let ctx = JobContext::new(
            Arc::new(fetcher),
            storage.clone(),
            storage.clone(),
            clock.clone(),
        );

        Ok(Self {
            storage,
            queue,
            scheduler,
            ctx,
            clock,
        })
    }

    /// Drop queue entries from a previous run and release every unit they held.
    pub async fn recover(&self) -> Result<(), KeywardError> {
        let discarded = self.queue.discard_unfinished().await?;
        let reset = self.storage.recover_running(self.clock.now()).await?;
        info!(discarded, reset, "recovered from previous run");
        Ok(())
    }

    pub fn worker_pool(&self, config: &KeywardConfig) -> WorkerPool {
        WorkerPool::new(
            &config.workers,
            self.queue.clone(),
            self.scheduler.clone(),
            self.ctx.clone(),
        )
    }

    pub async fn close(&self) -> Result<(), KeywardError> {
        self.storage.close().await
    }
}
