// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keyward serve`: recovery, the pass ticker, cache purging and the
//! worker pool, all stopped by one cancellation token.

use std::sync::Arc;
use std::time::Duration;

use keyward_config::KeywardConfig;
use keyward_core::{CacheStore, Clock, KeywardError};
use keyward_scheduler::Scheduler;
use keyward_scheduler::shutdown::install_signal_handler;
use keyward_storage::SqliteStorage;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::runtime::Runtime;

pub async fn run_serve(config: KeywardConfig) -> Result<(), KeywardError> {
    let runtime = Runtime::open(&config).await?;
    runtime.recover().await?;

    let cancel = install_signal_handler();
    let passes = spawn_pass_loop(
        runtime.scheduler.clone(),
        Duration::from_secs(config.scheduler.pass_interval_secs),
        cancel.clone(),
    );
    let purges = spawn_purge_loop(
        runtime.storage.clone(),
        runtime.clock.clone(),
        Duration::from_secs(config.scheduler.cache_purge_interval_secs),
        cancel.clone(),
    );
    info!(
        database = %config.storage.database_path,
        api = %config.api.base_url,
        "keyward serving"
    );

    runtime.worker_pool(&config).run(cancel.clone()).await;

    for handle in [passes, purges] {
        if let Err(e) = handle.await {
            error!(error = %e, "background loop ended abnormally");
        }
    }
    runtime.close().await?;
    info!("keyward stopped");
    Ok(())
}

fn spawn_pass_loop(
    scheduler: Arc<Scheduler>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = scheduler.run_pass().await {
                        error!(error = %e, "scheduling pass failed");
                    }
                }
            }
        }
        debug!("pass loop stopped");
    })
}

fn spawn_purge_loop(
    storage: Arc<SqliteStorage>,
    clock: Arc<dyn Clock>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match storage.purge_expired_responses(clock.now()).await {
                        Ok(0) => {}
                        Ok(purged) => debug!(purged, "expired responses purged"),
                        Err(e) => error!(error = %e, "cache purge failed"),
                    }
                }
            }
        }
        debug!("purge loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::tests::config;
    use keyward_core::{ScheduleStore, TaskState};
    use keyward_storage::queries::credentials::insert_credential;
    use keyward_test_utils::ManualClock;
    use keyward_test_utils::envelope::t;
    use tempfile::TempDir;

    #[tokio::test]
    async fn purge_loop_removes_expired_entries_and_stops() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::at(t(12, 0, 0)));
        let runtime = Runtime::open_with_clock(&config(&dir), clock.clone()).await.unwrap();
        runtime
            .storage
            .store_response("/a", "sig", "{}", t(11, 0, 0))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_purge_loop(
            runtime.storage.clone(),
            clock,
            Duration::from_millis(10),
            cancel.clone(),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(runtime.storage.cached_response_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pass_loop_runs_on_start() {
        let dir = TempDir::new().unwrap();
        let runtime = Runtime::open(&config(&dir)).await.unwrap();
        let credential = keyward_core::Credential {
            id: 1,
            owner_id: 1,
            key_id: 500,
            v_code: "secret".into(),
            key_type: None,
            access_mask: 0,
            valid: true,
            expires: None,
            paid_until: None,
            corp_character_id: None,
        };
        insert_credential(runtime.storage.database().unwrap(), &credential)
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_pass_loop(runtime.scheduler.clone(), Duration::from_secs(3600), cancel.clone());
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(
            runtime.storage.schedule_state_counts().await.unwrap(),
            vec![(TaskState::Running, 1)]
        );
    }
}
