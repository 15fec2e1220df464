// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keyward pass` and `keyward status`.

use keyward_config::KeywardConfig;
use keyward_core::{CacheStore, JobQueue, KeywardError, QueueClass, ScheduleStore, TaskState};
use serde::Serialize;

use crate::runtime::Runtime;

/// Structured output of `keyward status --json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusReport {
    pub queued: i64,
    pub running: i64,
    pub ready: i64,
    pub cached_responses: i64,
    pub pending_low: i64,
    pub pending_medium: i64,
}

#[derive(Debug, Serialize)]
struct PassOutput {
    identities: usize,
    units: usize,
    created: usize,
    dispatched: usize,
    not_due: usize,
    raced: usize,
}

pub async fn collect_status(runtime: &Runtime) -> Result<StatusReport, KeywardError> {
    let mut report = StatusReport {
        queued: 0,
        running: 0,
        ready: 0,
        cached_responses: runtime.storage.cached_response_count().await?,
        pending_low: runtime.queue.pending(QueueClass::Low).await?,
        pending_medium: runtime.queue.pending(QueueClass::Medium).await?,
    };
    for (state, count) in runtime.storage.schedule_state_counts().await? {
        match state {
            TaskState::Queued => report.queued = count,
            TaskState::Running => report.running = count,
            TaskState::Ready => report.ready = count,
        }
    }
    Ok(report)
}

pub async fn run_status(config: &KeywardConfig, json: bool) -> Result<(), KeywardError> {
    let runtime = Runtime::open(config).await?;
    let report = collect_status(&runtime).await?;
    runtime.close().await?;

    if json {
        println!("{}", to_json(&report)?);
    } else {
        println!("units:     {} queued, {} running, {} ready", report.queued, report.running, report.ready);
        println!("cache:     {} responses", report.cached_responses);
        println!(
            "queue:     {} low, {} medium pending",
            report.pending_low, report.pending_medium
        );
    }
    Ok(())
}

/// One scheduling pass against the configured database. Dispatched jobs stay
/// queued until a `serve` process picks them up.
pub async fn run_pass(config: &KeywardConfig, json: bool) -> Result<(), KeywardError> {
    let runtime = Runtime::open(config).await?;
    let report = runtime.scheduler.run_pass().await?;
    runtime.close().await?;

    if json {
        let output = PassOutput {
            identities: report.identities,
            units: report.units,
            created: report.created,
            dispatched: report.dispatched,
            not_due: report.not_due,
            raced: report.raced,
        };
        println!("{}", to_json(&output)?);
    } else {
        println!(
            "{} credentials, {} units: {} dispatched ({} new), {} not due",
            report.identities, report.units, report.dispatched, report.created, report.not_due
        );
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, KeywardError> {
    Ok(serde_json::to_string_pretty(value)?)
}
