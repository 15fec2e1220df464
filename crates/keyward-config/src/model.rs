// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is a
//! startup error rather than a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level keyward configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywardConfig {
    /// Process-level settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Remote API host and HTTP client settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheduling cadence.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Worker pool sizing.
    #[serde(default)]
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.eveonline.com".to_string()
}

fn default_user_agent() -> String {
    "keyward-tasks".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("keyward").join("keyward.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keyward.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Scheduling cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between scheduling passes in `serve` mode.
    #[serde(default = "default_pass_interval_secs")]
    pub pass_interval_secs: u64,

    /// Buffer added to the remote freshness window before a unit is due again.
    /// Also the retry delay after a failed job.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Seconds between purges of expired cached responses.
    #[serde(default = "default_cache_purge_interval_secs")]
    pub cache_purge_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pass_interval_secs: default_pass_interval_secs(),
            grace_period_secs: default_grace_period_secs(),
            cache_purge_interval_secs: default_cache_purge_interval_secs(),
        }
    }
}

fn default_pass_interval_secs() -> u64 {
    60
}

/// Upper bound on `scheduler.grace_period_secs`: one day.
pub const MAX_GRACE_PERIOD_SECS: u64 = 86_400;

fn default_grace_period_secs() -> u64 {
    30
}

fn default_cache_purge_interval_secs() -> u64 {
    3600
}

/// Worker pool sizing per queue class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    /// Workers consuming the low-volume queue (credential info).
    #[serde(default = "default_low_workers")]
    pub low: usize,

    /// Workers consuming the medium-volume queue.
    #[serde(default = "default_medium_workers")]
    pub medium: usize,

    /// How long an idle worker sleeps before polling the queue again.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            low: default_low_workers(),
            medium: default_medium_workers(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_low_workers() -> usize {
    2
}

fn default_medium_workers() -> usize {
    4
}

fn default_poll_interval_ms() -> u64 {
    500
}
