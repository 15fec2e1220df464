// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! `./keyward.toml` > `~/.config/keyward/keyward.toml` > `/etc/keyward/keyward.toml`,
//! with `KEYWARD_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KeywardConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/keyward/keyward.toml";
pub(crate) const LOCAL_CONFIG: &str = "keyward.toml";

/// Config sections addressable from the environment.
const ENV_SECTIONS: [&str; 5] = ["daemon", "api", "storage", "scheduler", "workers"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("keyward/keyward.toml"))
}

/// Load configuration from the standard hierarchy.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keyward/keyward.toml`
/// 3. `~/.config/keyward/keyward.toml`
/// 4. `./keyward.toml`
/// 5. `KEYWARD_*` environment variables
pub fn load_config() -> Result<KeywardConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults plus a TOML string; no files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, one explicit file, then environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map `KEYWARD_SECTION_KEY` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `KEYWARD_SCHEDULER_GRACE_PERIOD_SECS` is `scheduler.grace_period_secs`.
fn env_provider() -> Env {
    Env::prefixed("KEYWARD_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
