// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{KeywardConfig, MAX_GRACE_PERIOD_SECS};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &KeywardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.daemon.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "daemon.log_level `{}` is not one of {}",
                config.daemon.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.timeout_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.scheduler.pass_interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "scheduler.pass_interval_secs must be at least 1".to_string(),
        });
    }

    if config.scheduler.grace_period_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "scheduler.grace_period_secs must be at least 1".to_string(),
        });
    } else if config.scheduler.grace_period_secs > MAX_GRACE_PERIOD_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.grace_period_secs must be at most {MAX_GRACE_PERIOD_SECS}"
            ),
        });
    }

    if config.scheduler.cache_purge_interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "scheduler.cache_purge_interval_secs must be at least 1".to_string(),
        });
    }

    if config.workers.low == 0 {
        errors.push(ConfigError::Validation {
            message: "workers.low must be at least 1".to_string(),
        });
    }

    if config.workers.medium == 0 {
        errors.push(ConfigError::Validation {
            message: "workers.medium must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&KeywardConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = KeywardConfig::default();
        config.api.base_url = "ftp://example.com".into();
        config.scheduler.grace_period_secs = 0;
        config.workers.low = 0;
        config.workers.medium = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn grace_period_is_bounded() {
        let mut config = KeywardConfig::default();
        config.scheduler.grace_period_secs = MAX_GRACE_PERIOD_SECS;
        assert!(validate_config(&config).is_ok());

        config.scheduler.grace_period_secs = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("at most 86400"));
    }

    #[test]
    fn empty_base_url_is_reported_once() {
        let mut config = KeywardConfig::default();
        config.api.base_url = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("api.base_url must not be empty"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = KeywardConfig::default();
        config.daemon.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
        config.daemon.log_level = "loud".into();
        assert!(validate_config(&config).is_err());
    }
}
