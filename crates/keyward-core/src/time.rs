// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock abstraction and remote API timestamp parsing.
//!
//! All scheduling arithmetic is done in UTC. The remote API writes
//! timestamps as `YYYY-MM-DD HH:MM:SS` without a zone suffix; they are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::KeywardError;

/// Textual timestamp format used by the remote API.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current time.
///
/// The scheduler and fetch pipeline read time through this trait so tests
/// can pin or advance it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Parse a remote API timestamp (`2026-03-01 12:00:00`) as UTC.
pub fn parse_api_date(s: &str) -> Result<DateTime<Utc>, KeywardError> {
    NaiveDateTime::parse_from_str(s.trim(), API_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| KeywardError::Serialization {
            source: format!("invalid API timestamp `{s}`: {e}").into(),
        })
}

/// Parse an optional remote timestamp where an empty string means "none".
pub fn parse_optional_api_date(s: &str) -> Result<Option<DateTime<Utc>>, KeywardError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_api_date(s).map(Some)
    }
}

/// Format a timestamp the way the remote API writes it.
pub fn format_api_date(dt: &DateTime<Utc>) -> String {
    dt.format(API_DATE_FORMAT).to_string()
}
