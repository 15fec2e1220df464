// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for remote response documents.

use chrono::{DateTime, TimeZone, Utc};
use keyward_core::time::format_api_date;
use serde_json::{Value, json};

/// 2026-03-01 at the given UTC time of day.
pub fn t(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, h, m, s)
        .single()
        .unwrap_or_else(|| panic!("invalid test time {h}:{m}:{s}"))
}

/// A document carrying `result`.
pub fn success(current: DateTime<Utc>, until: DateTime<Utc>, result: Value) -> String {
    json!({
        "currentTime": format_api_date(&current),
        "cachedUntil": format_api_date(&until),
        "result": result,
    })
    .to_string()
}

/// A document carrying an error node and no result.
pub fn error(current: DateTime<Utc>, until: DateTime<Utc>, code: u32, message: &str) -> String {
    json!({
        "currentTime": format_api_date(&current),
        "cachedUntil": format_api_date(&until),
        "error": { "code": code, "message": message },
    })
    .to_string()
}

/// Format a timestamp for use inside a `result` payload.
pub fn date(dt: DateTime<Utc>) -> String {
    format_api_date(&dt)
}
