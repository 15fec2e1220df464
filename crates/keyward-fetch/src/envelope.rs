// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The response envelope every endpoint shares.
//!
//! ```json
//! {
//!   "currentTime": "2026-03-01 12:00:00",
//!   "cachedUntil": "2026-03-01 12:30:00",
//!   "error": { "code": 203, "message": "Authentication failure." },
//!   "result": { ... }
//! }
//! ```

use chrono::{DateTime, Utc};
use keyward_core::time::parse_api_date;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::FetchFailure;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorNode {
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    current_time: String,
    cached_until: String,
    #[serde(default)]
    error: Option<ApiErrorNode>,
    #[serde(default)]
    result: serde_json::Value,
}

/// A parsed response document.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDocument {
    pub current_time: DateTime<Utc>,
    pub cached_until: DateTime<Utc>,
    pub error: Option<ApiErrorNode>,
    pub result: serde_json::Value,
}

impl ApiDocument {
    pub fn parse(body: &str) -> Result<Self, FetchFailure> {
        let raw: RawEnvelope = serde_json::from_str(body).map_err(|e| FetchFailure::Malformed {
            reason: format!("invalid envelope: {e}"),
        })?;
        let current_time = parse_api_date(&raw.current_time).map_err(malformed)?;
        let cached_until = parse_api_date(&raw.cached_until).map_err(malformed)?;
        Ok(Self {
            current_time,
            cached_until,
            error: raw.error,
            result: raw.result,
        })
    }

    /// Server-declared freshness window, never negative.
    pub fn cache_window(&self) -> chrono::Duration {
        (self.cached_until - self.current_time).max(chrono::Duration::zero())
    }

    /// Deserialize the endpoint-specific payload.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T, FetchFailure> {
        T::deserialize(&self.result).map_err(|e| FetchFailure::Malformed {
            reason: format!("unexpected result payload: {e}"),
        })
    }
}

fn malformed(e: keyward_core::KeywardError) -> FetchFailure {
    FetchFailure::Malformed {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_success_document() {
        let body = r#"{"currentTime":"2026-03-01 12:00:00","cachedUntil":"2026-03-01 12:30:00",
                       "result":{"paidUntil":"2026-04-01 00:00:00"}}"#;
        let doc = ApiDocument::parse(body).unwrap();
        assert_eq!(doc.current_time, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(doc.cache_window(), chrono::Duration::minutes(30));
        assert!(doc.error.is_none());
        assert_eq!(doc.result["paidUntil"], "2026-04-01 00:00:00");
    }

    #[test]
    fn parses_error_node() {
        let body = r#"{"currentTime":"2026-03-01 12:00:00","cachedUntil":"2026-03-02 12:00:00",
                       "error":{"code":203,"message":"Authentication failure."}}"#;
        let doc = ApiDocument::parse(body).unwrap();
        let error = doc.error.unwrap();
        assert_eq!(error.code, 203);
        assert_eq!(error.message, "Authentication failure.");
        assert!(doc.result.is_null());
    }

    #[test]
    fn window_is_clamped_when_server_clock_is_odd() {
        let body = r#"{"currentTime":"2026-03-01 12:00:00","cachedUntil":"2026-03-01 11:59:00"}"#;
        let doc = ApiDocument::parse(body).unwrap();
        assert_eq!(doc.cache_window(), chrono::Duration::zero());
    }

    #[test]
    fn rejects_missing_timestamps() {
        let err = ApiDocument::parse(r#"{"result":{}}"#).unwrap_err();
        assert!(matches!(err, FetchFailure::Malformed { .. }));
        let err = ApiDocument::parse(r#"{"currentTime":"soon","cachedUntil":"later"}"#).unwrap_err();
        assert!(matches!(err, FetchFailure::Malformed { .. }));
    }

    #[test]
    fn typed_result_extraction() {
        #[derive(Deserialize)]
        struct Paid {
            #[serde(rename = "paidUntil")]
            paid_until: String,
        }
        let body = r#"{"currentTime":"2026-03-01 12:00:00","cachedUntil":"2026-03-01 12:30:00",
                       "result":{"paidUntil":"2026-04-01 00:00:00"}}"#;
        let paid: Paid = ApiDocument::parse(body).unwrap().result_as().unwrap();
        assert_eq!(paid.paid_until, "2026-04-01 00:00:00");
    }
}
