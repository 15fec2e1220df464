// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits: credentials, schedule state,
//! cache entries, events and dispatched jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};

use crate::endpoint::Endpoint;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Transport,
    Queue,
}

/// Key type reported by the remote service for a credential.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum KeyType {
    Account,
    Character,
    Corporation,
}

impl KeyType {
    /// Account and character keys expose per-character endpoints.
    pub fn is_character_scoped(self) -> bool {
        matches!(self, KeyType::Account | KeyType::Character)
    }
}

/// Stable identity of a (key id, secret) pair.
///
/// Several credential rows owned by different users may carry the same
/// key; schedule state is tracked once per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CredentialIdentity(pub String);

impl CredentialIdentity {
    pub fn new(key_id: i64, v_code: &str) -> Self {
        let digest = hex::encode(Sha256::digest(v_code.as_bytes()));
        Self(format!("{key_id}-{}", &digest[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CredentialIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authorization tuple granting access to a subset of remote endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: i64,
    /// User that owns this credential; removal events are addressed to them.
    pub owner_id: i64,
    pub key_id: i64,
    pub v_code: String,
    /// Unknown until the first credential-info fetch completes.
    pub key_type: Option<KeyType>,
    pub access_mask: i64,
    pub valid: bool,
    pub expires: Option<DateTime<Utc>>,
    pub paid_until: Option<DateTime<Utc>>,
    pub corp_character_id: Option<i64>,
}

impl Credential {
    pub fn identity(&self) -> CredentialIdentity {
        CredentialIdentity::new(self.key_id, &self.v_code)
    }

    /// Whether the access mask authorizes the given bit.
    pub fn grants(&self, mask: i64) -> bool {
        self.access_mask & mask == mask
    }
}

/// A valid credential together with the characters currently linked to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialScope {
    pub credential: Credential,
    pub character_ids: Vec<i64>,
}

/// Lifecycle state of one schedulable unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Ready,
}

/// Per-unit schedule bookkeeping, one row per (identity, endpoint, parameter).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState {
    pub id: i64,
    pub identity: CredentialIdentity,
    pub url: String,
    /// Character id for per-character units, `0` otherwise.
    pub parameter: i64,
    pub state: TaskState,
    pub mod_time: DateTime<Utc>,
    pub next_time: DateTime<Utc>,
}

impl ScheduleState {
    /// A unit is due when no job holds it and its eligibility time has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state != TaskState::Running && now >= self.next_time
    }
}

/// A cached remote response keyed by (url, parameter signature).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub id: i64,
    pub url: String,
    pub signature: String,
    pub body: String,
    pub cached_until: DateTime<Utc>,
    pub error_displayed: bool,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.cached_until > now
    }
}

/// Append-only record emitted as a side effect of reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub owner_id: i64,
    pub issued: DateTime<Utc>,
    pub text: String,
}

/// One dispatched unit of work, serialized onto the job queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub endpoint: Endpoint,
    pub credential_id: i64,
    pub state_id: i64,
    /// Character the unit targets, for per-character endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn credential(mask: i64) -> Credential {
        Credential {
            id: 1,
            owner_id: 1,
            key_id: 1234,
            v_code: "secret".into(),
            key_type: Some(KeyType::Character),
            access_mask: mask,
            valid: true,
            expires: None,
            paid_until: None,
            corp_character_id: None,
        }
    }

    #[test]
    fn identity_is_stable_and_hides_secret() {
        let a = CredentialIdentity::new(1234, "secret");
        let b = CredentialIdentity::new(1234, "secret");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("1234-"));
        assert!(!a.as_str().contains("secret"));
        assert_ne!(a, CredentialIdentity::new(1234, "other"));
    }

    #[test]
    fn grants_checks_mask_bits() {
        let c = credential(8 | 4096);
        assert!(c.grants(8));
        assert!(c.grants(4096));
        assert!(!c.grants(262_144));
    }

    #[test]
    fn running_state_is_never_due() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut state = ScheduleState {
            id: 1,
            identity: CredentialIdentity::new(1, "x"),
            url: "/a".into(),
            parameter: 0,
            state: TaskState::Running,
            mod_time: now,
            next_time: now - Duration::hours(1),
        };
        assert!(!state.is_due(now));
        state.state = TaskState::Ready;
        assert!(state.is_due(now));
    }

    #[test]
    fn due_exactly_at_next_time() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let state = ScheduleState {
            id: 1,
            identity: CredentialIdentity::new(1, "x"),
            url: "/a".into(),
            parameter: 0,
            state: TaskState::Ready,
            mod_time: now,
            next_time: now,
        };
        assert!(state.is_due(now));
        assert!(!state.is_due(now - Duration::seconds(1)));
    }

    #[test]
    fn cache_entry_expiry_is_strict() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry {
            id: 1,
            url: "/a".into(),
            signature: "sig".into(),
            body: String::new(),
            cached_until: now,
            error_displayed: false,
        };
        assert!(!entry.is_fresh(now));
        assert!(entry.is_fresh(now - Duration::seconds(1)));
    }

    #[test]
    fn job_request_payload_omits_missing_parameter() {
        let job = JobRequest {
            endpoint: Endpoint::ApiKeyInfo,
            credential_id: 3,
            state_id: 9,
            parameter: None,
        };
        let json = serde_json::to_string(&job).unwrap();
        assert!(!json.contains("parameter"));
        let back: JobRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn task_state_names_are_lowercase() {
        assert_eq!(TaskState::Running.to_string(), "running");
        assert_eq!("ready".parse::<TaskState>().unwrap(), TaskState::Ready);
    }
}
