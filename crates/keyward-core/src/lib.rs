// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for keyward.
//!
//! Holds the error type, the domain model shared by every crate (credentials,
//! schedule state, cache entries, persisted entities, events), the endpoint
//! catalogue, the clock, and the adapter traits that storage, transport and
//! dispatch backends implement.

pub mod endpoint;
pub mod entities;
pub mod error;
pub mod time;
pub mod traits;
pub mod types;

pub use endpoint::{Endpoint, QueueClass};
pub use error::KeywardError;
pub use time::{Clock, SystemClock};
pub use types::{
    AdapterType, CacheEntry, Credential, CredentialIdentity, CredentialScope, Event,
    HealthStatus, JobRequest, KeyType, ScheduleState, TaskState,
};

pub use traits::{
    CacheStore, CredentialStore, EntityStore, HttpTransport, JobDispatcher, JobQueue,
    PluginAdapter, QueuedJob, ScheduleStore, StorageAdapter, TransportResponse,
};
