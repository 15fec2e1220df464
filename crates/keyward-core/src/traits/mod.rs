// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Everything the scheduling, fetch and reconciliation core needs from the
//! outside world (persistence, HTTP, the job queue) is reached through these
//! traits and `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod dispatch;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use dispatch::{JobDispatcher, JobQueue, QueuedJob};
pub use storage::{CacheStore, CredentialStore, EntityStore, ScheduleStore, StorageAdapter};
pub use transport::{HttpTransport, TransportResponse};
