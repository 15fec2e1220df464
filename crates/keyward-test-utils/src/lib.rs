// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for keyward.
//!
//! Mock adapters and fixtures for fast, deterministic tests without a
//! network or a long-lived database.
//!
//! # Components
//!
//! - [`MockTransport`] - HTTP transport with queued responses and request capture
//! - [`ManualClock`] - clock that only moves when told to
//! - [`RecordingDispatcher`] - job dispatcher that records instead of queueing
//! - [`TestHarness`] - temp SQLite storage with seeding helpers
//! - [`envelope`] - response document builders

pub mod clock;
pub mod envelope;
pub mod harness;
pub mod mock_dispatcher;
pub mod mock_transport;

pub use clock::ManualClock;
pub use harness::TestHarness;
pub use mock_dispatcher::RecordingDispatcher;
pub use mock_transport::{MockTransport, RecordedRequest};
