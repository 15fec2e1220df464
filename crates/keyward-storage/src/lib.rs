// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for keyward.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer model via
//! `tokio-rusqlite`. Typed query modules cover credentials, schedule state,
//! the response cache, entity collections, events and the job queue.

pub mod adapter;
pub mod database;
pub mod job_queue;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use job_queue::SqliteJobQueue;
