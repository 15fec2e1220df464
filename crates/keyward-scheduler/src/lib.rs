// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling and execution for keyward.
//!
//! [`Scheduler::run_pass`] plans the units every valid credential needs,
//! claims the due ones and dispatches one job each. Workers in the
//! [`WorkerPool`] take jobs off the queue, run them through the endpoint's
//! handler and always report back with [`Scheduler::complete`] or
//! [`Scheduler::fail`].

pub mod error;
pub mod handlers;
pub mod planner;
pub mod runner;
pub mod scheduler;
pub mod shutdown;
pub mod worker;

pub use error::JobError;
pub use planner::{Unit, plan_units};
pub use runner::JobContext;
pub use scheduler::{PassReport, Scheduler};
pub use worker::WorkerPool;
