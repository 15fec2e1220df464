// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of freshly fetched entity sets against stored ones.
//!
//! [`engine::reconcile`] diffs two collections by stable key and produces a
//! [`Changeset`](keyward_core::entities::Changeset) plus removal events.
//! Each entity kind describes its key, significant fields, creation and
//! removal policy through [`Reconcile`]. Foreign references are resolved
//! through a pass-scoped [`LookupCache`].

pub mod engine;
pub mod error;
pub mod lookup;
pub mod orders;
pub mod remote;
pub mod skill_queue;
pub mod skills;
pub mod standings;

pub use engine::{Reconcile, Reconciled, Removal, reconcile};
pub use error::ReferenceError;
pub use lookup::LookupCache;
