// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetch pipeline for keyward.
//!
//! [`Fetcher`] performs one logical remote call: it adds credentials, goes
//! through the [`RequestCache`], parses the response envelope and classifies
//! application errors, invalidating the credential on authentication codes.
//! [`ApiClient`] is the reqwest transport behind it.

pub mod cache;
pub mod client;
pub mod envelope;
pub mod error;
pub mod fetcher;

pub use cache::{CachedDocument, RequestCache};
pub use client::ApiClient;
pub use envelope::{ApiDocument, ApiErrorNode};
pub use error::{FailureKind, FetchFailure};
pub use fetcher::{FetchOutcome, Fetcher, is_credential_error};
