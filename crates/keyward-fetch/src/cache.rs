// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response cache in front of the transport.
//!
//! Entries are keyed by the endpoint url plus a signature of the sorted
//! parameters. Concurrent misses for the same key may both fetch and both
//! store; the store is last-write-wins and bodies within one expiry window
//! are expected to be identical.

use std::future::Future;
use std::sync::Arc;

use keyward_core::{CacheEntry, CacheStore, Clock, KeywardError, TransportResponse};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::envelope::ApiDocument;
use crate::error::FetchFailure;

/// A parsed document together with the cache row it lives in.
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub entry: CacheEntry,
    pub document: ApiDocument,
    /// `true` when served from the cache without a network call.
    pub was_cached: bool,
}

#[derive(Clone)]
pub struct RequestCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl RequestCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Canonical signature of a parameter set: sorted by key then value,
    /// hashed so secrets never reach the cache table.
    pub fn signature(url: &str, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();

        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        for (key, value) in sorted {
            hasher.update(b"\n");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Serve a fresh cached document, or call `fetch` and cache its result.
    ///
    /// Returns `Ok(None)` when the remote answered with an empty body; there
    /// is nothing to parse and nothing is cached. A non-2xx status or an
    /// unparseable body is a failure and is not cached either.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        url: &str,
        params: &[(String, String)],
        fetch: F,
    ) -> Result<Option<CachedDocument>, FetchFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TransportResponse, KeywardError>>,
    {
        let signature = Self::signature(url, params);
        let now = self.clock.now();

        if let Some(entry) = self.store.find_fresh_response(url, &signature, now).await? {
            debug!(url, cache_id = entry.id, "cache hit");
            let document = ApiDocument::parse(&entry.body)?;
            return Ok(Some(CachedDocument {
                entry,
                document,
                was_cached: true,
            }));
        }

        let response = fetch().await.map_err(|e| FetchFailure::Transport {
            status: None,
            message: e.to_string(),
        })?;
        if !response.is_success() {
            return Err(FetchFailure::Transport {
                status: Some(response.status),
                message: summarize(&response.body),
            });
        }
        if response.body.trim().is_empty() {
            debug!(url, "empty response body");
            return Ok(None);
        }

        let document = ApiDocument::parse(&response.body)?;
        let entry = self
            .store
            .store_response(url, &signature, &response.body, document.cached_until)
            .await?;
        debug!(url, cache_id = entry.id, cached_until = %document.cached_until, "response cached");

        Ok(Some(CachedDocument {
            entry,
            document,
            was_cached: false,
        }))
    }

    /// Claim the right to report this entry's error. `false` when it has
    /// already been reported, by this or a concurrent job.
    pub async fn report_error_once(&self, entry: &CacheEntry) -> Result<bool, FetchFailure> {
        if entry.error_displayed {
            return Ok(false);
        }
        Ok(self.store.mark_error_displayed(entry.id).await?)
    }
}

/// First line of a body, bounded, for error messages.
fn summarize(body: &str) -> String {
    let line = body.lines().next().unwrap_or_default().trim();
    match line.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}
