// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution of a single dispatched job.

use std::sync::Arc;

use keyward_core::{Clock, CredentialStore, EntityStore, JobRequest};
use keyward_fetch::{ApiDocument, Fetcher};
use tracing::debug;

use crate::error::JobError;
use crate::handlers::{HandlerInput, handler_for};

/// Shared dependencies of every job.
#[derive(Clone)]
pub struct JobContext {
    pub fetcher: Arc<Fetcher>,
    pub store: Arc<dyn EntityStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub clock: Arc<dyn Clock>,
}

impl JobContext {
    pub fn new(
        fetcher: Arc<Fetcher>,
        store: Arc<dyn EntityStore>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            store,
            credentials,
            clock,
        }
    }
}

/// Fetch the job's document and apply it through the endpoint handler.
///
/// Returns the document so the caller can derive the unit's next eligible
/// time from its cache window. `Ok(None)` means there was nothing to apply.
pub async fn execute(ctx: &JobContext, job: &JobRequest) -> Result<Option<ApiDocument>, JobError> {
    let credential = ctx
        .credentials
        .get_credential(job.credential_id)
        .await?
        .ok_or(JobError::MissingCredential(job.credential_id))?;
    if !credential.valid {
        debug!(credential_id = credential.id, endpoint = %job.endpoint, "credential invalidated since dispatch");
        return Ok(None);
    }

    let mut params = Vec::new();
    if let Some(character_id) = job.parameter {
        params.push(("characterID".to_string(), character_id.to_string()));
    }

    let outcome = ctx.fetcher.fetch(&credential, job.endpoint, &params, true).await?;
    let Some(document) = outcome.document else {
        return Ok(None);
    };

    handler_for(job.endpoint)
        .apply(
            ctx,
            HandlerInput {
                endpoint: job.endpoint,
                credential: &credential,
                parameter: job.parameter,
                document: &document,
                now: ctx.clock.now(),
            },
        )
        .await?;
    debug!(
        credential_id = credential.id,
        endpoint = %job.endpoint,
        cached = outcome.was_cached,
        "job applied"
    );
    Ok(Some(document))
}
