// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_reconcile::remote::optional_api_date;
use serde::Deserialize;

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountStatusResult {
    #[serde(default, deserialize_with = "optional_api_date")]
    paid_until: Option<DateTime<Utc>>,
}

/// Records the subscription end date on the credential.
pub struct AccountStatusHandler;

#[async_trait]
impl EndpointHandler for AccountStatusHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let status: AccountStatusResult = input.document.result_as()?;
        ctx.credentials
            .set_paid_until(input.credential.id, status.paid_until)
            .await?;
        Ok(())
    }
}
