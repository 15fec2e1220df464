// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-endpoint handlers that persist a fetched document.

pub mod account_status;
pub mod character_sheet;
pub mod key_info;
pub mod market_orders;
pub mod skill_queue;
pub mod standings;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{Credential, Endpoint};
use keyward_fetch::ApiDocument;

use crate::error::JobError;
use crate::runner::JobContext;

/// Everything a handler sees about the job it is applying.
pub struct HandlerInput<'a> {
    pub endpoint: Endpoint,
    pub credential: &'a Credential,
    /// Character id for per-character and corporation endpoints.
    pub parameter: Option<i64>,
    pub document: &'a ApiDocument,
    pub now: DateTime<Utc>,
}

impl HandlerInput<'_> {
    /// The character parameter, required by every per-character endpoint.
    pub fn character_id(&self) -> Result<i64, JobError> {
        self.parameter.ok_or(JobError::MissingParameter {
            endpoint: self.endpoint,
        })
    }
}

#[async_trait]
pub trait EndpointHandler: Send + Sync {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError>;
}

pub fn handler_for(endpoint: Endpoint) -> &'static dyn EndpointHandler {
    match endpoint {
        Endpoint::ApiKeyInfo => &key_info::KeyInfoHandler,
        Endpoint::AccountStatus => &account_status::AccountStatusHandler,
        Endpoint::CharacterSheet => &character_sheet::CharacterSheetHandler,
        Endpoint::CharacterMarketOrders | Endpoint::CorporationMarketOrders => {
            &market_orders::MarketOrdersHandler
        }
        Endpoint::SkillQueue => &skill_queue::SkillQueueHandler,
        Endpoint::Standings => &standings::StandingsHandler,
    }
}
