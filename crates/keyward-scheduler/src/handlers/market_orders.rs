// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Personal and corporate market orders.

use async_trait::async_trait;
use keyward_core::entities::OrderScope;
use keyward_core::{Endpoint, KeywardError};
use keyward_reconcile::LookupCache;
use keyward_reconcile::orders::{OrderReconciler, sync_orders};
use keyward_reconcile::remote::OrdersResult;
use tracing::info;

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

pub struct MarketOrdersHandler;

impl MarketOrdersHandler {
    /// Corporation orders are scoped by the corp character's corporation.
    async fn scope(ctx: &JobContext, input: &HandlerInput<'_>) -> Result<OrderScope, JobError> {
        let character_id = input.character_id()?;
        if input.endpoint != Endpoint::CorporationMarketOrders {
            return Ok(OrderScope::Character(character_id));
        }
        let corporation_id = ctx
            .store
            .get_character(character_id)
            .await?
            .and_then(|c| c.corporation_id)
            .ok_or(KeywardError::NotFound {
                entity: "corporation of character",
                id: character_id,
            })?;
        Ok(OrderScope::Corporation(corporation_id))
    }
}

#[async_trait]
impl EndpointHandler for MarketOrdersHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let remote: OrdersResult = input.document.result_as()?;
        let reconciler = OrderReconciler {
            scope: Self::scope(ctx, &input).await?,
            owner_id: input.credential.owner_id,
            now: input.now,
        };

        let mut lookups = LookupCache::new();
        let result = sync_orders(ctx.store.as_ref(), &mut lookups, &reconciler, &remote.orders).await?;
        if !result.events.is_empty() {
            info!(
                owner_id = reconciler.owner_id,
                events = result.events.len(),
                "market orders closed"
            );
        }
        Ok(())
    }
}
