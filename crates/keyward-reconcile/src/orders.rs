// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Market orders: diff by order id, removal emits a completion event.

use chrono::{DateTime, Duration, Utc};
use keyward_core::entities::{MarketOrder, OrderScope};
use keyward_core::{EntityStore, Event, KeywardError};
use tracing::debug;

use crate::engine::{Reconcile, Reconciled, Removal, reconcile};
use crate::error::ReferenceError;
use crate::lookup::LookupCache;
use crate::remote::{ORDER_STATE_OPEN, RemoteOrder};

/// Reconciles the orders of one scope. Removal events go to `owner_id`.
#[derive(Debug, Clone)]
pub struct OrderReconciler {
    pub scope: OrderScope,
    pub owner_id: i64,
    pub now: DateTime<Utc>,
}

fn expiry(issued: DateTime<Utc>, duration_days: i64) -> DateTime<Utc> {
    issued + Duration::days(duration_days)
}

impl Reconcile for OrderReconciler {
    type Remote = RemoteOrder;
    type Local = MarketOrder;
    type Key = i64;

    const REMOVAL: Removal = Removal::Delete;

    fn remote_key(&self, remote: &RemoteOrder) -> i64 {
        remote.order_id
    }

    fn local_key(&self, local: &MarketOrder) -> i64 {
        local.order_id
    }

    fn is_active(&self, remote: &RemoteOrder) -> bool {
        remote.order_state == ORDER_STATE_OPEN
    }

    fn update(&self, local: &mut MarketOrder, remote: &RemoteOrder) -> bool {
        let changed = remote.issued > local.issued
            || remote.volume_remaining != local.volume_remaining
            || remote.escrow != local.escrow
            || remote.price != local.price;
        if changed {
            local.issued = remote.issued;
            local.expires = expiry(remote.issued, remote.duration);
            local.volume_remaining = remote.volume_remaining;
            local.escrow = remote.escrow;
            local.price = remote.price;
            local.total_price = remote.volume_remaining as f64 * remote.price;
        }
        changed
    }

    fn create(&self, remote: &RemoteOrder, lookups: &LookupCache) -> Result<MarketOrder, ReferenceError> {
        let character = lookups.character(remote.character_id)?;
        let item = lookups.item(remote.item_id)?;
        let station = lookups.station(remote.station_id)?;

        let (corporation_id, corp_wallet_id) = match self.scope {
            OrderScope::Character(_) => (None, None),
            OrderScope::Corporation(corporation_id) => (
                Some(corporation_id),
                lookups.wallet(corporation_id, remote.account_key).map(|w| w.id),
            ),
        };

        Ok(MarketOrder {
            order_id: remote.order_id,
            character_id: character.id,
            corporation_id,
            corp_wallet_id,
            station_id: station.id,
            item_id: item.id,
            buy_order: remote.bid,
            escrow: remote.escrow,
            price: remote.price,
            total_price: remote.volume_remaining as f64 * remote.price,
            volume_entered: remote.volume_entered,
            volume_remaining: remote.volume_remaining,
            minimum_volume: remote.minimum_volume,
            issued: remote.issued,
            expires: expiry(remote.issued, remote.duration),
        })
    }

    fn removal_event(&self, local: &MarketOrder, lookups: &LookupCache) -> Option<Event> {
        let station = lookups
            .station(local.station_id)
            .map(|s| s.short_name.clone())
            .unwrap_or_else(|_| format!("Station #{}", local.station_id));
        let item = lookups
            .item(local.item_id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|_| format!("Item #{}", local.item_id));
        let character = lookups
            .character(local.character_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| format!("Character #{}", local.character_id));
        let order_type = if local.corporation_id.is_some() {
            "corporate"
        } else {
            "personal"
        };
        let side = if local.buy_order { "buy" } else { "sell" };

        Some(Event {
            owner_id: self.owner_id,
            issued: self.now,
            text: format!(
                "{station}: {order_type} {side} order for {item} completed/expired ({character})"
            ),
        })
    }
}

/// Load the scope's orders, reconcile against `remote` and persist the
/// delta together with its events in one transaction.
pub async fn sync_orders(
    store: &dyn EntityStore,
    lookups: &mut LookupCache,
    reconciler: &OrderReconciler,
    remote: &[RemoteOrder],
) -> Result<Reconciled<MarketOrder>, KeywardError> {
    let local = store.market_orders(reconciler.scope).await?;

    let items: Vec<i64> = remote
        .iter()
        .map(|o| o.item_id)
        .chain(local.iter().map(|o| o.item_id))
        .collect();
    let stations: Vec<i64> = remote
        .iter()
        .map(|o| o.station_id)
        .chain(local.iter().map(|o| o.station_id))
        .collect();
    let characters: Vec<i64> = remote
        .iter()
        .map(|o| o.character_id)
        .chain(local.iter().map(|o| o.character_id))
        .collect();
    lookups.load_items(store, &items).await?;
    lookups.load_stations(store, &stations).await?;
    lookups.load_characters(store, &characters).await?;
    if let OrderScope::Corporation(corporation_id) = reconciler.scope {
        lookups.load_wallets(store, corporation_id).await?;
    }

    let result = reconcile(reconciler, remote, local, lookups);
    if !result.changes.is_empty() {
        store
            .apply_order_changes(&result.changes, &result.events)
            .await?;
    }
    debug!(
        scope = ?reconciler.scope,
        created = result.changes.created.len(),
        updated = result.changes.updated.len(),
        removed = result.changes.removed.len(),
        skipped = result.skipped.len(),
        "market orders reconciled"
    );
    Ok(result)
}
