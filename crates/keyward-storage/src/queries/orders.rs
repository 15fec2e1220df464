// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Market orders, personal and corporate.

use keyward_core::entities::{Changeset, MarketOrder, OrderScope};
use keyward_core::{Event, KeywardError};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};
use crate::queries::events::insert_events;
use crate::queries::{get_time, to_db_time};

const ORDER_COLUMNS: &str = "order_id, character_id, corporation_id, corp_wallet_id, station_id, \
                             item_id, buy_order, escrow, price, total_price, volume_entered, \
                             volume_remaining, minimum_volume, issued, expires";

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<MarketOrder> {
    Ok(MarketOrder {
        order_id: row.get(0)?,
        character_id: row.get(1)?,
        corporation_id: row.get(2)?,
        corp_wallet_id: row.get(3)?,
        station_id: row.get(4)?,
        item_id: row.get(5)?,
        buy_order: row.get(6)?,
        escrow: row.get(7)?,
        price: row.get(8)?,
        total_price: row.get(9)?,
        volume_entered: row.get(10)?,
        volume_remaining: row.get(11)?,
        minimum_volume: row.get(12)?,
        issued: get_time(row, 13)?,
        expires: get_time(row, 14)?,
    })
}

/// Orders owned by a scope. Personal scope excludes the character's
/// corporate orders.
pub async fn market_orders(db: &Database, scope: OrderScope) -> Result<Vec<MarketOrder>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<MarketOrder>, rusqlite::Error> {
            let (filter, id) = match scope {
                OrderScope::Character(id) => ("character_id = ?1 AND corporation_id IS NULL", id),
                OrderScope::Corporation(id) => ("corporation_id = ?1", id),
            };
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM market_orders WHERE {filter} ORDER BY order_id"
            ))?;
            let orders = stmt.query_map(params![id], row_to_order)?.collect();
            orders
        })
        .await
        .map_err(map_tr_err)
}

/// Apply one reconciliation result and its events in a single transaction.
pub async fn apply_order_changes(
    db: &Database,
    changes: &Changeset<MarketOrder>,
    events: &[Event],
) -> Result<(), KeywardError> {
    let changes = changes.clone();
    let events = events.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut upsert = tx.prepare(&format!(
                    "INSERT INTO market_orders ({ORDER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                     ON CONFLICT(order_id) DO UPDATE SET
                         escrow = excluded.escrow,
                         price = excluded.price,
                         total_price = excluded.total_price,
                         volume_remaining = excluded.volume_remaining,
                         issued = excluded.issued,
                         expires = excluded.expires"
                ))?;
                for o in changes.created.iter().chain(changes.updated.iter()) {
                    upsert.execute(params![
                        o.order_id,
                        o.character_id,
                        o.corporation_id,
                        o.corp_wallet_id,
                        o.station_id,
                        o.item_id,
                        o.buy_order,
                        o.escrow,
                        o.price,
                        o.total_price,
                        o.volume_entered,
                        o.volume_remaining,
                        o.minimum_volume,
                        to_db_time(&o.issued),
                        to_db_time(&o.expires),
                    ])?;
                }

                let mut delete = tx.prepare("DELETE FROM market_orders WHERE order_id = ?1")?;
                for o in &changes.removed {
                    delete.execute(params![o.order_id])?;
                }
            }
            insert_events(&tx, &events)?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::characters::{get_or_create_corporation, upsert_character};
    use crate::queries::events::events_for_owner;
    use crate::queries::test_support::{at, setup_db};
    use chrono::Duration;
    use keyward_core::entities::Character;

    fn order(order_id: i64, corporation_id: Option<i64>) -> MarketOrder {
        MarketOrder {
            order_id,
            character_id: 90,
            corporation_id,
            corp_wallet_id: None,
            station_id: 60003760,
            item_id: 34,
            buy_order: false,
            escrow: 0.0,
            price: 5.0,
            total_price: 500.0,
            volume_entered: 100,
            volume_remaining: 100,
            minimum_volume: 1,
            issued: at(10, 0, 0),
            expires: at(10, 0, 0) + Duration::days(90),
        }
    }

    async fn seed(db: &Database) {
        get_or_create_corporation(db, 7, "Seven").await.unwrap();
        upsert_character(
            db,
            &Character {
                id: 90,
                name: "Trader".into(),
                corporation_id: Some(7),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn scopes_separate_personal_and_corporate() {
        let (db, _dir) = setup_db().await;
        seed(&db).await;
        let changes = Changeset {
            created: vec![order(1, None), order(2, Some(7))],
            ..Changeset::default()
        };
        apply_order_changes(&db, &changes, &[]).await.unwrap();

        let personal = market_orders(&db, OrderScope::Character(90)).await.unwrap();
        let corporate = market_orders(&db, OrderScope::Corporation(7)).await.unwrap();
        assert_eq!(personal.len(), 1);
        assert_eq!(personal[0].order_id, 1);
        assert_eq!(corporate.len(), 1);
        assert_eq!(corporate[0].order_id, 2);
    }

    #[tokio::test]
    async fn updates_deletes_and_events_commit_together() {
        let (db, _dir) = setup_db().await;
        seed(&db).await;
        let created = Changeset {
            created: vec![order(1, None), order(2, None)],
            ..Changeset::default()
        };
        apply_order_changes(&db, &created, &[]).await.unwrap();

        let mut changed = order(1, None);
        changed.price = 6.5;
        changed.volume_remaining = 40;
        changed.total_price = 260.0;
        let changes = Changeset {
            created: Vec::new(),
            updated: vec![changed.clone()],
            removed: vec![order(2, None)],
        };
        let events = vec![Event {
            owner_id: 3,
            issued: at(12, 0, 0),
            text: "order closed".into(),
        }];
        apply_order_changes(&db, &changes, &events).await.unwrap();

        let stored = market_orders(&db, OrderScope::Character(90)).await.unwrap();
        assert_eq!(stored, vec![changed]);
        assert_eq!(events_for_owner(&db, 3).await.unwrap().len(), 1);
    }
}
