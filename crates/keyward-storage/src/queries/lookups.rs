// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference tables: items, skills, stations and corporation wallets.
//!
//! These are loaded out of band (static data export); keyward only reads
//! them while resolving references. The insert helpers exist for loading
//! and for fixtures.

use keyward_core::KeywardError;
use keyward_core::entities::{CorpWallet, Item, Skill, Station};
use rusqlite::{params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::queries::placeholders;

async fn select_by_ids<T, F>(
    db: &Database,
    sql_prefix: &'static str,
    ids: &[i64],
    map_row: F,
) -> Result<Vec<T>, KeywardError>
where
    T: Send + 'static,
    F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<T>, rusqlite::Error> {
            let sql = format!("{sql_prefix} WHERE id IN ({}) ORDER BY id", placeholders(ids.len()));
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(ids.iter()), map_row)?.collect();
            rows
        })
        .await
        .map_err(map_tr_err)
}

pub async fn items_by_ids(db: &Database, ids: &[i64]) -> Result<Vec<Item>, KeywardError> {
    select_by_ids(db, "SELECT id, name FROM items", ids, |row| {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })
    .await
}

pub async fn skills_by_ids(db: &Database, ids: &[i64]) -> Result<Vec<Skill>, KeywardError> {
    select_by_ids(db, "SELECT id, name FROM skills", ids, |row| {
        Ok(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })
    .await
}

pub async fn stations_by_ids(db: &Database, ids: &[i64]) -> Result<Vec<Station>, KeywardError> {
    select_by_ids(db, "SELECT id, name, short_name FROM stations", ids, |row| {
        Ok(Station {
            id: row.get(0)?,
            name: row.get(1)?,
            short_name: row.get(2)?,
        })
    })
    .await
}

pub async fn corp_wallets(db: &Database, corporation_id: i64) -> Result<Vec<CorpWallet>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<CorpWallet>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, corporation_id, account_key, description
                 FROM corp_wallets WHERE corporation_id = ?1 ORDER BY account_key",
            )?;
            let wallets = stmt
                .query_map(params![corporation_id], |row| {
                    Ok(CorpWallet {
                        id: row.get(0)?,
                        corporation_id: row.get(1)?,
                        account_key: row.get(2)?,
                        description: row.get(3)?,
                    })
                })?
                .collect();
            wallets
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_item(db: &Database, item: &Item) -> Result<(), KeywardError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO items (id, name) VALUES (?1, ?2)",
                params![item.id, item.name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_skill(db: &Database, skill: &Skill) -> Result<(), KeywardError> {
    let skill = skill.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO skills (id, name) VALUES (?1, ?2)",
                params![skill.id, skill.name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_station(db: &Database, station: &Station) -> Result<(), KeywardError> {
    let station = station.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO stations (id, name, short_name) VALUES (?1, ?2, ?3)",
                params![station.id, station.name, station.short_name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_corp_wallet(db: &Database, wallet: &CorpWallet) -> Result<(), KeywardError> {
    let wallet = wallet.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO corp_wallets (id, corporation_id, account_key, description)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    wallet.id,
                    wallet.corporation_id,
                    wallet.account_key,
                    wallet.description
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::characters::get_or_create_corporation;
    use crate::queries::test_support::setup_db;

    #[tokio::test]
    async fn lookups_return_only_known_ids() {
        let (db, _dir) = setup_db().await;
        for (id, name) in [(34, "Tritanium"), (35, "Pyerite")] {
            insert_item(&db, &Item { id, name: name.into() }).await.unwrap();
        }
        insert_station(
            &db,
            &Station {
                id: 60003760,
                name: "Jita IV - Moon 4 - Caldari Navy Assembly Plant".into(),
                short_name: "Jita 4-4".into(),
            },
        )
        .await
        .unwrap();

        let items = items_by_ids(&db, &[35, 34, 36]).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Tritanium");

        let stations = stations_by_ids(&db, &[60003760]).await.unwrap();
        assert_eq!(stations[0].short_name, "Jita 4-4");
        assert!(skills_by_ids(&db, &[3300]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wallets_are_scoped_to_corporation() {
        let (db, _dir) = setup_db().await;
        get_or_create_corporation(&db, 7, "Seven").await.unwrap();
        get_or_create_corporation(&db, 8, "Eight").await.unwrap();
        for (id, corp, key) in [(1, 7, 1000), (2, 7, 1001), (3, 8, 1000)] {
            let wallet = CorpWallet {
                id,
                corporation_id: corp,
                account_key: key,
                description: String::new(),
            };
            insert_corp_wallet(&db, &wallet).await.unwrap();
        }
        let wallets = corp_wallets(&db, 7).await.unwrap();
        let keys: Vec<i64> = wallets.iter().map(|w| w.account_key).collect();
        assert_eq!(keys, vec![1000, 1001]);
    }
}
