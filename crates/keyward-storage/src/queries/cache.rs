// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached remote responses keyed by (url, parameter signature).

use chrono::{DateTime, Utc};
use keyward_core::{CacheEntry, KeywardError};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{get_time, to_db_time};

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        id: row.get(0)?,
        url: row.get(1)?,
        signature: row.get(2)?,
        body: row.get(3)?,
        cached_until: get_time(row, 4)?,
        error_displayed: row.get(5)?,
    })
}

/// The entry for this signature, if it expires strictly after `now`.
pub async fn find_fresh_response(
    db: &Database,
    url: &str,
    signature: &str,
    now: DateTime<Utc>,
) -> Result<Option<CacheEntry>, KeywardError> {
    let url = url.to_string();
    let signature = signature.to_string();
    let now = to_db_time(&now);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, url, signature, body, cached_until, error_displayed
                 FROM api_cache
                 WHERE url = ?1 AND signature = ?2 AND cached_until > ?3",
                params![url, signature, now],
                row_to_entry,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or overwrite the entry for this signature; last write wins.
///
/// A rewrite within the same expiry window (a concurrent duplicate fetch)
/// keeps `error_displayed`; a new window clears it.
pub async fn store_response(
    db: &Database,
    url: &str,
    signature: &str,
    body: &str,
    cached_until: DateTime<Utc>,
) -> Result<CacheEntry, KeywardError> {
    let url = url.to_string();
    let signature = signature.to_string();
    let body = body.to_string();
    let cached_until = to_db_time(&cached_until);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO api_cache (url, signature, body, cached_until, error_displayed)
                 VALUES (?1, ?2, ?3, ?4, 0)
                 ON CONFLICT(url, signature) DO UPDATE SET
                     body = excluded.body,
                     cached_until = excluded.cached_until,
                     error_displayed = CASE
                         WHEN api_cache.cached_until = excluded.cached_until
                         THEN api_cache.error_displayed
                         ELSE 0
                     END
                 RETURNING id, url, signature, body, cached_until, error_displayed",
                params![url, signature, body, cached_until],
                row_to_entry,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Set the error flag. `true` only for the caller that flipped it.
pub async fn mark_error_displayed(db: &Database, id: i64) -> Result<bool, KeywardError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE api_cache SET error_displayed = 1 WHERE id = ?1 AND error_displayed = 0",
                params![id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn purge_expired_responses(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<usize, KeywardError> {
    let now = to_db_time(&now);
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM api_cache WHERE cached_until <= ?1", params![now]))
        .await
        .map_err(map_tr_err)
}

pub async fn cached_response_count(db: &Database) -> Result<i64, KeywardError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM api_cache", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{at, setup_db};

    #[tokio::test]
    async fn hit_requires_future_expiry() {
        let (db, _dir) = setup_db().await;
        let until = at(12, 30, 0);
        store_response(&db, "/a", "sig", "<body>", until).await.unwrap();

        assert!(find_fresh_response(&db, "/a", "sig", at(12, 29, 59)).await.unwrap().is_some());
        assert!(find_fresh_response(&db, "/a", "sig", until).await.unwrap().is_none());
        assert!(find_fresh_response(&db, "/a", "other", at(12, 0, 0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn error_flag_is_set_once() {
        let (db, _dir) = setup_db().await;
        let entry = store_response(&db, "/a", "sig", "err", at(12, 30, 0)).await.unwrap();
        assert!(!entry.error_displayed);

        assert!(mark_error_displayed(&db, entry.id).await.unwrap());
        assert!(!mark_error_displayed(&db, entry.id).await.unwrap());
    }

    #[tokio::test]
    async fn rewrite_in_same_window_keeps_flag() {
        let (db, _dir) = setup_db().await;
        let until = at(12, 30, 0);
        let entry = store_response(&db, "/a", "sig", "err", until).await.unwrap();
        mark_error_displayed(&db, entry.id).await.unwrap();

        let same = store_response(&db, "/a", "sig", "err", until).await.unwrap();
        assert_eq!(same.id, entry.id);
        assert!(same.error_displayed);

        let next_window = store_response(&db, "/a", "sig", "err", at(13, 0, 0)).await.unwrap();
        assert_eq!(next_window.id, entry.id);
        assert!(!next_window.error_displayed);
        assert_eq!(cached_response_count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (db, _dir) = setup_db().await;
        store_response(&db, "/a", "s1", "x", at(11, 0, 0)).await.unwrap();
        store_response(&db, "/a", "s2", "y", at(13, 0, 0)).await.unwrap();

        assert_eq!(purge_expired_responses(&db, at(12, 0, 0)).await.unwrap(), 1);
        assert_eq!(cached_response_count(&db).await.unwrap(), 1);
    }
}
