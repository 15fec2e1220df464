// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe job queue rows.
//!
//! Entries move `pending` -> `processing` -> `completed` | `failed`. Retries
//! are driven by schedule state, so a failed entry is never re-queued.

use keyward_core::KeywardError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// A row taken off the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueRow {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub attempts: i32,
}

/// Enqueue a payload. Returns the new entry id.
pub async fn enqueue(db: &Database, queue_name: &str, payload: &str) -> Result<i64, KeywardError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO queue (queue_name, payload) VALUES (?1, ?2)",
                params![queue_name, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Take the oldest pending entry of a queue and mark it `processing`.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<QueueRow>, KeywardError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<QueueRow>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let row = tx
                .query_row(
                    "SELECT id, queue_name, payload, attempts FROM queue
                     WHERE queue_name = ?1 AND status = 'pending'
                     ORDER BY id ASC LIMIT 1",
                    params![queue_name],
                    |row| {
                        Ok(QueueRow {
                            id: row.get(0)?,
                            queue_name: row.get(1)?,
                            payload: row.get(2)?,
                            attempts: row.get(3)?,
                        })
                    },
                )
                .optional()?;

            let row = match row {
                Some(row) => {
                    tx.execute(
                        "UPDATE queue SET status = 'processing', attempts = attempts + 1,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![row.id],
                    )?;
                    Some(QueueRow {
                        attempts: row.attempts + 1,
                        ..row
                    })
                }
                None => None,
            };
            tx.commit()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

async fn set_status(db: &Database, id: i64, status: &'static str) -> Result<(), KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, status],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn ack(db: &Database, id: i64) -> Result<(), KeywardError> {
    set_status(db, id, "completed").await
}

pub async fn fail(db: &Database, id: i64) -> Result<(), KeywardError> {
    set_status(db, id, "failed").await
}

/// Mark every pending or processing entry `failed`. Returns how many.
pub async fn discard_unfinished(db: &Database) -> Result<usize, KeywardError> {
    db.connection()
        .call(|conn| {
            conn.execute(
                "UPDATE queue SET status = 'failed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE status IN ('pending', 'processing')",
                [],
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn pending_count(db: &Database, queue_name: &str) -> Result<i64, KeywardError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM queue WHERE queue_name = ?1 AND status = 'pending'",
                params![queue_name],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
