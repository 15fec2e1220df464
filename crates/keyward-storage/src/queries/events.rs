// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only event log.

use keyward_core::{Event, KeywardError};
use rusqlite::{Connection, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{get_time, to_db_time};

/// Append events on an open connection or transaction.
pub(crate) fn insert_events(conn: &Connection, events: &[Event]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached("INSERT INTO events (owner_id, issued, text) VALUES (?1, ?2, ?3)")?;
    for event in events {
        stmt.execute(params![event.owner_id, to_db_time(&event.issued), event.text])?;
    }
    Ok(())
}

pub async fn append_events(db: &Database, events: &[Event]) -> Result<(), KeywardError> {
    let events = events.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            insert_events(&tx, &events)?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Events addressed to `owner_id`, oldest first.
pub async fn events_for_owner(db: &Database, owner_id: i64) -> Result<Vec<Event>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Event>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT owner_id, issued, text FROM events WHERE owner_id = ?1 ORDER BY issued, id",
            )?;
            let events = stmt
                .query_map(params![owner_id], |row| {
                    Ok(Event {
                        owner_id: row.get(0)?,
                        issued: get_time(row, 1)?,
                        text: row.get(2)?,
                    })
                })?
                .collect();
            events
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{at, setup_db};

    #[tokio::test]
    async fn events_are_filtered_by_owner() {
        let (db, _dir) = setup_db().await;
        let events = vec![
            Event {
                owner_id: 1,
                issued: at(12, 0, 0),
                text: "first".into(),
            },
            Event {
                owner_id: 2,
                issued: at(12, 0, 1),
                text: "other".into(),
            },
            Event {
                owner_id: 1,
                issued: at(12, 0, 2),
                text: "second".into(),
            },
        ];
        append_events(&db, &events).await.unwrap();

        let mine = events_for_owner(&db, 1).await.unwrap();
        let texts: Vec<&str> = mine.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
