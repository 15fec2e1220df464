// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NPC corporation and faction standings.

use keyward_core::KeywardError;
use keyward_core::entities::{Changeset, Standing};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::get_parsed;

pub async fn standings(db: &Database, character_id: i64) -> Result<Vec<Standing>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Standing>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT character_id, kind, from_id, from_name, value FROM standings
                 WHERE character_id = ?1 ORDER BY kind, from_id",
            )?;
            let standings = stmt
                .query_map(params![character_id], |row| {
                    Ok(Standing {
                        character_id: row.get(0)?,
                        kind: get_parsed(row, 1)?,
                        from_id: row.get(2)?,
                        from_name: row.get(3)?,
                        value: row.get(4)?,
                    })
                })?
                .collect();
            standings
        })
        .await
        .map_err(map_tr_err)
}

pub async fn apply_standing_changes(
    db: &Database,
    changes: &Changeset<Standing>,
) -> Result<(), KeywardError> {
    let changes = changes.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut upsert = tx.prepare(
                    "INSERT INTO standings (character_id, kind, from_id, from_name, value)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(character_id, kind, from_id) DO UPDATE SET
                         from_name = excluded.from_name,
                         value = excluded.value",
                )?;
                for s in changes.created.iter().chain(changes.updated.iter()) {
                    upsert.execute(params![
                        s.character_id,
                        s.kind.to_string(),
                        s.from_id,
                        s.from_name,
                        s.value
                    ])?;
                }
                let mut delete = tx.prepare(
                    "DELETE FROM standings WHERE character_id = ?1 AND kind = ?2 AND from_id = ?3",
                )?;
                for s in &changes.removed {
                    delete.execute(params![s.character_id, s.kind.to_string(), s.from_id])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
