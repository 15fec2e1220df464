// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queued skill training. Always replaced wholesale per character.

use keyward_core::KeywardError;
use keyward_core::entities::SkillQueueEntry;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::{get_time, to_db_time};

pub async fn skill_queue(db: &Database, character_id: i64) -> Result<Vec<SkillQueueEntry>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<SkillQueueEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT character_id, position, skill_id, to_level, start_sp, end_sp,
                        start_time, end_time
                 FROM skill_queue WHERE character_id = ?1 ORDER BY position, id",
            )?;
            let entries = stmt
                .query_map(params![character_id], |row| {
                    Ok(SkillQueueEntry {
                        character_id: row.get(0)?,
                        position: row.get(1)?,
                        skill_id: row.get(2)?,
                        to_level: row.get(3)?,
                        start_sp: row.get(4)?,
                        end_sp: row.get(5)?,
                        start_time: get_time(row, 6)?,
                        end_time: get_time(row, 7)?,
                    })
                })?
                .collect();
            entries
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the character's queue and insert `entries`, atomically.
pub async fn replace_skill_queue(
    db: &Database,
    character_id: i64,
    entries: &[SkillQueueEntry],
) -> Result<(), KeywardError> {
    let entries = entries.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM skill_queue WHERE character_id = ?1", params![character_id])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO skill_queue (character_id, position, skill_id, to_level,
                                              start_sp, end_sp, start_time, end_time)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for e in &entries {
                    insert.execute(params![
                        character_id,
                        e.position,
                        e.skill_id,
                        e.to_level,
                        e.start_sp,
                        e.end_sp,
                        to_db_time(&e.start_time),
                        to_db_time(&e.end_time),
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
