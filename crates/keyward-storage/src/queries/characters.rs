// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Characters, corporations and character sheets.

use keyward_core::KeywardError;
use keyward_core::entities::{Attributes, Character, CharacterSheet, Corporation};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::queries::placeholders;

fn row_to_character(row: &Row<'_>) -> rusqlite::Result<Character> {
    Ok(Character {
        id: row.get(0)?,
        name: row.get(1)?,
        corporation_id: row.get(2)?,
    })
}

pub async fn get_character(db: &Database, id: i64) -> Result<Option<Character>, KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, corporation_id FROM characters WHERE id = ?1",
                params![id],
                row_to_character,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn characters_by_ids(db: &Database, ids: &[i64]) -> Result<Vec<Character>, KeywardError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<Character>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, name, corporation_id FROM characters WHERE id IN ({}) ORDER BY id",
                placeholders(ids.len())
            ))?;
            let characters = stmt
                .query_map(params_from_iter(ids.iter()), row_to_character)?
                .collect();
            characters
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the character or refresh its name and corporation.
pub async fn upsert_character(db: &Database, character: &Character) -> Result<(), KeywardError> {
    let c = character.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO characters (id, name, corporation_id) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     corporation_id = excluded.corporation_id",
                params![c.id, c.name, c.corporation_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Return the corporation, inserting it with `name` if it is not known yet.
/// An existing row keeps its stored name.
pub async fn get_or_create_corporation(
    db: &Database,
    id: i64,
    name: &str,
) -> Result<Corporation, KeywardError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO corporations (id, name) VALUES (?1, ?2)",
                params![id, name],
            )?;
            conn.query_row(
                "SELECT id, name FROM corporations WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Corporation {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn save_character_sheet(db: &Database, sheet: &CharacterSheet) -> Result<(), KeywardError> {
    let s = sheet.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO character_sheets (
                     character_id, wallet_balance,
                     charisma, intelligence, memory, perception, willpower,
                     charisma_bonus, intelligence_bonus, memory_bonus, perception_bonus,
                     willpower_bonus, clone_name, clone_skill_points)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(character_id) DO UPDATE SET
                     wallet_balance = excluded.wallet_balance,
                     charisma = excluded.charisma,
                     intelligence = excluded.intelligence,
                     memory = excluded.memory,
                     perception = excluded.perception,
                     willpower = excluded.willpower,
                     charisma_bonus = excluded.charisma_bonus,
                     intelligence_bonus = excluded.intelligence_bonus,
                     memory_bonus = excluded.memory_bonus,
                     perception_bonus = excluded.perception_bonus,
                     willpower_bonus = excluded.willpower_bonus,
                     clone_name = excluded.clone_name,
                     clone_skill_points = excluded.clone_skill_points",
                params![
                    s.character_id,
                    s.wallet_balance,
                    s.attributes.charisma,
                    s.attributes.intelligence,
                    s.attributes.memory,
                    s.attributes.perception,
                    s.attributes.willpower,
                    s.bonuses.charisma,
                    s.bonuses.intelligence,
                    s.bonuses.memory,
                    s.bonuses.perception,
                    s.bonuses.willpower,
                    s.clone_name,
                    s.clone_skill_points,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_character_sheet(
    db: &Database,
    character_id: i64,
) -> Result<Option<CharacterSheet>, KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT character_id, wallet_balance,
                        charisma, intelligence, memory, perception, willpower,
                        charisma_bonus, intelligence_bonus, memory_bonus, perception_bonus,
                        willpower_bonus, clone_name, clone_skill_points
                 FROM character_sheets WHERE character_id = ?1",
                params![character_id],
                |row| {
                    Ok(CharacterSheet {
                        character_id: row.get(0)?,
                        wallet_balance: row.get(1)?,
                        attributes: Attributes {
                            charisma: row.get(2)?,
                            intelligence: row.get(3)?,
                            memory: row.get(4)?,
                            perception: row.get(5)?,
                            willpower: row.get(6)?,
                        },
                        bonuses: Attributes {
                            charisma: row.get(7)?,
                            intelligence: row.get(8)?,
                            memory: row.get(9)?,
                            perception: row.get(10)?,
                            willpower: row.get(11)?,
                        },
                        clone_name: row.get(12)?,
                        clone_skill_points: row.get(13)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
