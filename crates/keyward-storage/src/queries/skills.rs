// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trained character skills.

use keyward_core::KeywardError;
use keyward_core::entities::{Changeset, CharacterSkill};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

pub async fn character_skills(
    db: &Database,
    character_id: i64,
) -> Result<Vec<CharacterSkill>, KeywardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<CharacterSkill>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT character_id, skill_id, points, level FROM character_skills
                 WHERE character_id = ?1 ORDER BY skill_id",
            )?;
            let skills = stmt
                .query_map(params![character_id], |row| {
                    Ok(CharacterSkill {
                        character_id: row.get(0)?,
                        skill_id: row.get(1)?,
                        points: row.get(2)?,
                        level: row.get(3)?,
                    })
                })?
                .collect();
            skills
        })
        .await
        .map_err(map_tr_err)
}

pub async fn apply_skill_changes(
    db: &Database,
    changes: &Changeset<CharacterSkill>,
) -> Result<(), KeywardError> {
    let changes = changes.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut upsert = tx.prepare(
                    "INSERT INTO character_skills (character_id, skill_id, points, level)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(character_id, skill_id) DO UPDATE SET
                         points = excluded.points,
                         level = excluded.level",
                )?;
                for s in changes.created.iter().chain(changes.updated.iter()) {
                    upsert.execute(params![s.character_id, s.skill_id, s.points, s.level])?;
                }
                let mut delete = tx.prepare(
                    "DELETE FROM character_skills WHERE character_id = ?1 AND skill_id = ?2",
                )?;
                for s in &changes.removed {
                    delete.execute(params![s.character_id, s.skill_id])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::characters::upsert_character;
    use crate::queries::lookups::insert_skill;
    use crate::queries::test_support::setup_db;
    use keyward_core::entities::{Character, Skill};

    #[tokio::test]
    async fn skills_upsert_by_character_and_type() {
        let (db, _dir) = setup_db().await;
        upsert_character(
            &db,
            &Character {
                id: 90,
                name: "Pilot".into(),
                corporation_id: None,
            },
        )
        .await
        .unwrap();
        insert_skill(&db, &Skill { id: 3300, name: "Gunnery".into() }).await.unwrap();

        let mut skill = CharacterSkill {
            character_id: 90,
            skill_id: 3300,
            points: 250,
            level: 1,
        };
        let created = Changeset {
            created: vec![skill.clone()],
            ..Changeset::default()
        };
        apply_skill_changes(&db, &created).await.unwrap();

        skill.points = 1415;
        skill.level = 2;
        let updated = Changeset {
            updated: vec![skill.clone()],
            ..Changeset::default()
        };
        apply_skill_changes(&db, &updated).await.unwrap();

        assert_eq!(character_skills(&db, 90).await.unwrap(), vec![skill]);
    }
}
