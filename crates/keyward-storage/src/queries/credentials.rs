// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential reads and the few fields keyward writes back.
//!
//! Several rows (different owners) can carry the same key. Writes that
//! describe the key itself apply to every row sharing its (key id, secret).

use chrono::{DateTime, Utc};
use keyward_core::entities::KeyInfoUpdate;
use keyward_core::{Credential, CredentialScope, KeywardError};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{get_optional_time, to_db_time};

const CREDENTIAL_COLUMNS: &str = "id, owner_id, key_id, v_code, key_type, access_mask, valid, \
                                  expires, paid_until, corp_character_id";

fn row_to_credential(row: &Row<'_>) -> rusqlite::Result<Credential> {
    let key_type: Option<String> = row.get(4)?;
    let key_type = key_type
        .map(|s| {
            s.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;
    Ok(Credential {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        key_id: row.get(2)?,
        v_code: row.get(3)?,
        key_type,
        access_mask: row.get(5)?,
        valid: row.get(6)?,
        expires: get_optional_time(row, 7)?,
        paid_until: get_optional_time(row, 8)?,
        corp_character_id: row.get(9)?,
    })
}

/// Insert a credential row. Provisioning lives outside keyward; this is
/// used by fixtures and the seeding path.
pub async fn insert_credential(db: &Database, credential: &Credential) -> Result<(), KeywardError> {
    let c = credential.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO credentials (id, owner_id, key_id, v_code, key_type, access_mask,
                                          valid, expires, paid_until, corp_character_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    c.id,
                    c.owner_id,
                    c.key_id,
                    c.v_code,
                    c.key_type.map(|k| k.to_string()),
                    c.access_mask,
                    c.valid,
                    c.expires.as_ref().map(to_db_time),
                    c.paid_until.as_ref().map(to_db_time),
                    c.corp_character_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Every valid credential with its linked character ids.
pub async fn schedulable_credentials(db: &Database) -> Result<Vec<CredentialScope>, KeywardError> {
    db.connection()
        .call(|conn| -> Result<Vec<CredentialScope>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE valid = 1 ORDER BY id"
            ))?;
            let credentials = stmt
                .query_map([], row_to_credential)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut links = conn.prepare(
                "SELECT character_id FROM credential_characters
                 WHERE credential_id = ?1 ORDER BY character_id",
            )?;
            let mut scopes = Vec::with_capacity(credentials.len());
            for credential in credentials {
                let character_ids = links
                    .query_map(params![credential.id], |row| row.get(0))?
                    .collect::<Result<Vec<i64>, _>>()?;
                scopes.push(CredentialScope {
                    credential,
                    character_ids,
                });
            }
            Ok(scopes)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_credential(db: &Database, id: i64) -> Result<Option<Credential>, KeywardError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE id = ?1"),
                params![id],
                row_to_credential,
            );
            match result {
                Ok(credential) => Ok(Some(credential)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Matches every credential row that shares the key of credential `?1`.
const SHARED_KEY: &str =
    "(key_id, v_code) = (SELECT key_id, v_code FROM credentials WHERE id = ?1)";

/// Flip `valid` off for this key. Returns how many rows changed.
pub async fn invalidate_credential(db: &Database, id: i64) -> Result<usize, KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE credentials SET valid = 0 WHERE {SHARED_KEY}"),
                params![id],
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn update_key_info(
    db: &Database,
    id: i64,
    update: &KeyInfoUpdate,
) -> Result<(), KeywardError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE credentials
                     SET access_mask = ?2, key_type = ?3, expires = ?4, corp_character_id = ?5
                     WHERE {SHARED_KEY}"
                ),
                params![
                    id,
                    update.access_mask,
                    update.key_type.to_string(),
                    update.expires.as_ref().map(to_db_time),
                    update.corp_character_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_paid_until(
    db: &Database,
    id: i64,
    paid_until: Option<DateTime<Utc>>,
) -> Result<(), KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE credentials SET paid_until = ?2 WHERE {SHARED_KEY}"),
                params![id, paid_until.as_ref().map(to_db_time)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Make `character_ids` the exact linked set of every credential with this
/// key. Characters no longer listed are unlinked; the character rows stay.
pub async fn link_characters(
    db: &Database,
    key_id: i64,
    v_code: &str,
    character_ids: &[i64],
) -> Result<(), KeywardError> {
    let v_code = v_code.to_string();
    let character_ids = character_ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            let credential_ids = {
                let mut stmt =
                    tx.prepare("SELECT id FROM credentials WHERE key_id = ?1 AND v_code = ?2")?;
                stmt.query_map(params![key_id, v_code], |row| row.get::<_, i64>(0))?
                    .collect::<Result<Vec<_>, _>>()?
            };
            for credential_id in credential_ids {
                tx.execute(
                    "DELETE FROM credential_characters WHERE credential_id = ?1",
                    params![credential_id],
                )?;
                for character_id in &character_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO credential_characters (credential_id, character_id)
                         VALUES (?1, ?2)",
                        params![credential_id, character_id],
                    )?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
