// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schedule state rows, one per (identity, url, parameter) unit.
//!
//! The transition into `running` is a single conditional UPDATE; the row
//! count it reports decides which of several concurrent passes dispatches.

use chrono::{DateTime, Utc};
use keyward_core::{CredentialIdentity, KeywardError, ScheduleState, TaskState};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::queries::{get_parsed, get_time, placeholders, to_db_time};

const STATE_COLUMNS: &str = "id, identity, url, parameter, state, mod_time, next_time";

fn row_to_state(row: &Row<'_>) -> rusqlite::Result<ScheduleState> {
    Ok(ScheduleState {
        id: row.get(0)?,
        identity: CredentialIdentity(row.get(1)?),
        url: row.get(2)?,
        parameter: row.get(3)?,
        state: get_parsed(row, 4)?,
        mod_time: get_time(row, 5)?,
        next_time: get_time(row, 6)?,
    })
}

pub async fn schedule_states(
    db: &Database,
    identities: &[CredentialIdentity],
) -> Result<Vec<ScheduleState>, KeywardError> {
    if identities.is_empty() {
        return Ok(Vec::new());
    }
    let identities: Vec<String> = identities.iter().map(|i| i.0.clone()).collect();
    db.connection()
        .call(move |conn| -> Result<Vec<ScheduleState>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STATE_COLUMNS} FROM schedule_states
                 WHERE identity IN ({}) ORDER BY id",
                placeholders(identities.len())
            ))?;
            let states = stmt
                .query_map(params_from_iter(identities.iter()), row_to_state)?
                .collect();
            states
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the unit as `queued`, due now, unless it exists. Returns the row
/// and whether this call created it.
pub async fn ensure_schedule_state(
    db: &Database,
    identity: &CredentialIdentity,
    url: &str,
    parameter: i64,
    now: DateTime<Utc>,
) -> Result<(ScheduleState, bool), KeywardError> {
    let identity = identity.0.clone();
    let url = url.to_string();
    let now = to_db_time(&now);
    db.connection()
        .call(move |conn| -> Result<(ScheduleState, bool), rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO schedule_states (identity, url, parameter, state, mod_time, next_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(identity, url, parameter) DO NOTHING",
                params![identity, url, parameter, TaskState::Queued.to_string(), now],
            )?;
            let state = conn.query_row(
                &format!(
                    "SELECT {STATE_COLUMNS} FROM schedule_states
                     WHERE identity = ?1 AND url = ?2 AND parameter = ?3"
                ),
                params![identity, url, parameter],
                row_to_state,
            )?;
            Ok((state, inserted == 1))
        })
        .await
        .map_err(map_tr_err)
}

/// Compare-and-set into `running`. `true` only for the caller that moved it.
pub async fn claim_schedule_state(
    db: &Database,
    id: i64,
    now: DateTime<Utc>,
) -> Result<bool, KeywardError> {
    let now = to_db_time(&now);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE schedule_states SET state = 'running', mod_time = ?2
                 WHERE id = ?1 AND state != 'running' AND next_time <= ?2",
                params![id, now],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Move to `ready`. The stored `next_time` only ever grows.
pub async fn release_schedule_state(
    db: &Database,
    id: i64,
    now: DateTime<Utc>,
    next_time: DateTime<Utc>,
) -> Result<(), KeywardError> {
    let now = to_db_time(&now);
    let next_time = to_db_time(&next_time);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE schedule_states
                 SET state = 'ready', mod_time = ?2, next_time = MAX(next_time, ?3)
                 WHERE id = ?1",
                params![id, now, next_time],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_schedule_state(db: &Database, id: i64) -> Result<Option<ScheduleState>, KeywardError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {STATE_COLUMNS} FROM schedule_states WHERE id = ?1"),
                params![id],
                row_to_state,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Reset every `running` row to `ready` and due at `now`.
pub async fn recover_running(db: &Database, now: DateTime<Utc>) -> Result<usize, KeywardError> {
    let now = to_db_time(&now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE schedule_states
                 SET state = 'ready', mod_time = ?1, next_time = MAX(next_time, ?1)
                 WHERE state = 'running'",
                params![now],
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn schedule_state_counts(db: &Database) -> Result<Vec<(TaskState, i64)>, KeywardError> {
    db.connection()
        .call(|conn| -> Result<Vec<(TaskState, i64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT state, COUNT(*) FROM schedule_states GROUP BY state ORDER BY state",
            )?;
            let counts = stmt
                .query_map([], |row| Ok((get_parsed(row, 0)?, row.get(1)?)))?
                .collect();
            counts
        })
        .await
        .map_err(map_tr_err)
}
