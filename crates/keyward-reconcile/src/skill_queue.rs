// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Skill queue: wholesale replace, no diffing and no events.

use keyward_core::entities::SkillQueueEntry;
use keyward_core::{EntityStore, KeywardError};
use tracing::debug;

use crate::remote::RemoteQueueEntry;

/// Convert remote rows into stored entries. Rows without both a start
/// and an end time (a paused queue) are dropped.
pub fn queue_entries(character_id: i64, remote: &[RemoteQueueEntry]) -> Vec<SkillQueueEntry> {
    remote
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let (start_time, end_time) = (row.start_time?, row.end_time?);
            Some(SkillQueueEntry {
                character_id,
                position: row.queue_position.unwrap_or(index as i32),
                skill_id: row.skill_id,
                to_level: row.level,
                start_sp: row.start_sp,
                end_sp: row.end_sp,
                start_time,
                end_time,
            })
        })
        .collect()
}

pub async fn replace_queue(
    store: &dyn EntityStore,
    character_id: i64,
    remote: &[RemoteQueueEntry],
) -> Result<Vec<SkillQueueEntry>, KeywardError> {
    let entries = queue_entries(character_id, remote);
    store.replace_skill_queue(character_id, &entries).await?;
    debug!(character_id, entries = entries.len(), "skill queue replaced");
    Ok(entries)
}
