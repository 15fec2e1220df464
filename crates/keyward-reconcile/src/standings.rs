// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NPC corporation and faction standings. Updated in place, never removed.

use keyward_core::entities::{Changeset, Standing, StandingKind};
use keyward_core::{EntityStore, KeywardError};
use tracing::debug;

use crate::engine::{Reconcile, Reconciled, Removal, reconcile};
use crate::error::ReferenceError;
use crate::lookup::LookupCache;
use crate::remote::{NpcStandings, RemoteStanding};

#[derive(Debug, Clone, Copy)]
pub struct StandingReconciler {
    pub character_id: i64,
    pub kind: StandingKind,
}

impl Reconcile for StandingReconciler {
    type Remote = RemoteStanding;
    type Local = Standing;
    type Key = i64;

    const REMOVAL: Removal = Removal::Retain;

    fn remote_key(&self, remote: &RemoteStanding) -> i64 {
        remote.from_id
    }

    fn local_key(&self, local: &Standing) -> i64 {
        local.from_id
    }

    fn update(&self, local: &mut Standing, remote: &RemoteStanding) -> bool {
        if local.value == remote.standing {
            return false;
        }
        local.value = remote.standing;
        true
    }

    fn create(&self, remote: &RemoteStanding, _lookups: &LookupCache) -> Result<Standing, ReferenceError> {
        Ok(Standing {
            character_id: self.character_id,
            kind: self.kind,
            from_id: remote.from_id,
            from_name: remote.from_name.clone(),
            value: remote.standing,
        })
    }
}

/// Reconcile both standing groups and persist them together.
pub async fn sync_standings(
    store: &dyn EntityStore,
    lookups: &LookupCache,
    character_id: i64,
    remote: &NpcStandings,
) -> Result<Changeset<Standing>, KeywardError> {
    let local = store.standings(character_id).await?;
    let (corporations, factions): (Vec<Standing>, Vec<Standing>) = local
        .into_iter()
        .partition(|s| s.kind == StandingKind::Corporation);

    let mut changes = Changeset::default();
    for (kind, remote, local) in [
        (StandingKind::Corporation, &remote.npc_corporations, corporations),
        (StandingKind::Faction, &remote.factions, factions),
    ] {
        let Reconciled { changes: part, .. } =
            reconcile(&StandingReconciler { character_id, kind }, remote, local, lookups);
        changes.created.extend(part.created);
        changes.updated.extend(part.updated);
    }

    if !changes.is_empty() {
        store.apply_standing_changes(&changes).await?;
    }
    debug!(
        character_id,
        created = changes.created.len(),
        updated = changes.updated.len(),
        "standings reconciled"
    );
    Ok(changes)
}
