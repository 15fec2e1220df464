// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use keyward_reconcile::LookupCache;
use keyward_reconcile::remote::StandingsResult;
use keyward_reconcile::standings::sync_standings;

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

/// NPC corporation and faction standings; agent standings are ignored.
pub struct StandingsHandler;

#[async_trait]
impl EndpointHandler for StandingsHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let character_id = input.character_id()?;
        let remote: StandingsResult = input.document.result_as()?;
        let lookups = LookupCache::new();
        sync_standings(ctx.store.as_ref(), &lookups, character_id, &remote.standings).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{apply, fixture};
    use keyward_core::entities::StandingKind;
    use keyward_core::{Endpoint, EntityStore, KeyType};
    use serde_json::json;

    fn standings(corp: f64, with_faction: bool) -> serde_json::Value {
        let factions = if with_faction {
            json!([{ "fromID": 500001, "fromName": "Caldari State", "standing": 2.5 }])
        } else {
            json!([])
        };
        json!({ "characterNPCStandings": {
            "agents": [{ "fromID": 3008416, "fromName": "Antaken Kamola", "standing": 1.0 }],
            "NPCCorporations": [{ "fromID": 1000035, "fromName": "Caldari Navy", "standing": corp }],
            "factions": factions,
        }})
    }

    #[tokio::test]
    async fn updates_values_and_retains_absent_rows() {
        let f = fixture().await;
        f.harness.seed_character(90, "Pilot", None).await.unwrap();
        let credential = f
            .harness
            .seed_credential(1, 500, "secret", KeyType::Character, -1)
            .await
            .unwrap();

        apply(&f, Endpoint::Standings, &credential, Some(90), standings(1.0, true))
            .await
            .unwrap();
        apply(&f, Endpoint::Standings, &credential, Some(90), standings(3.2, false))
            .await
            .unwrap();

        let mut stored = f.ctx.store.standings(90).await.unwrap();
        stored.sort_by_key(|s| s.from_id);
        assert_eq!(stored.len(), 2);
        assert_eq!((stored[0].kind, stored[0].value), (StandingKind::Faction, 2.5));
        assert_eq!((stored[1].kind, stored[1].value), (StandingKind::Corporation, 3.2));
    }
}
