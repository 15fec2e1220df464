// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trained skills from the character sheet. Never deleted.

use keyward_core::entities::CharacterSkill;
use keyward_core::{EntityStore, KeywardError};
use tracing::debug;

use crate::engine::{Reconcile, Reconciled, Removal, reconcile};
use crate::error::ReferenceError;
use crate::lookup::LookupCache;
use crate::remote::RemoteSkill;

#[derive(Debug, Clone, Copy)]
pub struct SkillReconciler {
    pub character_id: i64,
}

impl Reconcile for SkillReconciler {
    type Remote = RemoteSkill;
    type Local = CharacterSkill;
    type Key = i64;

    const REMOVAL: Removal = Removal::Retain;

    fn remote_key(&self, remote: &RemoteSkill) -> i64 {
        remote.skill_id
    }

    fn local_key(&self, local: &CharacterSkill) -> i64 {
        local.skill_id
    }

    fn update(&self, local: &mut CharacterSkill, remote: &RemoteSkill) -> bool {
        if local.points == remote.points && local.level == remote.level {
            return false;
        }
        local.points = remote.points;
        local.level = remote.level;
        true
    }

    fn create(&self, remote: &RemoteSkill, lookups: &LookupCache) -> Result<CharacterSkill, ReferenceError> {
        let skill = lookups.skill(remote.skill_id)?;
        Ok(CharacterSkill {
            character_id: self.character_id,
            skill_id: skill.id,
            points: remote.points,
            level: remote.level,
        })
    }
}

pub async fn sync_skills(
    store: &dyn EntityStore,
    lookups: &mut LookupCache,
    character_id: i64,
    remote: &[RemoteSkill],
) -> Result<Reconciled<CharacterSkill>, KeywardError> {
    let local = store.character_skills(character_id).await?;
    let ids: Vec<i64> = remote.iter().map(|s| s.skill_id).collect();
    lookups.load_skills(store, &ids).await?;

    let result = reconcile(&SkillReconciler { character_id }, remote, local, lookups);
    if !result.changes.is_empty() {
        store.apply_skill_changes(&result.changes).await?;
    }
    debug!(
        character_id,
        created = result.changes.created.len(),
        updated = result.changes.updated.len(),
        skipped = result.skipped.len(),
        "skills reconciled"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_test_utils::TestHarness;

    fn skill(skill_id: i64, points: i64, level: i32) -> RemoteSkill {
        RemoteSkill {
            skill_id,
            points,
            level,
        }
    }

    #[tokio::test]
    async fn creates_updates_and_keeps_absent_skills() {
        let harness = TestHarness::new().await.unwrap();
        harness.seed_character(90, "Pilot", None).await.unwrap();
        harness.seed_skill(3300, "Gunnery").await.unwrap();
        harness.seed_skill(3301, "Small Hybrid Turret").await.unwrap();
        let store = harness.storage();

        sync_skills(store.as_ref(), &mut LookupCache::new(), 90, &[skill(3300, 250, 1), skill(3301, 8000, 3)])
            .await
            .unwrap();

        let result = sync_skills(
            store.as_ref(),
            &mut LookupCache::new(),
            90,
            &[skill(3300, 1415, 2), skill(424242, 1, 1)],
        )
        .await
        .unwrap();
        assert_eq!(result.changes.updated, vec![CharacterSkill {
            character_id: 90,
            skill_id: 3300,
            points: 1415,
            level: 2
        }]);
        assert_eq!(result.skipped, vec![ReferenceError::Skill(424242)]);

        let stored = store.character_skills(90).await.unwrap();
        assert_eq!(stored.len(), 2, "3301 is retained although absent remotely");
    }
}
