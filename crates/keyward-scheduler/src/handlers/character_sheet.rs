// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Character sheet: scalar fields on the character row plus trained skills.

use async_trait::async_trait;
use keyward_core::entities::{Attributes, CharacterSheet};
use keyward_reconcile::LookupCache;
use keyward_reconcile::remote::RemoteSkill;
use keyward_reconcile::skills::sync_skills;
use serde::Deserialize;

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetResult {
    balance: f64,
    attributes: RemoteAttributes,
    /// Implant bonuses; the remote omits attributes without an implant.
    #[serde(default)]
    attribute_enhancers: RemoteAttributes,
    clone_name: String,
    clone_skill_points: i64,
    #[serde(default)]
    skills: Vec<RemoteSkill>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteAttributes {
    charisma: i32,
    intelligence: i32,
    memory: i32,
    perception: i32,
    willpower: i32,
}

impl From<RemoteAttributes> for Attributes {
    fn from(a: RemoteAttributes) -> Self {
        Attributes {
            charisma: a.charisma,
            intelligence: a.intelligence,
            memory: a.memory,
            perception: a.perception,
            willpower: a.willpower,
        }
    }
}

pub struct CharacterSheetHandler;

#[async_trait]
impl EndpointHandler for CharacterSheetHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let character_id = input.character_id()?;
        let sheet: SheetResult = input.document.result_as()?;

        ctx.store
            .save_character_sheet(&CharacterSheet {
                character_id,
                wallet_balance: sheet.balance,
                attributes: sheet.attributes.into(),
                bonuses: sheet.attribute_enhancers.into(),
                clone_name: sheet.clone_name,
                clone_skill_points: sheet.clone_skill_points,
            })
            .await?;

        let mut lookups = LookupCache::new();
        sync_skills(ctx.store.as_ref(), &mut lookups, character_id, &sheet.skills).await?;
        Ok(())
    }
}
