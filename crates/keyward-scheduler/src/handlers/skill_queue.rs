// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use keyward_reconcile::remote::SkillQueueResult;
use keyward_reconcile::skill_queue::replace_queue;

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

/// Replaces the stored training queue wholesale.
pub struct SkillQueueHandler;

#[async_trait]
impl EndpointHandler for SkillQueueHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let character_id = input.character_id()?;
        let remote: SkillQueueResult = input.document.result_as()?;
        replace_queue(ctx.store.as_ref(), character_id, &remote.queue).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{apply, fixture};
    use keyward_core::{Endpoint, EntityStore, KeyType};
    use keyward_test_utils::envelope::{date, t};
    use serde_json::json;

    #[tokio::test]
    async fn replaces_queue_and_drops_untimed_rows() {
        let f = fixture().await;
        f.harness.seed_character(90, "Pilot", None).await.unwrap();
        let credential = f
            .harness
            .seed_credential(1, 500, "secret", KeyType::Character, -1)
            .await
            .unwrap();

        let queue = json!({ "queue": [
            { "queuePosition": 1, "typeID": 3300, "level": 4, "startSP": 8000, "endSP": 45255,
              "startTime": date(t(10, 0, 0)), "endTime": date(t(20, 0, 0)) },
            { "queuePosition": 2, "typeID": 3301, "level": 2, "startSP": 250, "endSP": 1415,
              "startTime": "", "endTime": "" },
        ]});
        apply(&f, Endpoint::SkillQueue, &credential, Some(90), queue)
            .await
            .unwrap();

        let stored = f.ctx.store.skill_queue(90).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].skill_id, 3300);
        assert_eq!(stored[0].end_time, t(20, 0, 0));

        apply(&f, Endpoint::SkillQueue, &credential, Some(90), json!({ "queue": [] }))
            .await
            .unwrap();
        assert!(f.ctx.store.skill_queue(90).await.unwrap().is_empty());
    }
}
