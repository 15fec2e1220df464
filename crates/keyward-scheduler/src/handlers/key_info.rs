// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential info: key type, access mask, expiry and the character roster.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::KeyType;
use keyward_core::entities::{Character, KeyInfoUpdate};
use keyward_reconcile::LookupCache;
use keyward_reconcile::remote::optional_api_date;
use serde::Deserialize;
use tracing::{debug, info};

use super::{EndpointHandler, HandlerInput};
use crate::error::JobError;
use crate::runner::JobContext;

#[derive(Debug, Deserialize)]
struct KeyInfoResult {
    key: RemoteKey,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteKey {
    access_mask: i64,
    #[serde(rename = "type")]
    key_type: KeyType,
    #[serde(default, deserialize_with = "optional_api_date")]
    expires: Option<DateTime<Utc>>,
    #[serde(default)]
    characters: Vec<RemoteKeyCharacter>,
}

#[derive(Debug, Deserialize)]
struct RemoteKeyCharacter {
    #[serde(rename = "characterID")]
    id: i64,
    #[serde(rename = "characterName")]
    name: String,
    #[serde(rename = "corporationID")]
    corporation_id: i64,
    #[serde(rename = "corporationName")]
    corporation_name: String,
}

pub struct KeyInfoHandler;

#[async_trait]
impl EndpointHandler for KeyInfoHandler {
    async fn apply(&self, ctx: &JobContext, input: HandlerInput<'_>) -> Result<(), JobError> {
        let key = input.document.result_as::<KeyInfoResult>()?.key;
        let store = ctx.store.as_ref();

        let mut lookups = LookupCache::new();
        let mut listed = Vec::with_capacity(key.characters.len());
        for remote in &key.characters {
            let corporation = lookups
                .corporation(store, remote.corporation_id, &remote.corporation_name)
                .await?;
            let character = Character {
                id: remote.id,
                name: remote.name.clone(),
                corporation_id: Some(corporation.id),
            };
            store.upsert_character(&character).await?;
            listed.push(character.id);
        }

        // Corporation keys list exactly one character: the one the key acts as.
        let corp_character_id = match key.key_type {
            KeyType::Corporation => listed.first().copied(),
            _ => None,
        };
        ctx.credentials
            .update_key_info(
                input.credential.id,
                &KeyInfoUpdate {
                    access_mask: key.access_mask,
                    key_type: key.key_type,
                    expires: key.expires,
                    corp_character_id,
                },
            )
            .await?;

        if key.key_type.is_character_scoped() {
            ctx.credentials
                .link_characters(input.credential.key_id, &input.credential.v_code, &listed)
                .await?;
            debug!(
                credential_id = input.credential.id,
                characters = listed.len(),
                "characters linked"
            );
        }
        if input.credential.key_type != Some(key.key_type) {
            info!(
                credential_id = input.credential.id,
                key_type = %key.key_type,
                "credential key type recorded"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{apply, fixture};
    use keyward_core::{CredentialStore, Endpoint, EntityStore};
    use keyward_test_utils::envelope::{date, t};
    use serde_json::json;

    use super::*;

    fn roster(key_type: &str, characters: &[(i64, &str)]) -> serde_json::Value {
        json!({
            "key": {
                "accessMask": 268435455,
                "type": key_type,
                "expires": "",
                "characters": characters.iter().map(|(id, name)| json!({
                    "characterID": id,
                    "characterName": name,
                    "corporationID": 1000009,
                    "corporationName": "Caldari Provisions",
                })).collect::<Vec<_>>(),
            }
        })
    }

    #[tokio::test]
    async fn account_key_upserts_and_links_characters() {
        let f = fixture().await;
        let credential = f
            .harness
            .seed_credential(1, 500, "secret", KeyType::Account, 0)
            .await
            .unwrap();
        let twin = f
            .harness
            .seed_credential(2, 500, "secret", KeyType::Account, 0)
            .await
            .unwrap();
        f.harness.seed_character(77, "Retired", None).await.unwrap();
        f.harness.link(&credential, &[77]).await.unwrap();

        apply(
            &f,
            Endpoint::ApiKeyInfo,
            &credential,
            None,
            roster("Account", &[(90, "Pilot"), (91, "Alt")]),
        )
        .await
        .unwrap();

        let pilot = f.ctx.store.get_character(90).await.unwrap().unwrap();
        assert_eq!(pilot.corporation_id, Some(1000009));

        let scopes = f.harness.storage().schedulable_credentials().await.unwrap();
        for scope in &scopes {
            assert_eq!(scope.character_ids, vec![90, 91]);
            assert_eq!(scope.credential.access_mask, 268435455);
            assert_eq!(scope.credential.expires, None);
        }
        assert!(scopes.iter().any(|s| s.credential.id == twin.id));
    }

    #[tokio::test]
    async fn corporation_key_records_corp_character() {
        let f = fixture().await;
        let credential = f
            .harness
            .seed_credential(1, 600, "corp", KeyType::Account, 0)
            .await
            .unwrap();
        let mut body = roster("Corporation", &[(95, "Director")]);
        body["key"]["expires"] = json!(date(t(18, 0, 0)));

        apply(&f, Endpoint::ApiKeyInfo, &credential, None, body)
            .await
            .unwrap();

        let stored = f.ctx.credentials.get_credential(credential.id).await.unwrap().unwrap();
        assert_eq!(stored.key_type, Some(KeyType::Corporation));
        assert_eq!(stored.corp_character_id, Some(95));
        assert_eq!(stored.expires, Some(t(18, 0, 0)));

        let scopes = f.harness.storage().schedulable_credentials().await.unwrap();
        assert!(scopes[0].character_ids.is_empty());
    }

    #[tokio::test]
    async fn unknown_key_type_is_malformed() {
        let f = fixture().await;
        let credential = f
            .harness
            .seed_credential(1, 500, "secret", KeyType::Account, 0)
            .await
            .unwrap();
        let err = apply(&f, Endpoint::ApiKeyInfo, &credential, None, roster("Alliance", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.fetch_kind(), Some(keyward_fetch::FailureKind::Malformed));
    }
}
