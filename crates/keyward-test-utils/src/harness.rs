// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database fixture with seeding helpers.
//!
//! Keyward does not provision credentials or reference data itself; the
//! helpers here write them directly through the storage query layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use keyward_config::model::StorageConfig;
use keyward_core::entities::{CorpWallet, Character, Item, Skill, Station};
use keyward_core::{
    Credential, CredentialStore, EntityStore, KeyType, KeywardError, StorageAdapter,
};
use keyward_storage::{Database, SqliteJobQueue, SqliteStorage, queries};
use tempfile::TempDir;

/// An initialized [`SqliteStorage`] on a database that lives as long as
/// the harness.
pub struct TestHarness {
    storage: Arc<SqliteStorage>,
    next_credential_id: AtomicI64,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, KeywardError> {
        let temp_dir = TempDir::new().map_err(|e| KeywardError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;

        Ok(Self {
            storage: Arc::new(storage),
            next_credential_id: AtomicI64::new(1),
            _temp_dir: temp_dir,
        })
    }

    pub fn storage(&self) -> Arc<SqliteStorage> {
        Arc::clone(&self.storage)
    }

    pub fn database(&self) -> Result<Database, KeywardError> {
        self.storage.database().cloned()
    }

    /// A job queue on the same database.
    pub fn job_queue(&self) -> Result<SqliteJobQueue, KeywardError> {
        Ok(SqliteJobQueue::new(self.database()?))
    }

    /// Insert a valid credential. `mask` of `-1` grants every endpoint.
    pub async fn seed_credential(
        &self,
        owner_id: i64,
        key_id: i64,
        v_code: &str,
        key_type: KeyType,
        mask: i64,
    ) -> Result<Credential, KeywardError> {
        let credential = Credential {
            id: self.next_credential_id.fetch_add(1, Ordering::SeqCst),
            owner_id,
            key_id,
            v_code: v_code.to_string(),
            key_type: Some(key_type),
            access_mask: mask,
            valid: true,
            expires: None,
            paid_until: None,
            corp_character_id: None,
        };
        queries::credentials::insert_credential(self.storage.database()?, &credential).await?;
        Ok(credential)
    }

    /// Insert a corporation key bound to `corp_character_id`.
    pub async fn seed_corporation_credential(
        &self,
        owner_id: i64,
        key_id: i64,
        v_code: &str,
        corp_character_id: i64,
    ) -> Result<Credential, KeywardError> {
        let credential = Credential {
            id: self.next_credential_id.fetch_add(1, Ordering::SeqCst),
            owner_id,
            key_id,
            v_code: v_code.to_string(),
            key_type: Some(KeyType::Corporation),
            access_mask: -1,
            valid: true,
            expires: None,
            paid_until: None,
            corp_character_id: Some(corp_character_id),
        };
        queries::credentials::insert_credential(self.storage.database()?, &credential).await?;
        Ok(credential)
    }

    /// Insert a character in a (possibly new) corporation.
    pub async fn seed_character(
        &self,
        id: i64,
        name: &str,
        corporation: Option<(i64, &str)>,
    ) -> Result<Character, KeywardError> {
        let corporation_id = match corporation {
            Some((corp_id, corp_name)) => {
                Some(self.storage.get_or_create_corporation(corp_id, corp_name).await?.id)
            }
            None => None,
        };
        let character = Character {
            id,
            name: name.to_string(),
            corporation_id,
        };
        self.storage.upsert_character(&character).await?;
        Ok(character)
    }

    /// Link characters to a credential's key.
    pub async fn link(&self, credential: &Credential, character_ids: &[i64]) -> Result<(), KeywardError> {
        self.storage
            .link_characters(credential.key_id, &credential.v_code, character_ids)
            .await
    }

    pub async fn seed_item(&self, id: i64, name: &str) -> Result<(), KeywardError> {
        let item = Item {
            id,
            name: name.to_string(),
        };
        queries::lookups::insert_item(self.storage.database()?, &item).await
    }

    pub async fn seed_skill(&self, id: i64, name: &str) -> Result<(), KeywardError> {
        let skill = Skill {
            id,
            name: name.to_string(),
        };
        queries::lookups::insert_skill(self.storage.database()?, &skill).await
    }

    pub async fn seed_station(&self, id: i64, name: &str) -> Result<(), KeywardError> {
        let station = Station {
            id,
            name: name.to_string(),
            short_name: name.split(" - ").next().unwrap_or(name).to_string(),
        };
        queries::lookups::insert_station(self.storage.database()?, &station).await
    }

    pub async fn seed_corp_wallet(
        &self,
        id: i64,
        corporation_id: i64,
        account_key: i64,
    ) -> Result<(), KeywardError> {
        let wallet = CorpWallet {
            id,
            corporation_id,
            account_key,
            description: format!("Division {}", account_key - 999),
        };
        queries::lookups::insert_corp_wallet(self.storage.database()?, &wallet).await
    }
}
