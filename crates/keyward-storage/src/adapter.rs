// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use keyward_config::model::StorageConfig;
use keyward_core::entities::{
    Changeset, Character, CharacterSheet, CharacterSkill, CorpWallet, Corporation, Item,
    KeyInfoUpdate, MarketOrder, OrderScope, Skill, SkillQueueEntry, Standing, Station,
};
use keyward_core::{
    AdapterType, CacheEntry, CacheStore, Credential, CredentialIdentity, CredentialScope,
    CredentialStore, EntityStore, Event, HealthStatus, KeywardError, PluginAdapter,
    ScheduleState, ScheduleStore, StorageAdapter, TaskState,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// call fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: String::new(),
                wal_mode: true,
            },
            db: OnceCell::from(db),
        }
    }

    /// The underlying database, shared with the job queue.
    pub fn database(&self) -> Result<&Database, KeywardError> {
        self.db.get().ok_or_else(|| KeywardError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), KeywardError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        let Ok(db) = self.database() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), KeywardError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| KeywardError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), KeywardError> {
        self.database()?;
        self.checkpoint().await
    }
}

#[async_trait]
impl CredentialStore for SqliteStorage {
    async fn schedulable_credentials(&self) -> Result<Vec<CredentialScope>, KeywardError> {
        queries::credentials::schedulable_credentials(self.database()?).await
    }

    async fn get_credential(&self, id: i64) -> Result<Option<Credential>, KeywardError> {
        queries::credentials::get_credential(self.database()?, id).await
    }

    async fn invalidate_credential(&self, id: i64) -> Result<(), KeywardError> {
        queries::credentials::invalidate_credential(self.database()?, id).await?;
        Ok(())
    }

    async fn update_key_info(&self, id: i64, update: &KeyInfoUpdate) -> Result<(), KeywardError> {
        queries::credentials::update_key_info(self.database()?, id, update).await
    }

    async fn set_paid_until(
        &self,
        id: i64,
        paid_until: Option<DateTime<Utc>>,
    ) -> Result<(), KeywardError> {
        queries::credentials::set_paid_until(self.database()?, id, paid_until).await
    }

    async fn link_characters(
        &self,
        key_id: i64,
        v_code: &str,
        character_ids: &[i64],
    ) -> Result<(), KeywardError> {
        queries::credentials::link_characters(self.database()?, key_id, v_code, character_ids)
            .await
    }
}

#[async_trait]
impl ScheduleStore for SqliteStorage {
    async fn schedule_states(
        &self,
        identities: &[CredentialIdentity],
    ) -> Result<Vec<ScheduleState>, KeywardError> {
        queries::schedule::schedule_states(self.database()?, identities).await
    }

    async fn ensure_schedule_state(
        &self,
        identity: &CredentialIdentity,
        url: &str,
        parameter: i64,
        now: DateTime<Utc>,
    ) -> Result<(ScheduleState, bool), KeywardError> {
        queries::schedule::ensure_schedule_state(self.database()?, identity, url, parameter, now)
            .await
    }

    async fn claim_schedule_state(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, KeywardError> {
        queries::schedule::claim_schedule_state(self.database()?, id, now).await
    }

    async fn release_schedule_state(
        &self,
        id: i64,
        now: DateTime<Utc>,
        next_time: DateTime<Utc>,
    ) -> Result<(), KeywardError> {
        queries::schedule::release_schedule_state(self.database()?, id, now, next_time).await
    }

    async fn get_schedule_state(&self, id: i64) -> Result<Option<ScheduleState>, KeywardError> {
        queries::schedule::get_schedule_state(self.database()?, id).await
    }

    async fn recover_running(&self, now: DateTime<Utc>) -> Result<usize, KeywardError> {
        queries::schedule::recover_running(self.database()?, now).await
    }

    async fn schedule_state_counts(&self) -> Result<Vec<(TaskState, i64)>, KeywardError> {
        queries::schedule::schedule_state_counts(self.database()?).await
    }
}

#[async_trait]
impl CacheStore for SqliteStorage {
    async fn find_fresh_response(
        &self,
        url: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, KeywardError> {
        queries::cache::find_fresh_response(self.database()?, url, signature, now).await
    }

    async fn store_response(
        &self,
        url: &str,
        signature: &str,
        body: &str,
        cached_until: DateTime<Utc>,
    ) -> Result<CacheEntry, KeywardError> {
        queries::cache::store_response(self.database()?, url, signature, body, cached_until).await
    }

    async fn mark_error_displayed(&self, id: i64) -> Result<bool, KeywardError> {
        queries::cache::mark_error_displayed(self.database()?, id).await
    }

    async fn purge_expired_responses(&self, now: DateTime<Utc>) -> Result<usize, KeywardError> {
        queries::cache::purge_expired_responses(self.database()?, now).await
    }

    async fn cached_response_count(&self) -> Result<i64, KeywardError> {
        queries::cache::cached_response_count(self.database()?).await
    }
}

#[async_trait]
impl EntityStore for SqliteStorage {
    async fn get_character(&self, id: i64) -> Result<Option<Character>, KeywardError> {
        queries::characters::get_character(self.database()?, id).await
    }

    async fn characters_by_ids(&self, ids: &[i64]) -> Result<Vec<Character>, KeywardError> {
        queries::characters::characters_by_ids(self.database()?, ids).await
    }

    async fn upsert_character(&self, character: &Character) -> Result<(), KeywardError> {
        queries::characters::upsert_character(self.database()?, character).await
    }

    async fn get_or_create_corporation(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Corporation, KeywardError> {
        queries::characters::get_or_create_corporation(self.database()?, id, name).await
    }

    async fn corp_wallets(&self, corporation_id: i64) -> Result<Vec<CorpWallet>, KeywardError> {
        queries::lookups::corp_wallets(self.database()?, corporation_id).await
    }

    async fn items_by_ids(&self, ids: &[i64]) -> Result<Vec<Item>, KeywardError> {
        queries::lookups::items_by_ids(self.database()?, ids).await
    }

    async fn skills_by_ids(&self, ids: &[i64]) -> Result<Vec<Skill>, KeywardError> {
        queries::lookups::skills_by_ids(self.database()?, ids).await
    }

    async fn stations_by_ids(&self, ids: &[i64]) -> Result<Vec<Station>, KeywardError> {
        queries::lookups::stations_by_ids(self.database()?, ids).await
    }

    async fn save_character_sheet(&self, sheet: &CharacterSheet) -> Result<(), KeywardError> {
        queries::characters::save_character_sheet(self.database()?, sheet).await
    }

    async fn character_skills(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterSkill>, KeywardError> {
        queries::skills::character_skills(self.database()?, character_id).await
    }

    async fn apply_skill_changes(
        &self,
        changes: &Changeset<CharacterSkill>,
    ) -> Result<(), KeywardError> {
        queries::skills::apply_skill_changes(self.database()?, changes).await
    }

    async fn market_orders(&self, scope: OrderScope) -> Result<Vec<MarketOrder>, KeywardError> {
        queries::orders::market_orders(self.database()?, scope).await
    }

    async fn apply_order_changes(
        &self,
        changes: &Changeset<MarketOrder>,
        events: &[Event],
    ) -> Result<(), KeywardError> {
        queries::orders::apply_order_changes(self.database()?, changes, events).await
    }

    async fn skill_queue(&self, character_id: i64) -> Result<Vec<SkillQueueEntry>, KeywardError> {
        queries::skill_queue::skill_queue(self.database()?, character_id).await
    }

    async fn replace_skill_queue(
        &self,
        character_id: i64,
        entries: &[SkillQueueEntry],
    ) -> Result<(), KeywardError> {
        queries::skill_queue::replace_skill_queue(self.database()?, character_id, entries).await
    }

    async fn standings(&self, character_id: i64) -> Result<Vec<Standing>, KeywardError> {
        queries::standings::standings(self.database()?, character_id).await
    }

    async fn apply_standing_changes(
        &self,
        changes: &Changeset<Standing>,
    ) -> Result<(), KeywardError> {
        queries::standings::apply_standing_changes(self.database()?, changes).await
    }

    async fn events_for_owner(&self, owner_id: i64) -> Result<Vec<Event>, KeywardError> {
        queries::events::events_for_owner(self.database()?, owner_id).await
    }
}
