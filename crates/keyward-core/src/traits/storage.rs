// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits.
//!
//! The scheduler, request cache and reconciliation jobs each depend only on
//! the slice of persistence they use. The SQLite backend implements them all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Changeset, CharacterSheet, CharacterSkill, Character, CorpWallet, Corporation, Item,
    KeyInfoUpdate, MarketOrder, OrderScope, Skill, SkillQueueEntry, Standing, Station,
};
use crate::error::KeywardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    CacheEntry, Credential, CredentialIdentity, CredentialScope, Event, ScheduleState, TaskState,
};

/// Lifecycle of a storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), KeywardError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), KeywardError>;
}

/// Credential records. Owned externally; the core only updates them.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All valid credentials with the characters linked to each.
    async fn schedulable_credentials(&self) -> Result<Vec<CredentialScope>, KeywardError>;

    async fn get_credential(&self, id: i64) -> Result<Option<Credential>, KeywardError>;

    /// Flip the validity flag off. Persisted immediately.
    async fn invalidate_credential(&self, id: i64) -> Result<(), KeywardError>;

    async fn update_key_info(&self, id: i64, update: &KeyInfoUpdate) -> Result<(), KeywardError>;

    async fn set_paid_until(
        &self,
        id: i64,
        paid_until: Option<DateTime<Utc>>,
    ) -> Result<(), KeywardError>;

    /// Replace the linked character set of every credential sharing this key.
    async fn link_characters(
        &self,
        key_id: i64,
        v_code: &str,
        character_ids: &[i64],
    ) -> Result<(), KeywardError>;
}

/// Per-unit schedule bookkeeping.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Every schedule state belonging to the given identities.
    async fn schedule_states(
        &self,
        identities: &[CredentialIdentity],
    ) -> Result<Vec<ScheduleState>, KeywardError>;

    /// Create the unit in QUEUED with `next_time = now` unless it already
    /// exists. Returns the stored row and whether this call created it.
    async fn ensure_schedule_state(
        &self,
        identity: &CredentialIdentity,
        url: &str,
        parameter: i64,
        now: DateTime<Utc>,
    ) -> Result<(ScheduleState, bool), KeywardError>;

    /// Compare-and-set into RUNNING. Succeeds only when the unit is not
    /// RUNNING and `next_time <= now`; exactly one concurrent caller wins.
    async fn claim_schedule_state(&self, id: i64, now: DateTime<Utc>)
    -> Result<bool, KeywardError>;

    /// Move the unit to READY. `next_time` never moves backwards.
    async fn release_schedule_state(
        &self,
        id: i64,
        now: DateTime<Utc>,
        next_time: DateTime<Utc>,
    ) -> Result<(), KeywardError>;

    async fn get_schedule_state(&self, id: i64) -> Result<Option<ScheduleState>, KeywardError>;

    /// Reset every RUNNING unit to READY and due now. Returns how many were reset.
    async fn recover_running(&self, now: DateTime<Utc>) -> Result<usize, KeywardError>;

    async fn schedule_state_counts(&self) -> Result<Vec<(TaskState, i64)>, KeywardError>;
}

/// Response cache rows.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The entry for this signature if `cached_until > now`.
    async fn find_fresh_response(
        &self,
        url: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, KeywardError>;

    /// Insert or overwrite (last write wins) the entry for this signature.
    /// The error flag survives an overwrite only within the same expiry window.
    async fn store_response(
        &self,
        url: &str,
        signature: &str,
        body: &str,
        cached_until: DateTime<Utc>,
    ) -> Result<CacheEntry, KeywardError>;

    /// Set `error_displayed`. Returns `true` only for the caller that flipped it.
    async fn mark_error_displayed(&self, id: i64) -> Result<bool, KeywardError>;

    async fn purge_expired_responses(&self, now: DateTime<Utc>) -> Result<usize, KeywardError>;

    async fn cached_response_count(&self) -> Result<i64, KeywardError>;
}

/// Entity collections and reference tables.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_character(&self, id: i64) -> Result<Option<Character>, KeywardError>;

    async fn characters_by_ids(&self, ids: &[i64]) -> Result<Vec<Character>, KeywardError>;

    /// Insert the character or refresh its name and corporation.
    async fn upsert_character(&self, character: &Character) -> Result<(), KeywardError>;

    /// Fetch the corporation, creating it with `name` when missing.
    async fn get_or_create_corporation(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Corporation, KeywardError>;

    async fn corp_wallets(&self, corporation_id: i64) -> Result<Vec<CorpWallet>, KeywardError>;

    async fn items_by_ids(&self, ids: &[i64]) -> Result<Vec<Item>, KeywardError>;

    async fn skills_by_ids(&self, ids: &[i64]) -> Result<Vec<Skill>, KeywardError>;

    async fn stations_by_ids(&self, ids: &[i64]) -> Result<Vec<Station>, KeywardError>;

    async fn save_character_sheet(&self, sheet: &CharacterSheet) -> Result<(), KeywardError>;

    async fn character_skills(&self, character_id: i64)
    -> Result<Vec<CharacterSkill>, KeywardError>;

    async fn apply_skill_changes(
        &self,
        changes: &Changeset<CharacterSkill>,
    ) -> Result<(), KeywardError>;

    async fn market_orders(&self, scope: OrderScope) -> Result<Vec<MarketOrder>, KeywardError>;

    /// Apply creates, updates and deletes plus the removal events atomically.
    async fn apply_order_changes(
        &self,
        changes: &Changeset<MarketOrder>,
        events: &[Event],
    ) -> Result<(), KeywardError>;

    async fn skill_queue(&self, character_id: i64) -> Result<Vec<SkillQueueEntry>, KeywardError>;

    /// Delete the character's queue and insert `entries` in one transaction.
    async fn replace_skill_queue(
        &self,
        character_id: i64,
        entries: &[SkillQueueEntry],
    ) -> Result<(), KeywardError>;

    async fn standings(&self, character_id: i64) -> Result<Vec<Standing>, KeywardError>;

    async fn apply_standing_changes(
        &self,
        changes: &Changeset<Standing>,
    ) -> Result<(), KeywardError>;

    async fn events_for_owner(&self, owner_id: i64) -> Result<Vec<Event>, KeywardError>;
}
