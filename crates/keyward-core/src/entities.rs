// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted entity collections that jobs reconcile against remote data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::KeyType;

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub corporation_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Corporation {
    pub id: i64,
    pub name: String,
}

/// A corporation wallet division, addressed by the remote `accountKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpWallet {
    pub id: i64,
    pub corporation_id: i64,
    pub account_key: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
}

/// A trainable skill; `id` is the skill's item type id.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub short_name: String,
}

/// The five character attributes, also used for implant bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub charisma: i32,
    pub intelligence: i32,
    pub memory: i32,
    pub perception: i32,
    pub willpower: i32,
}

/// Scalar character-sheet data stored on the character row.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSheet {
    pub character_id: i64,
    pub wallet_balance: f64,
    pub attributes: Attributes,
    pub bonuses: Attributes,
    pub clone_name: String,
    pub clone_skill_points: i64,
}

/// Fields written back to a credential after a credential-info fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInfoUpdate {
    pub access_mask: i64,
    pub key_type: KeyType,
    pub expires: Option<DateTime<Utc>>,
    /// Set for corporation keys only.
    pub corp_character_id: Option<i64>,
}

/// Which market orders a reconciliation pass owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// Personal orders placed by one character.
    Character(i64),
    /// Orders placed from any wallet of one corporation.
    Corporation(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrder {
    /// Remote order id, the stable identity key.
    pub order_id: i64,
    pub character_id: i64,
    /// `Some` for corporate orders.
    pub corporation_id: Option<i64>,
    pub corp_wallet_id: Option<i64>,
    pub station_id: i64,
    pub item_id: i64,
    pub buy_order: bool,
    pub escrow: f64,
    pub price: f64,
    pub total_price: f64,
    pub volume_entered: i64,
    pub volume_remaining: i64,
    pub minimum_volume: i64,
    pub issued: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSkill {
    pub character_id: i64,
    pub skill_id: i64,
    pub points: i64,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillQueueEntry {
    pub character_id: i64,
    pub position: i32,
    pub skill_id: i64,
    pub to_level: i32,
    pub start_sp: i64,
    pub end_sp: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum StandingKind {
    Corporation,
    Faction,
}

/// A character's standing towards an NPC corporation or faction.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub character_id: i64,
    pub kind: StandingKind,
    pub from_id: i64,
    pub from_name: String,
    pub value: f64,
}

/// Creates, updates and deletes produced by one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset<T> {
    pub created: Vec<T>,
    pub updated: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for Changeset<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> Changeset<T> {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}
