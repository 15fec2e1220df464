// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pass-scoped memo of reference rows.
//!
//! A [`LookupCache`] lives for one reconciliation pass. It is primed
//! asynchronously from the store, then read synchronously by
//! [`Reconcile::create`](crate::Reconcile::create) and removal events.
//! Misses are remembered too, so an unknown id is queried once per pass.

use std::collections::{BTreeSet, HashMap};

use keyward_core::entities::{CorpWallet, Character, Corporation, Item, Skill, Station};
use keyward_core::{EntityStore, KeywardError};

use crate::error::ReferenceError;

#[derive(Debug, Default)]
pub struct LookupCache {
    items: HashMap<i64, Option<Item>>,
    skills: HashMap<i64, Option<Skill>>,
    stations: HashMap<i64, Option<Station>>,
    characters: HashMap<i64, Option<Character>>,
    corporations: HashMap<i64, Corporation>,
    /// corporation id -> account key -> wallet
    wallets: HashMap<i64, HashMap<i64, CorpWallet>>,
}

/// Ids not yet looked up, deduplicated.
fn missing<T>(known: &HashMap<i64, Option<T>>, ids: &[i64]) -> Vec<i64> {
    ids.iter()
        .copied()
        .filter(|id| !known.contains_key(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn fill<T>(known: &mut HashMap<i64, Option<T>>, requested: &[i64], found: Vec<T>, id: fn(&T) -> i64) {
    for id in requested {
        known.insert(*id, None);
    }
    for row in found {
        known.insert(id(&row), Some(row));
    }
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_items(&mut self, store: &dyn EntityStore, ids: &[i64]) -> Result<(), KeywardError> {
        let missing = missing(&self.items, ids);
        if !missing.is_empty() {
            let found = store.items_by_ids(&missing).await?;
            fill(&mut self.items, &missing, found, |i| i.id);
        }
        Ok(())
    }

    pub async fn load_skills(&mut self, store: &dyn EntityStore, ids: &[i64]) -> Result<(), KeywardError> {
        let missing = missing(&self.skills, ids);
        if !missing.is_empty() {
            let found = store.skills_by_ids(&missing).await?;
            fill(&mut self.skills, &missing, found, |s| s.id);
        }
        Ok(())
    }

    pub async fn load_stations(
        &mut self,
        store: &dyn EntityStore,
        ids: &[i64],
    ) -> Result<(), KeywardError> {
        let missing = missing(&self.stations, ids);
        if !missing.is_empty() {
            let found = store.stations_by_ids(&missing).await?;
            fill(&mut self.stations, &missing, found, |s| s.id);
        }
        Ok(())
    }

    pub async fn load_characters(
        &mut self,
        store: &dyn EntityStore,
        ids: &[i64],
    ) -> Result<(), KeywardError> {
        let missing = missing(&self.characters, ids);
        if !missing.is_empty() {
            let found = store.characters_by_ids(&missing).await?;
            fill(&mut self.characters, &missing, found, |c| c.id);
        }
        Ok(())
    }

    pub async fn load_wallets(
        &mut self,
        store: &dyn EntityStore,
        corporation_id: i64,
    ) -> Result<(), KeywardError> {
        if !self.wallets.contains_key(&corporation_id) {
            let wallets = store.corp_wallets(corporation_id).await?;
            self.wallets.insert(
                corporation_id,
                wallets.into_iter().map(|w| (w.account_key, w)).collect(),
            );
        }
        Ok(())
    }

    /// Resolve a corporation, creating it on first sight.
    pub async fn corporation(
        &mut self,
        store: &dyn EntityStore,
        id: i64,
        name: &str,
    ) -> Result<Corporation, KeywardError> {
        if let Some(corporation) = self.corporations.get(&id) {
            return Ok(corporation.clone());
        }
        let corporation = store.get_or_create_corporation(id, name).await?;
        self.corporations.insert(id, corporation.clone());
        Ok(corporation)
    }

    pub fn item(&self, id: i64) -> Result<&Item, ReferenceError> {
        self.items.get(&id).and_then(Option::as_ref).ok_or(ReferenceError::Item(id))
    }

    pub fn skill(&self, id: i64) -> Result<&Skill, ReferenceError> {
        self.skills.get(&id).and_then(Option::as_ref).ok_or(ReferenceError::Skill(id))
    }

    pub fn station(&self, id: i64) -> Result<&Station, ReferenceError> {
        self.stations
            .get(&id)
            .and_then(Option::as_ref)
            .ok_or(ReferenceError::Station(id))
    }

    pub fn character(&self, id: i64) -> Result<&Character, ReferenceError> {
        self.characters
            .get(&id)
            .and_then(Option::as_ref)
            .ok_or(ReferenceError::Character(id))
    }

    pub fn wallet(&self, corporation_id: i64, account_key: i64) -> Option<&CorpWallet> {
        self.wallets.get(&corporation_id)?.get(&account_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_test_utils::TestHarness;

    #[tokio::test]
    async fn misses_are_memoized_and_reported() {
        let harness = TestHarness::new().await.unwrap();
        harness.seed_item(34, "Tritanium").await.unwrap();
        let store = harness.storage();

        let mut lookups = LookupCache::new();
        lookups.load_items(store.as_ref(), &[34, 35, 34]).await.unwrap();
        assert_eq!(lookups.item(34).unwrap().name, "Tritanium");
        assert_eq!(lookups.item(35), Err(ReferenceError::Item(35)));

        // Seeding afterwards does not change the pass's view.
        harness.seed_item(35, "Pyerite").await.unwrap();
        lookups.load_items(store.as_ref(), &[35]).await.unwrap();
        assert!(lookups.item(35).is_err());

        // A fresh pass sees it.
        let mut next = LookupCache::new();
        next.load_items(store.as_ref(), &[35]).await.unwrap();
        assert_eq!(next.item(35).unwrap().name, "Pyerite");
    }

    #[tokio::test]
    async fn corporations_are_created_once() {
        let harness = TestHarness::new().await.unwrap();
        let store = harness.storage();
        let mut lookups = LookupCache::new();

        let first = lookups.corporation(store.as_ref(), 98000001, "Test Corp").await.unwrap();
        let second = lookups.corporation(store.as_ref(), 98000001, "Renamed").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "Test Corp");
    }

    #[tokio::test]
    async fn wallets_by_account_key() {
        let harness = TestHarness::new().await.unwrap();
        harness.seed_character(90, "Director", Some((500, "Corp"))).await.unwrap();
        harness.seed_corp_wallet(1, 500, 1000).await.unwrap();
        let store = harness.storage();

        let mut lookups = LookupCache::new();
        lookups.load_wallets(store.as_ref(), 500).await.unwrap();
        assert_eq!(lookups.wallet(500, 1000).map(|w| w.id), Some(1));
        assert!(lookups.wallet(500, 1001).is_none());
    }
}
