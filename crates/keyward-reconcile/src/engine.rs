// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic keyed diff between a remote and a local collection.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use keyward_core::Event;
use keyward_core::entities::Changeset;
use tracing::warn;

use crate::error::ReferenceError;
use crate::lookup::LookupCache;

/// What happens to a local item the remote set no longer mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Remove it, emitting the kind's removal event first.
    Delete,
    /// Keep it untouched.
    Retain,
}

/// Per-kind reconciliation rules.
pub trait Reconcile {
    type Remote;
    type Local: Clone;
    type Key: Eq + Hash + Clone;

    const REMOVAL: Removal;

    fn remote_key(&self, remote: &Self::Remote) -> Self::Key;

    fn local_key(&self, local: &Self::Local) -> Self::Key;

    /// Inactive remote items count as absent: they neither update nor
    /// create, so a matching local item falls into the removal branch.
    fn is_active(&self, _remote: &Self::Remote) -> bool {
        true
    }

    /// Copy significant fields from `remote` into `local`. Returns `true`
    /// when anything changed.
    fn update(&self, local: &mut Self::Local, remote: &Self::Remote) -> bool;

    fn create(
        &self,
        remote: &Self::Remote,
        lookups: &LookupCache,
    ) -> Result<Self::Local, ReferenceError>;

    fn removal_event(&self, _local: &Self::Local, _lookups: &LookupCache) -> Option<Event> {
        None
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub changes: Changeset<T>,
    pub events: Vec<Event>,
    /// Remote items dropped because a reference could not be resolved.
    pub skipped: Vec<ReferenceError>,
}

impl<T> Default for Reconciled<T> {
    fn default() -> Self {
        Self {
            changes: Changeset::default(),
            events: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Diff `remote` against `local` under the rules of `kind`.
///
/// Pure: nothing is persisted. Removed items keep their local order.
/// When the remote set repeats a key only its first occurrence counts.
pub fn reconcile<K: Reconcile>(
    kind: &K,
    remote: &[K::Remote],
    local: Vec<K::Local>,
    lookups: &LookupCache,
) -> Reconciled<K::Local> {
    let mut local = local;
    let index: HashMap<K::Key, usize> = local
        .iter()
        .enumerate()
        .map(|(i, item)| (kind.local_key(item), i))
        .collect();

    let mut seen: HashSet<K::Key> = HashSet::new();
    let mut out = Reconciled::default();

    for item in remote {
        if !kind.is_active(item) {
            continue;
        }
        let key = kind.remote_key(item);
        if seen.contains(&key) {
            continue;
        }

        match index.get(&key) {
            Some(&i) => {
                if kind.update(&mut local[i], item) {
                    out.changes.updated.push(local[i].clone());
                }
                seen.insert(key);
            }
            None => match kind.create(item, lookups) {
                Ok(created) => {
                    out.changes.created.push(created);
                    seen.insert(key);
                }
                Err(error) => {
                    warn!(%error, "skipping remote item");
                    out.skipped.push(error);
                }
            },
        }
    }

    if K::REMOVAL == Removal::Delete {
        for item in local {
            if seen.contains(&kind.local_key(&item)) {
                continue;
            }
            if let Some(event) = kind.removal_event(&item, lookups) {
                out.events.push(event);
            }
            out.changes.removed.push(item);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Toy kind: (id, value, active) remote tuples against (id, value) locals.
    struct Toy {
        removal: bool,
    }

    struct Deleting(Toy);
    struct Retaining(Toy);

    fn update(local: &mut (i64, i64), remote: &(i64, i64, bool)) -> bool {
        if local.1 == remote.1 {
            return false;
        }
        local.1 = remote.1;
        true
    }

    fn create(remote: &(i64, i64, bool)) -> Result<(i64, i64), ReferenceError> {
        if remote.1 < 0 {
            Err(ReferenceError::Item(remote.0))
        } else {
            Ok((remote.0, remote.1))
        }
    }

    impl Reconcile for Deleting {
        type Remote = (i64, i64, bool);
        type Local = (i64, i64);
        type Key = i64;
        const REMOVAL: Removal = Removal::Delete;

        fn remote_key(&self, remote: &Self::Remote) -> i64 {
            remote.0
        }
        fn local_key(&self, local: &Self::Local) -> i64 {
            local.0
        }
        fn is_active(&self, remote: &Self::Remote) -> bool {
            remote.2
        }
        fn update(&self, local: &mut Self::Local, remote: &Self::Remote) -> bool {
            update(local, remote)
        }
        fn create(&self, remote: &Self::Remote, _: &LookupCache) -> Result<Self::Local, ReferenceError> {
            create(remote)
        }
        fn removal_event(&self, local: &Self::Local, _: &LookupCache) -> Option<Event> {
            self.0.removal.then(|| Event {
                owner_id: 1,
                issued: Utc::now(),
                text: format!("{} gone", local.0),
            })
        }
    }

    impl Reconcile for Retaining {
        type Remote = (i64, i64, bool);
        type Local = (i64, i64);
        type Key = i64;
        const REMOVAL: Removal = Removal::Retain;

        fn remote_key(&self, remote: &Self::Remote) -> i64 {
            remote.0
        }
        fn local_key(&self, local: &Self::Local) -> i64 {
            local.0
        }
        fn update(&self, local: &mut Self::Local, remote: &Self::Remote) -> bool {
            update(local, remote)
        }
        fn create(&self, remote: &Self::Remote, _: &LookupCache) -> Result<Self::Local, ReferenceError> {
            create(remote)
        }
    }

    fn lookups() -> LookupCache {
        LookupCache::default()
    }

    #[test]
    fn update_create_delete() {
        let kind = Deleting(Toy { removal: true });
        let out = reconcile(
            &kind,
            &[(1, 15, true), (3, 30, true)],
            vec![(1, 10), (2, 20)],
            &lookups(),
        );
        assert_eq!(out.changes.updated, vec![(1, 15)]);
        assert_eq!(out.changes.created, vec![(3, 30)]);
        assert_eq!(out.changes.removed, vec![(2, 20)]);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].text, "2 gone");
    }

    #[test]
    fn unchanged_items_produce_nothing() {
        let kind = Deleting(Toy { removal: true });
        let out = reconcile(&kind, &[(1, 10, true)], vec![(1, 10)], &lookups());
        assert!(out.changes.is_empty());
        assert!(out.events.is_empty());
    }

    #[test]
    fn inactive_remote_item_triggers_removal() {
        let kind = Deleting(Toy { removal: true });
        let out = reconcile(&kind, &[(1, 99, false), (4, 40, false)], vec![(1, 10)], &lookups());
        assert_eq!(out.changes.removed, vec![(1, 10)]);
        assert!(out.changes.updated.is_empty());
        assert!(out.changes.created.is_empty(), "inactive items are never created");
    }

    #[test]
    fn reference_miss_skips_only_that_item() {
        let kind = Deleting(Toy { removal: false });
        let out = reconcile(&kind, &[(5, -1, true), (6, 60, true)], vec![], &lookups());
        assert_eq!(out.changes.created, vec![(6, 60)]);
        assert_eq!(out.skipped, vec![ReferenceError::Item(5)]);
    }

    #[test]
    fn removal_event_is_optional() {
        let kind = Deleting(Toy { removal: false });
        let out = reconcile(&kind, &[(5, -1, true)], vec![(7, 70)], &lookups());
        assert_eq!(out.changes.removed, vec![(7, 70)]);
        assert!(out.events.is_empty());
    }

    #[test]
    fn retained_kinds_never_remove() {
        let kind = Retaining(Toy { removal: true });
        let out = reconcile(&kind, &[(1, 11, true)], vec![(1, 10), (2, 20)], &lookups());
        assert_eq!(out.changes.updated, vec![(1, 11)]);
        assert!(out.changes.removed.is_empty());
    }

    #[test]
    fn duplicate_remote_keys_count_once() {
        let kind = Deleting(Toy { removal: true });
        let out = reconcile(&kind, &[(3, 30, true), (3, 31, true)], vec![], &lookups());
        assert_eq!(out.changes.created, vec![(3, 30)]);
    }
}
