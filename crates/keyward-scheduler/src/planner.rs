// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Which units a credential needs polled.

use std::collections::HashSet;

use keyward_core::{CredentialIdentity, CredentialScope, Endpoint, KeyType};

/// One independently schedulable piece of work for a credential identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub endpoint: Endpoint,
    /// Character id for per-character endpoints, `0` otherwise.
    pub parameter: i64,
}

impl Unit {
    fn keyed(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            parameter: 0,
        }
    }

    pub fn url(&self) -> &'static str {
        self.endpoint.path()
    }

    /// The parameter carried on the dispatched job.
    pub fn job_parameter(&self) -> Option<i64> {
        (self.parameter != 0).then_some(self.parameter)
    }
}

/// Units for one credential.
///
/// Every credential gets the key-info unit. Until its key type is known
/// nothing else is planned. Account and character keys get the masked
/// character endpoints; account status only once per key and only when
/// characters are linked. Corporation keys get their masked endpoints
/// against the corp character.
pub fn plan_units(scope: &CredentialScope) -> Vec<Unit> {
    let credential = &scope.credential;
    let mut units = vec![Unit::keyed(Endpoint::ApiKeyInfo)];

    let granted = |endpoint: Endpoint| {
        endpoint
            .required_mask()
            .is_none_or(|mask| credential.grants(mask))
    };

    match credential.key_type {
        Some(KeyType::Account | KeyType::Character) => {
            for endpoint in Endpoint::CHARACTER {
                if !granted(endpoint) || scope.character_ids.is_empty() {
                    continue;
                }
                if endpoint.per_character() {
                    units.extend(scope.character_ids.iter().map(|&id| Unit {
                        endpoint,
                        parameter: id,
                    }));
                } else {
                    units.push(Unit::keyed(endpoint));
                }
            }
        }
        Some(KeyType::Corporation) => {
            if let Some(corp_character) = credential.corp_character_id {
                units.extend(
                    Endpoint::CORPORATION
                        .into_iter()
                        .filter(|&endpoint| granted(endpoint))
                        .map(|endpoint| Unit {
                            endpoint,
                            parameter: corp_character,
                        }),
                );
            }
        }
        None => {}
    }

    units
}

/// Collapse credential rows sharing a key to one scope per identity.
/// The lowest credential id wins; input is expected in id order.
pub fn unique_identities(scopes: Vec<CredentialScope>) -> Vec<(CredentialIdentity, CredentialScope)> {
    let mut seen = HashSet::new();
    scopes
        .into_iter()
        .filter_map(|scope| {
            let identity = scope.credential.identity();
            seen.insert(identity.clone()).then_some((identity, scope))
        })
        .collect()
}
