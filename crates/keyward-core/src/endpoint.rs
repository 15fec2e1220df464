// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalogue of remote endpoints and the queue classes that carry them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Access-mask bits granted to a credential by the remote service.
pub mod mask {
    pub const CHARACTER_SHEET: i64 = 8;
    pub const MARKET_ORDERS: i64 = 4096;
    pub const SKILL_QUEUE: i64 = 262_144;
    pub const STANDINGS: i64 = 524_288;
    pub const ACCOUNT_STATUS: i64 = 33_554_432;
}

/// Coarse priority/rate bucket a job is dispatched to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum QueueClass {
    /// Always-polled, low-volume work (credential info).
    #[strum(serialize = "api_low")]
    Low,
    /// Per-character and per-corporation endpoint work.
    #[strum(serialize = "api_medium")]
    Medium,
}

impl QueueClass {
    pub const ALL: [QueueClass; 2] = [QueueClass::Low, QueueClass::Medium];
}

/// A remote endpoint the scheduler knows how to poll.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Endpoint {
    ApiKeyInfo,
    AccountStatus,
    CharacterSheet,
    CharacterMarketOrders,
    SkillQueue,
    Standings,
    CorporationMarketOrders,
}

impl Endpoint {
    /// Endpoints planned for account and character keys, in mask order.
    pub const CHARACTER: [Endpoint; 5] = [
        Endpoint::AccountStatus,
        Endpoint::CharacterSheet,
        Endpoint::CharacterMarketOrders,
        Endpoint::SkillQueue,
        Endpoint::Standings,
    ];

    /// Endpoints planned for corporation keys.
    pub const CORPORATION: [Endpoint; 1] = [Endpoint::CorporationMarketOrders];

    /// Request path relative to the API host.
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::ApiKeyInfo => "/account/APIKeyInfo.xml.aspx",
            Endpoint::AccountStatus => "/account/AccountStatus.xml.aspx",
            Endpoint::CharacterSheet => "/char/CharacterSheet.xml.aspx",
            Endpoint::CharacterMarketOrders => "/char/MarketOrders.xml.aspx",
            Endpoint::SkillQueue => "/char/SkillQueue.xml.aspx",
            Endpoint::Standings => "/char/Standings.xml.aspx",
            Endpoint::CorporationMarketOrders => "/corp/MarketOrders.xml.aspx",
        }
    }

    pub const fn queue(self) -> QueueClass {
        match self {
            Endpoint::ApiKeyInfo => QueueClass::Low,
            _ => QueueClass::Medium,
        }
    }

    /// Access-mask bit the credential must hold, `None` for unconditional endpoints.
    pub const fn required_mask(self) -> Option<i64> {
        match self {
            Endpoint::ApiKeyInfo => None,
            Endpoint::AccountStatus => Some(mask::ACCOUNT_STATUS),
            Endpoint::CharacterSheet => Some(mask::CHARACTER_SHEET),
            Endpoint::CharacterMarketOrders | Endpoint::CorporationMarketOrders => {
                Some(mask::MARKET_ORDERS)
            }
            Endpoint::SkillQueue => Some(mask::SKILL_QUEUE),
            Endpoint::Standings => Some(mask::STANDINGS),
        }
    }

    /// Whether one unit is planned per character (otherwise once per key).
    ///
    /// Per-character endpoints also send the character as `characterID`.
    pub const fn per_character(self) -> bool {
        !matches!(self, Endpoint::ApiKeyInfo | Endpoint::AccountStatus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn only_key_info_rides_the_low_queue() {
        assert_eq!(Endpoint::ApiKeyInfo.queue(), QueueClass::Low);
        for endpoint in Endpoint::CHARACTER.iter().chain(Endpoint::CORPORATION.iter()) {
            assert_eq!(endpoint.queue(), QueueClass::Medium, "{endpoint}");
        }
    }

    #[test]
    fn queue_class_names() {
        assert_eq!(QueueClass::Low.to_string(), "api_low");
        assert_eq!(QueueClass::from_str("api_medium").unwrap(), QueueClass::Medium);
    }

    #[test]
    fn endpoint_names_round_trip() {
        for endpoint in Endpoint::CHARACTER {
            assert_eq!(Endpoint::from_str(&endpoint.to_string()).unwrap(), endpoint);
        }
    }

    #[test]
    fn account_status_is_once_per_key() {
        assert!(!Endpoint::AccountStatus.per_character());
        assert!(Endpoint::Standings.per_character());
        assert!(Endpoint::CorporationMarketOrders.per_character());
    }

    #[test]
    fn key_info_needs_no_mask() {
        assert_eq!(Endpoint::ApiKeyInfo.required_mask(), None);
        assert_eq!(
            Endpoint::CorporationMarketOrders.required_mask(),
            Endpoint::CharacterMarketOrders.required_mask()
        );
    }
}
