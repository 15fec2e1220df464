// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shapes of the remote `result` payloads, plus serde helpers for the
//! API date format.

use chrono::{DateTime, Utc};
use keyward_core::time::{parse_api_date, parse_optional_api_date};
use serde::{Deserialize, Deserializer};

pub fn api_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_api_date(&raw).map_err(serde::de::Error::custom)
}

pub fn optional_api_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(raw) => parse_optional_api_date(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Remote `orderState` for an order still on the market.
pub const ORDER_STATE_OPEN: i32 = 0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteOrder {
    #[serde(rename = "orderID")]
    pub order_id: i64,
    #[serde(rename = "charID")]
    pub character_id: i64,
    #[serde(rename = "stationID")]
    pub station_id: i64,
    #[serde(rename = "volEntered")]
    pub volume_entered: i64,
    #[serde(rename = "volRemaining")]
    pub volume_remaining: i64,
    #[serde(rename = "minVolume")]
    pub minimum_volume: i64,
    #[serde(rename = "orderState")]
    pub order_state: i32,
    #[serde(rename = "typeID")]
    pub item_id: i64,
    #[serde(rename = "accountKey", default)]
    pub account_key: i64,
    /// Lifetime in days.
    pub duration: i64,
    pub escrow: f64,
    pub price: f64,
    /// `true` for buy orders.
    pub bid: bool,
    #[serde(deserialize_with = "api_date")]
    pub issued: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResult {
    #[serde(default)]
    pub orders: Vec<RemoteOrder>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteSkill {
    #[serde(rename = "typeID")]
    pub skill_id: i64,
    #[serde(rename = "skillpoints")]
    pub points: i64,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQueueEntry {
    #[serde(default)]
    pub queue_position: Option<i32>,
    #[serde(rename = "typeID")]
    pub skill_id: i64,
    pub level: i32,
    #[serde(rename = "startSP")]
    pub start_sp: i64,
    #[serde(rename = "endSP")]
    pub end_sp: i64,
    /// Empty while training is paused.
    #[serde(default, deserialize_with = "optional_api_date")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_api_date")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillQueueResult {
    #[serde(default)]
    pub queue: Vec<RemoteQueueEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteStanding {
    #[serde(rename = "fromID")]
    pub from_id: i64,
    #[serde(rename = "fromName", default)]
    pub from_name: String,
    pub standing: f64,
}

/// NPC standings grouped by source. Agent standings are not tracked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpcStandings {
    #[serde(rename = "NPCCorporations", default)]
    pub npc_corporations: Vec<RemoteStanding>,
    #[serde(default)]
    pub factions: Vec<RemoteStanding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsResult {
    #[serde(rename = "characterNPCStandings", default)]
    pub standings: NpcStandings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_row_from_json() {
        let row: RemoteOrder = serde_json::from_value(json!({
            "orderID": 1, "charID": 90, "stationID": 60003760, "volEntered": 10,
            "volRemaining": 4, "minVolume": 1, "orderState": 0, "typeID": 34,
            "accountKey": 1000, "duration": 90, "escrow": 0.0, "price": 5.5,
            "bid": false, "issued": "2026-03-01 10:00:00", "range": 32767
        }))
        .unwrap();
        assert_eq!(row.order_id, 1);
        assert_eq!(row.issued.to_string(), "2026-03-01 10:00:00 UTC");
        assert!(!row.bid);
    }

    #[test]
    fn paused_queue_entry_has_no_times() {
        let row: RemoteQueueEntry = serde_json::from_value(json!({
            "queuePosition": 1, "typeID": 3300, "level": 4, "startSP": 1, "endSP": 2,
            "startTime": "", "endTime": ""
        }))
        .unwrap();
        assert!(row.start_time.is_none());
        assert!(row.end_time.is_none());
    }

    #[test]
    fn agent_standings_are_ignored() {
        let result: StandingsResult = serde_json::from_value(json!({
            "characterNPCStandings": {
                "agents": [{"fromID": 1, "fromName": "Agent", "standing": 1.0}],
                "factions": [{"fromID": 500001, "fromName": "Caldari State", "standing": 2.5}]
            }
        }))
        .unwrap();
        assert!(result.standings.npc_corporations.is_empty());
        assert_eq!(result.standings.factions.len(), 1);
    }
}
