// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per table family.
//!
//! Timestamps are stored as fixed-width UTC text so that string comparison in
//! SQL matches chronological order.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

pub mod cache;
pub mod characters;
pub mod credentials;
pub mod events;
pub mod lookups;
pub mod orders;
pub mod queue;
pub mod schedule;
pub mod skill_queue;
pub mod skills;
pub mod standings;

const DB_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(crate) fn to_db_time(dt: &DateTime<Utc>) -> String {
    dt.format(DB_TIME_FORMAT).to_string()
}

pub(crate) fn parse_db_time(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DB_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_time(idx, &raw)
}

pub(crate) fn get_optional_time(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_db_time(idx, &s)).transpose()
}

/// Parse a text column through `FromStr` (strum-derived enums).
pub(crate) fn get_parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?1, ?2, ...` for an `IN (...)` list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn db_time_is_fixed_width_and_sortable() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 11, 2, 3, 4, 5).unwrap();
        let a = to_db_time(&early);
        let b = to_db_time(&late);
        assert_eq!(a, "2026-01-02T03:04:05.000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_db_time(0, &a).unwrap(), early);
    }

    #[test]
    fn placeholders_are_numbered() {
        assert_eq!(placeholders(3), "?1, ?2, ?3");
        assert_eq!(placeholders(1), "?1");
    }
}
