// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// A remote item referenced something keyward does not know about.
///
/// Never fatal: the offending item is skipped and the pass continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unknown item #{0}")]
    Item(i64),

    #[error("unknown skill #{0}")]
    Skill(i64),

    #[error("unknown station #{0}")]
    Station(i64),

    #[error("unknown character #{0}")]
    Character(i64),
}
