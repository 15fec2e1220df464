// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use keyward_core::Clock;

/// A clock pinned to a given instant.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::t;

    #[test]
    fn moves_only_when_told() {
        let clock = ManualClock::at(t(12, 0, 0));
        assert_eq!(clock.now(), t(12, 0, 0));
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), t(12, 0, 30));
        clock.set(t(9, 0, 0));
        assert_eq!(clock.now(), t(9, 0, 0));
    }
}
