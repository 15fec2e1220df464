// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job execution errors.

use keyward_core::KeywardError;
use keyward_fetch::{FailureKind, FetchFailure};

/// Why a job did not complete. Every variant ends in `Scheduler::fail`.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Storage(#[from] KeywardError),

    #[error("credential {0} no longer exists")]
    MissingCredential(i64),

    #[error("job for {endpoint} needs a character parameter")]
    MissingParameter { endpoint: keyward_core::Endpoint },
}

impl JobError {
    /// Failure class for logging; `None` for local faults.
    pub fn fetch_kind(&self) -> Option<FailureKind> {
        match self {
            JobError::Fetch(failure) => Some(failure.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_keep_their_kind() {
        let err = JobError::from(FetchFailure::Malformed {
            reason: "truncated".into(),
        });
        assert_eq!(err.fetch_kind(), Some(FailureKind::Malformed));
        assert_eq!(err.to_string(), "malformed response: truncated");

        assert_eq!(JobError::MissingCredential(4).fetch_kind(), None);
    }
}
