// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One logical remote call with error classification.

use std::sync::Arc;

use keyward_core::{Credential, CredentialStore, Endpoint, HttpTransport};
use tracing::{debug, error, warn};

use crate::cache::RequestCache;
use crate::envelope::ApiDocument;
use crate::error::FetchFailure;

/// Error codes that mean the key itself is unusable: authentication
/// rejected, key expired, revoked or lacking access.
const CREDENTIAL_ERROR_CODES: [u32; 10] = [202, 203, 204, 205, 207, 210, 212, 220, 222, 223];

/// Whether `code` permanently disables the credential that caused it.
pub fn is_credential_error(code: u32) -> bool {
    CREDENTIAL_ERROR_CODES.contains(&code)
}

/// Result of a successful fetch.
///
/// `document` is `None` when the remote answered with an empty body; the
/// caller completes the unit with the grace period only.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub document: Option<ApiDocument>,
    pub was_cached: bool,
}

#[derive(Clone)]
pub struct Fetcher {
    cache: RequestCache,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialStore>,
}

impl Fetcher {
    pub fn new(
        cache: RequestCache,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            cache,
            transport,
            credentials,
        }
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Fetch `endpoint` with `params`, adding `keyID`/`vCode` when `use_auth`.
    ///
    /// An error node in the document becomes [`FetchFailure::Application`]
    /// the first time it is seen for a cache entry and
    /// [`FetchFailure::Suppressed`] afterwards. Authentication codes
    /// invalidate the credential either way.
    pub async fn fetch(
        &self,
        credential: &Credential,
        endpoint: Endpoint,
        params: &[(String, String)],
        use_auth: bool,
    ) -> Result<FetchOutcome, FetchFailure> {
        let url = endpoint.path();
        let mut request: Vec<(String, String)> = params.to_vec();
        if use_auth {
            request.push(("keyID".to_string(), credential.key_id.to_string()));
            request.push(("vCode".to_string(), credential.v_code.clone()));
        }

        let transport = Arc::clone(&self.transport);
        let form = request.clone();
        let cached = self
            .cache
            .get_or_fetch(url, &request, move || async move {
                transport.post_form(url, &form).await
            })
            .await?;

        let Some(cached) = cached else {
            debug!(credential_id = credential.id, %endpoint, "no document returned");
            return Ok(FetchOutcome {
                document: None,
                was_cached: false,
            });
        };

        let Some(api_error) = cached.document.error.clone() else {
            return Ok(FetchOutcome {
                document: Some(cached.document),
                was_cached: cached.was_cached,
            });
        };

        let credential_invalidated = is_credential_error(api_error.code);
        if credential_invalidated {
            self.credentials.invalidate_credential(credential.id).await?;
            warn!(
                credential_id = credential.id,
                key_id = credential.key_id,
                code = api_error.code,
                "credential invalidated"
            );
        }

        if self.cache.report_error_once(&cached.entry).await? {
            error!(
                credential_id = credential.id,
                %endpoint,
                code = api_error.code,
                message = %api_error.message,
                "remote API error"
            );
            Err(FetchFailure::Application {
                code: api_error.code,
                message: api_error.message,
                credential_invalidated,
            })
        } else {
            debug!(
                credential_id = credential.id,
                %endpoint,
                code = api_error.code,
                "remote API error already reported"
            );
            Err(FetchFailure::Suppressed {
                code: api_error.code,
                credential_invalidated,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use keyward_core::KeyType;
    use keyward_test_utils::{ManualClock, MockTransport, TestHarness, envelope};
    use tracing_test::traced_test;

    struct Setup {
        harness: TestHarness,
        transport: Arc<MockTransport>,
        fetcher: Fetcher,
        credential: Credential,
    }

    async fn setup() -> Setup {
        let harness = TestHarness::new().await.unwrap();
        let credential = harness
            .seed_credential(1, 500, "secret", KeyType::Character, -1)
            .await
            .unwrap();
        let clock = Arc::new(ManualClock::at(envelope::t(12, 0, 0)));
        let transport = Arc::new(MockTransport::new());
        let cache = RequestCache::new(harness.storage(), clock);
        let fetcher = Fetcher::new(cache, transport.clone(), harness.storage());
        Setup {
            harness,
            transport,
            fetcher,
            credential,
        }
    }

    fn character_params() -> Vec<(String, String)> {
        vec![("characterID".to_string(), "90".to_string())]
    }

    #[tokio::test]
    async fn adds_credential_parameters() {
        let s = setup().await;
        s.transport
            .push_body(envelope::success(envelope::t(12, 0, 0), envelope::t(13, 0, 0), serde_json::json!({})))
            .await;

        let outcome = s
            .fetcher
            .fetch(&s.credential, Endpoint::SkillQueue, &character_params(), true)
            .await
            .unwrap();
        assert!(outcome.document.is_some());
        assert!(!outcome.was_cached);

        let requests = s.transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/char/SkillQueue.xml.aspx");
        assert!(requests[0].params.contains(&("keyID".into(), "500".into())));
        assert!(requests[0].params.contains(&("vCode".into(), "secret".into())));
    }

    #[tokio::test]
    async fn unauthenticated_fetch_sends_only_given_parameters() {
        let s = setup().await;
        s.transport
            .push_body(envelope::success(envelope::t(12, 0, 0), envelope::t(13, 0, 0), serde_json::json!({})))
            .await;

        s.fetcher
            .fetch(&s.credential, Endpoint::SkillQueue, &character_params(), false)
            .await
            .unwrap();
        assert_eq!(s.transport.requests().await[0].params, character_params());
    }

    #[tokio::test]
    async fn auth_error_invalidates_even_when_suppressed() {
        let s = setup().await;
        s.transport
            .push_body(envelope::error(envelope::t(12, 0, 0), envelope::t(13, 0, 0), 203, "Authentication failure."))
            .await;

        let first = s
            .fetcher
            .fetch(&s.credential, Endpoint::ApiKeyInfo, &[], true)
            .await
            .unwrap_err();
        assert_eq!(first.kind(), FailureKind::CredentialInvalidated);
        assert!(matches!(first, FetchFailure::Application { code: 203, .. }));

        let stored = s.harness.storage().get_credential(s.credential.id).await.unwrap().unwrap();
        assert!(!stored.valid);

        // Cached second hit: suppressed, still classified as invalidating.
        let second = s
            .fetcher
            .fetch(&s.credential, Endpoint::ApiKeyInfo, &[], true)
            .await
            .unwrap_err();
        assert!(matches!(
            second,
            FetchFailure::Suppressed {
                code: 203,
                credential_invalidated: true
            }
        ));
        assert_eq!(s.transport.requests().await.len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn transient_error_is_logged_once_and_keeps_credential() {
        let s = setup().await;
        s.transport
            .push_body(envelope::error(envelope::t(12, 0, 0), envelope::t(13, 0, 0), 221, "Illegal page request!"))
            .await;

        for _ in 0..3 {
            let err = s
                .fetcher
                .fetch(&s.credential, Endpoint::Standings, &character_params(), true)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::TransientApplication);
        }

        logs_assert(|lines: &[&str]| {
            let reported = lines
                .iter()
                .filter(|l| l.contains("ERROR") && l.contains("remote API error"))
                .count();
            if reported == 1 {
                Ok(())
            } else {
                Err(format!("expected one error report, saw {reported}"))
            }
        });

        let stored = s.harness.storage().get_credential(s.credential.id).await.unwrap().unwrap();
        assert!(stored.valid);
    }

    #[tokio::test]
    async fn empty_body_completes_without_document() {
        let s = setup().await;
        s.transport.push_body(String::new()).await;

        let outcome = s
            .fetcher
            .fetch(&s.credential, Endpoint::AccountStatus, &[], true)
            .await
            .unwrap();
        assert!(outcome.document.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_transport_failure() {
        let s = setup().await;
        s.transport.push_status(503, "down for maintenance").await;

        let err = s
            .fetcher
            .fetch(&s.credential, Endpoint::AccountStatus, &[], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn credential_code_set() {
        for code in [202, 203, 204, 205, 207, 210, 212, 220, 222, 223] {
            assert!(is_credential_error(code), "{code}");
        }
        for code in [200, 206, 211, 221, 500, 902] {
            assert!(!is_credential_error(code), "{code}");
        }
    }
}
