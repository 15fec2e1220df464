// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduling pass and the per-unit completion callbacks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use keyward_config::model::{MAX_GRACE_PERIOD_SECS, SchedulerConfig};
use keyward_core::{
    Clock, CredentialIdentity, CredentialStore, JobDispatcher, JobRequest, KeywardError,
    ScheduleState, ScheduleStore,
};
use keyward_fetch::ApiDocument;
use tracing::{debug, error, info};

use crate::planner::{Unit, plan_units, unique_identities};

/// Counts from one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Distinct credential identities considered.
    pub identities: usize,
    pub units: usize,
    /// Units seen for the first time.
    pub created: usize,
    pub dispatched: usize,
    /// Units not yet eligible or already running.
    pub not_due: usize,
    /// Due units another pass claimed first.
    pub raced: usize,
    /// Units skipped because storage or the queue returned an error.
    pub failed: usize,
}

impl PassReport {
    fn record(&mut self, outcome: UnitOutcome) {
        if outcome.created {
            self.created += 1;
        }
        match outcome.step {
            Step::NotDue => self.not_due += 1,
            Step::Raced => self.raced += 1,
            Step::Dispatched => self.dispatched += 1,
        }
    }
}

struct UnitOutcome {
    created: bool,
    step: Step,
}

enum Step {
    NotDue,
    Raced,
    Dispatched,
}

/// `now + window + grace`, or `now + grace` when there is no window.
pub fn next_eligible(now: DateTime<Utc>, window: Option<Duration>, grace: Duration) -> DateTime<Utc> {
    now + window.unwrap_or_else(Duration::zero) + grace
}

/// The configured grace period, capped at [`MAX_GRACE_PERIOD_SECS`].
fn grace_period(config: &SchedulerConfig) -> Duration {
    Duration::seconds(config.grace_period_secs.min(MAX_GRACE_PERIOD_SECS) as i64)
}

pub struct Scheduler {
    credentials: Arc<dyn CredentialStore>,
    schedule: Arc<dyn ScheduleStore>,
    dispatcher: Arc<dyn JobDispatcher>,
    clock: Arc<dyn Clock>,
    grace: Duration,
}

impl Scheduler {
    pub fn new(
        config: &SchedulerConfig,
        credentials: Arc<dyn CredentialStore>,
        schedule: Arc<dyn ScheduleStore>,
        dispatcher: Arc<dyn JobDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            schedule,
            dispatcher,
            clock,
            grace: grace_period(config),
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Plan every valid credential's units and dispatch the due ones.
    ///
    /// An error on one unit is logged and counted in [`PassReport::failed`];
    /// only failing to load credentials or schedule states aborts the pass.
    ///
    /// Safe to run concurrently with itself: the RUNNING transition is a
    /// compare-and-set, so each due unit is dispatched by exactly one pass.
    pub async fn run_pass(&self) -> Result<PassReport, KeywardError> {
        let now = self.clock.now();
        let scopes = unique_identities(self.credentials.schedulable_credentials().await?);

        let identities: Vec<CredentialIdentity> = scopes.iter().map(|(id, _)| id.clone()).collect();
        let mut known: HashMap<(CredentialIdentity, String, i64), ScheduleState> = self
            .schedule
            .schedule_states(&identities)
            .await?
            .into_iter()
            .map(|s| ((s.identity.clone(), s.url.clone(), s.parameter), s))
            .collect();

        let mut report = PassReport {
            identities: scopes.len(),
            ..PassReport::default()
        };

        for (identity, scope) in &scopes {
            for unit in plan_units(scope) {
                report.units += 1;
                let stored = known.remove(&(identity.clone(), unit.url().to_string(), unit.parameter));
                match self.schedule_unit(identity, scope.credential.id, unit, stored, now).await {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        error!(
                            credential_id = scope.credential.id,
                            endpoint = %unit.endpoint,
                            parameter = unit.parameter,
                            error = %e,
                            "scheduling unit failed"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            identities = report.identities,
            units = report.units,
            dispatched = report.dispatched,
            created = report.created,
            raced = report.raced,
            failed = report.failed,
            "scheduling pass complete"
        );
        Ok(report)
    }

    async fn schedule_unit(
        &self,
        identity: &CredentialIdentity,
        credential_id: i64,
        unit: Unit,
        stored: Option<ScheduleState>,
        now: DateTime<Utc>,
    ) -> Result<UnitOutcome, KeywardError> {
        let (state, created) = match stored {
            Some(state) => (state, false),
            None => {
                self.schedule
                    .ensure_schedule_state(identity, unit.url(), unit.parameter, now)
                    .await?
            }
        };

        if !state.is_due(now) {
            return Ok(UnitOutcome { created, step: Step::NotDue });
        }
        if !self.schedule.claim_schedule_state(state.id, now).await? {
            debug!(state_id = state.id, endpoint = %unit.endpoint, "unit claimed elsewhere");
            return Ok(UnitOutcome { created, step: Step::Raced });
        }

        self.dispatch(credential_id, &state, unit, now).await?;
        Ok(UnitOutcome { created, step: Step::Dispatched })
    }

    async fn dispatch(
        &self,
        credential_id: i64,
        state: &ScheduleState,
        unit: Unit,
        now: DateTime<Utc>,
    ) -> Result<(), KeywardError> {
        let job = JobRequest {
            endpoint: unit.endpoint,
            credential_id,
            state_id: state.id,
            parameter: unit.job_parameter(),
        };
        if let Err(e) = self.dispatcher.enqueue(&job, unit.endpoint.queue()).await {
            // Nothing will call back for this unit; hand it back to the next pass.
            error!(state_id = state.id, error = %e, "enqueue failed, releasing unit");
            self.schedule.release_schedule_state(state.id, now, now).await?;
            return Err(e);
        }
        debug!(
            state_id = state.id,
            credential_id,
            endpoint = %unit.endpoint,
            parameter = unit.parameter,
            "job dispatched"
        );
        Ok(())
    }

    /// The unit's job finished. With a document the unit rests for the
    /// server-declared window plus grace, otherwise for grace only.
    pub async fn complete(
        &self,
        state_id: i64,
        document: Option<&ApiDocument>,
    ) -> Result<DateTime<Utc>, KeywardError> {
        let now = self.clock.now();
        let next = next_eligible(now, document.map(ApiDocument::cache_window), self.grace);
        self.schedule.release_schedule_state(state_id, now, next).await?;
        debug!(state_id, next_time = %next, "unit completed");
        Ok(next)
    }

    /// The unit's job failed; retry after the grace period.
    pub async fn fail(&self, state_id: i64) -> Result<DateTime<Utc>, KeywardError> {
        let now = self.clock.now();
        let next = next_eligible(now, None, self.grace);
        self.schedule.release_schedule_state(state_id, now, next).await?;
        debug!(state_id, next_time = %next, "unit failed");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::{KeyType, QueueClass, TaskState};
    use keyward_test_utils::{ManualClock, RecordingDispatcher, TestHarness, envelope};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Setup {
        harness: TestHarness,
        clock: Arc<ManualClock>,
        dispatcher: RecordingDispatcher,
        scheduler: Arc<Scheduler>,
    }

    async fn setup() -> Setup {
        let harness = TestHarness::new().await.unwrap();
        let clock = Arc::new(ManualClock::at(envelope::t(12, 0, 0)));
        let dispatcher = RecordingDispatcher::new();
        let scheduler = Arc::new(Scheduler::new(
            &SchedulerConfig::default(),
            harness.storage(),
            harness.storage(),
            Arc::new(dispatcher.clone()),
            clock.clone(),
        ));
        Setup {
            harness,
            clock,
            dispatcher,
            scheduler,
        }
    }

    async fn seed_account(harness: &TestHarness) {
        let credential = harness
            .seed_credential(1, 500, "secret", KeyType::Account, -1)
            .await
            .unwrap();
        harness.seed_character(90, "Pilot", None).await.unwrap();
        harness.link(&credential, &[90]).await.unwrap();
    }

    #[tokio::test]
    async fn first_pass_creates_and_dispatches_everything() {
        let s = setup().await;
        seed_account(&s.harness).await;

        let report = s.scheduler.run_pass().await.unwrap();
        assert_eq!(report.units, 6);
        assert_eq!(report.created, 6);
        assert_eq!(report.dispatched, 6);

        let jobs = s.dispatcher.jobs().await;
        let low: Vec<_> = jobs.iter().filter(|(_, q)| *q == QueueClass::Low).collect();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].0.parameter, None);

        // Nothing is due while jobs are in flight.
        let report = s.scheduler.run_pass().await.unwrap();
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.not_due, 6);
    }

    #[tokio::test]
    async fn concurrent_passes_dispatch_each_unit_once() {
        let s = setup().await;
        seed_account(&s.harness).await;

        let (a, b) = tokio::join!(s.scheduler.run_pass(), s.scheduler.run_pass());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.dispatched + b.dispatched, 6);

        let jobs = s.dispatcher.jobs().await;
        let mut state_ids: Vec<i64> = jobs.iter().map(|(job, _)| job.state_id).collect();
        state_ids.sort_unstable();
        state_ids.dedup();
        assert_eq!(state_ids.len(), jobs.len());
    }

    #[tokio::test]
    async fn shared_key_is_planned_once() {
        let s = setup().await;
        seed_account(&s.harness).await;
        let twin = s
            .harness
            .seed_credential(2, 500, "secret", KeyType::Account, -1)
            .await
            .unwrap();
        s.harness.link(&twin, &[90]).await.unwrap();

        let report = s.scheduler.run_pass().await.unwrap();
        assert_eq!(report.identities, 1);
        assert_eq!(report.dispatched, 6);
    }

    #[tokio::test]
    async fn complete_uses_window_plus_grace() {
        let s = setup().await;
        seed_account(&s.harness).await;
        s.scheduler.run_pass().await.unwrap();
        let (job, _) = s.dispatcher.take().await.remove(0);

        s.clock.set(envelope::t(12, 0, 5));
        let body = envelope::success(envelope::t(11, 59, 0), envelope::t(12, 59, 0), serde_json::json!({}));
        let doc = ApiDocument::parse(&body).unwrap();
        let next = s.scheduler.complete(job.state_id, Some(&doc)).await.unwrap();
        assert_eq!(next, envelope::t(13, 0, 35));

        let state = s.harness.storage().get_schedule_state(job.state_id).await.unwrap().unwrap();
        assert_eq!(state.state, TaskState::Ready);
        assert_eq!(state.next_time, envelope::t(13, 0, 35));
    }

    #[tokio::test]
    async fn complete_without_document_and_fail_use_grace_only() {
        let s = setup().await;
        seed_account(&s.harness).await;
        s.scheduler.run_pass().await.unwrap();
        let jobs = s.dispatcher.take().await;

        assert_eq!(
            s.scheduler.complete(jobs[0].0.state_id, None).await.unwrap(),
            envelope::t(12, 0, 30)
        );
        assert_eq!(
            s.scheduler.fail(jobs[1].0.state_id).await.unwrap(),
            envelope::t(12, 0, 30)
        );
    }

    #[tokio::test]
    async fn unit_is_due_exactly_one_grace_period_later() {
        let s = setup().await;
        seed_account(&s.harness).await;
        s.scheduler.run_pass().await.unwrap();
        for (job, _) in s.dispatcher.take().await {
            s.scheduler.complete(job.state_id, None).await.unwrap();
        }

        s.clock.advance(Duration::seconds(29));
        assert_eq!(s.scheduler.run_pass().await.unwrap().dispatched, 0);

        s.clock.advance(Duration::seconds(1));
        let report = s.scheduler.run_pass().await.unwrap();
        assert_eq!(report.dispatched, 6);
        assert_eq!(report.created, 0);
    }

    #[tokio::test]
    async fn invalid_credentials_are_not_planned() {
        let s = setup().await;
        seed_account(&s.harness).await;
        s.harness.storage().invalidate_credential(1).await.unwrap();

        let report = s.scheduler.run_pass().await.unwrap();
        assert_eq!(report, PassReport::default());
    }

    /// Dispatcher whose first enqueue fails; later ones are recorded.
    struct RefusesFirst {
        inner: RecordingDispatcher,
        refused: AtomicBool,
    }

    #[async_trait::async_trait]
    impl JobDispatcher for RefusesFirst {
        async fn enqueue(&self, job: &JobRequest, queue: QueueClass) -> Result<i64, KeywardError> {
            if !self.refused.swap(true, Ordering::SeqCst) {
                return Err(KeywardError::Internal("queue unavailable".into()));
            }
            self.inner.enqueue(job, queue).await
        }
    }

    #[tokio::test]
    async fn enqueue_failure_skips_only_that_unit() {
        let s = setup().await;
        seed_account(&s.harness).await;
        let recorded = RecordingDispatcher::new();
        let scheduler = Scheduler::new(
            &SchedulerConfig::default(),
            s.harness.storage(),
            s.harness.storage(),
            Arc::new(RefusesFirst {
                inner: recorded.clone(),
                refused: AtomicBool::new(false),
            }),
            s.clock.clone(),
        );

        let report = scheduler.run_pass().await.unwrap();
        assert_eq!(report.units, 6);
        assert_eq!(report.failed, 1);
        assert_eq!(report.dispatched, 5);
        assert_eq!(recorded.jobs().await.len(), 5);

        // The refused unit was handed back and is due on the next pass.
        let report = scheduler.run_pass().await.unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(recorded.jobs().await.len(), 6);
    }

    #[test]
    fn grace_period_is_capped() {
        let config = SchedulerConfig {
            grace_period_secs: u64::MAX,
            ..SchedulerConfig::default()
        };
        assert_eq!(grace_period(&config), Duration::days(1));
        assert_eq!(grace_period(&SchedulerConfig::default()), Duration::seconds(30));
    }

    #[test]
    fn next_eligible_math() {
        let now = envelope::t(12, 0, 0);
        let grace = Duration::seconds(30);
        assert_eq!(next_eligible(now, None, grace), envelope::t(12, 0, 30));
        assert_eq!(
            next_eligible(now, Some(Duration::minutes(60)), grace),
            envelope::t(13, 0, 30)
        );
    }
}
