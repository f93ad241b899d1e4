//! Bounded, fixed-delay retry of failed executions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::error::JobError;
use super::store::TriggerStore;
use super::types::TriggerRecord;

/// What happens to a job after one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Execution succeeded; nothing left to do.
    Completed,
    /// Run the same job again at `at` as attempt number `attempt`.
    RetryAt { at: DateTime<Utc>, attempt: u32 },
    /// The job is abandoned.
    GiveUp { attempts: u32, reason: String },
}

/// Retry policy configuration.
///
/// The delay between attempts is fixed. There is no backoff growth and no
/// jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included.
    pub max_attempts: u32,
    /// Delay between a failed attempt and the next one.
    pub delay_between_attempts: Duration,
}

impl RetryPolicy {
    /// Create a policy with fixed delays.
    pub fn fixed(max_attempts: u32, delay_between_attempts: Duration) -> Self {
        Self {
            max_attempts,
            delay_between_attempts,
        }
    }

    /// Create a policy that never retries.
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Check if another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Decide the follow-up of an execution.
    ///
    /// Pure: depends only on the attempt number, the failure (if any), the
    /// policy and `now`. Configuration failures are never retried.
    pub fn decide(
        &self,
        attempt: u32,
        outcome: Result<(), &JobError>,
        now: DateTime<Utc>,
    ) -> RetryDecision {
        let failure = match outcome {
            Ok(()) => return RetryDecision::Completed,
            Err(e) => e,
        };

        if failure.is_configuration() {
            return RetryDecision::GiveUp {
                attempts: attempt,
                reason: failure.to_string(),
            };
        }

        if self.should_retry(attempt) {
            let at = chrono::Duration::from_std(self.delay_between_attempts)
                .ok()
                .and_then(|delay| now.checked_add_signed(delay));
            match at {
                Some(at) => RetryDecision::RetryAt {
                    at,
                    attempt: attempt + 1,
                },
                None => RetryDecision::GiveUp {
                    attempts: attempt,
                    reason: format!(
                        "{failure} (retry delay {:?} out of range)",
                        self.delay_between_attempts
                    ),
                },
            }
        } else {
            RetryDecision::GiveUp {
                attempts: attempt,
                reason: failure.to_string(),
            }
        }
    }
}

/// Receives the outcome of every execution.
pub trait ExecutionListener: Send + Sync {
    fn on_outcome(&self, trigger: &TriggerRecord, outcome: Result<(), &JobError>) -> RetryDecision;
}

impl<F> ExecutionListener for F
where
    F: Fn(&TriggerRecord, Result<(), &JobError>) -> RetryDecision + Send + Sync,
{
    fn on_outcome(&self, trigger: &TriggerRecord, outcome: Result<(), &JobError>) -> RetryDecision {
        self(trigger, outcome)
    }
}

/// Re-enqueues failed jobs according to a [`RetryPolicy`].
///
/// Runs inline in the callback that observed the failure, so only the thread
/// that just executed a job may reschedule it.
pub struct FailureRescheduler {
    store: Arc<dyn TriggerStore>,
    policy: RetryPolicy,
}

impl FailureRescheduler {
    pub fn new(store: Arc<dyn TriggerStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl ExecutionListener for FailureRescheduler {
    fn on_outcome(&self, trigger: &TriggerRecord, outcome: Result<(), &JobError>) -> RetryDecision {
        let decision = self.policy.decide(trigger.attempt, outcome, Utc::now());

        match &decision {
            RetryDecision::Completed => {}
            RetryDecision::RetryAt { at, attempt } => {
                let next = trigger.next_attempt(*at);
                match self.store.persist(next) {
                    Ok(()) => info!(
                        job_id = %trigger.job_id,
                        group = %trigger.job_group,
                        attempt = *attempt,
                        retry_at = %at,
                        "job failed, rescheduled attempt {attempt}"
                    ),
                    Err(e) => error!(
                        job_id = %trigger.job_id,
                        group = %trigger.job_group,
                        attempt = *attempt,
                        error = %e,
                        "job failed and could not be rescheduled"
                    ),
                }
            }
            RetryDecision::GiveUp { attempts, reason } => {
                warn!(
                    job_id = %trigger.job_id,
                    group = %trigger.job_group,
                    name = %trigger.description,
                    error = %reason,
                    "job failed after {attempts} attempts"
                );
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTriggerStore;
    use crate::types::JobId;
    use proptest::prelude::*;

    fn executor_failure() -> JobError {
        JobError::Executor {
            job_id: JobId::new(),
            reason: "boom".to_string(),
        }
    }

    #[test]
    fn fixed_delay_is_constant() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(10));
        let now = Utc::now();
        let err = executor_failure();

        for attempt in 1..5 {
            assert_eq!(
                policy.decide(attempt, Err(&err), now),
                RetryDecision::RetryAt {
                    at: now + chrono::Duration::seconds(10),
                    attempt: attempt + 1,
                }
            );
        }
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn unrepresentable_delay_gives_up_instead_of_retrying_early() {
        let err = executor_failure();
        let now = Utc::now();

        for secs in [u64::MAX, 9_000_000_000_000] {
            let policy = RetryPolicy::fixed(3, Duration::from_secs(secs));
            assert!(matches!(
                policy.decide(1, Err(&err), now),
                RetryDecision::GiveUp { attempts: 1, .. }
            ));
        }
    }

    #[test]
    fn success_completes() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        assert_eq!(policy.decide(1, Ok(()), Utc::now()), RetryDecision::Completed);
    }

    #[test]
    fn configuration_failure_is_never_retried() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        let err = JobError::CannotMapPayload {
            payload: "?".to_string(),
        };

        assert!(matches!(
            policy.decide(1, Err(&err), Utc::now()),
            RetryDecision::GiveUp { attempts: 1, .. }
        ));
    }

    #[test]
    fn three_failures_give_two_reschedules() {
        let store = InMemoryTriggerStore::arc();
        let rescheduler =
            FailureRescheduler::new(store.clone(), RetryPolicy::fixed(3, Duration::from_secs(10)));
        let err = executor_failure();

        let first = TriggerRecord::first_attempt(JobId::new(), "g", "job", "{}", Utc::now());

        let d1 = rescheduler.on_outcome(&first, Err(&err));
        assert!(matches!(d1, RetryDecision::RetryAt { attempt: 2, .. }));
        let second = store.pending_in_group("g").unwrap().pop().unwrap();
        assert_eq!(second.attempt, 2);
        assert_eq!(second.job_id, first.job_id);
        assert!(second.fire_at >= first.fire_at + chrono::Duration::seconds(10));

        // The store hands the trigger out again before it is re-run.
        store.delete(&second.key()).unwrap();
        let d2 = rescheduler.on_outcome(&second, Err(&err));
        assert!(matches!(d2, RetryDecision::RetryAt { attempt: 3, .. }));
        let third = store.pending_in_group("g").unwrap().pop().unwrap();
        assert_eq!(third.attempt, 3);

        store.delete(&third.key()).unwrap();
        let d3 = rescheduler.on_outcome(&third, Err(&err));
        assert!(matches!(d3, RetryDecision::GiveUp { attempts: 3, .. }));
        assert!(store.pending_in_group("g").unwrap().is_empty());
    }

    #[test]
    fn success_after_failure_stops_rescheduling() {
        let store = InMemoryTriggerStore::arc();
        let rescheduler =
            FailureRescheduler::new(store.clone(), RetryPolicy::fixed(3, Duration::from_secs(10)));

        let second = TriggerRecord::first_attempt(JobId::new(), "g", "job", "{}", Utc::now())
            .next_attempt(Utc::now());

        assert_eq!(rescheduler.on_outcome(&second, Ok(())), RetryDecision::Completed);
        assert!(store.pending_in_group("g").unwrap().is_empty());
    }

    proptest! {
        /// Property: repeated failures are rescheduled exactly `max_attempts - 1`
        /// times, each one attempt further than the last.
        #[test]
        fn reschedules_are_bounded(max_attempts in 1u32..20, delay_secs in 0u64..3600) {
            let policy = RetryPolicy::fixed(max_attempts, Duration::from_secs(delay_secs));
            let err = executor_failure();
            let now = Utc::now();

            let mut attempt = 1;
            let mut reschedules = 0;
            loop {
                match policy.decide(attempt, Err(&err), now) {
                    RetryDecision::RetryAt { attempt: next, at } => {
                        prop_assert_eq!(next, attempt + 1);
                        prop_assert_eq!(at, now + chrono::Duration::seconds(delay_secs as i64));
                        attempt = next;
                        reschedules += 1;
                    }
                    RetryDecision::GiveUp { attempts, .. } => {
                        prop_assert_eq!(attempts, max_attempts);
                        break;
                    }
                    RetryDecision::Completed => prop_assert!(false, "failure cannot complete"),
                }
            }

            prop_assert_eq!(reschedules, max_attempts - 1);
        }
    }
}
