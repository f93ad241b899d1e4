//! Execution engine: the store's fire callback.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};

use super::dispatch::JobDispatcher;
use super::error::JobError;
use super::retry::ExecutionListener;
use super::store::FireCallback;
use super::types::TriggerRecord;

/// Runs fired triggers through the dispatcher and reports each outcome to
/// the registered listener on the same thread.
pub struct JobExecutionEngine {
    dispatcher: Arc<JobDispatcher>,
    listener: Option<Arc<dyn ExecutionListener>>,
}

impl JobExecutionEngine {
    pub fn new(dispatcher: Arc<JobDispatcher>) -> Self {
        Self {
            dispatcher,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Execute one fired trigger. A panicking executor counts as an
    /// executor failure.
    pub fn execute(&self, trigger: &TriggerRecord) -> Result<(), JobError> {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.dispatcher.dispatch(trigger)))
            .unwrap_or_else(|payload| {
                Err(JobError::Executor {
                    job_id: trigger.job_id,
                    reason: format!("panicked: {}", panic_message(payload.as_ref())),
                })
            });
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => debug!(
                job_id = %trigger.job_id,
                group = %trigger.job_group,
                attempt = trigger.attempt,
                elapsed_ms,
                "job executed"
            ),
            Err(e) => error!(
                job_id = %trigger.job_id,
                group = %trigger.job_group,
                attempt = trigger.attempt,
                elapsed_ms,
                error = %e,
                "job execution failed"
            ),
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

impl FireCallback for JobExecutionEngine {
    fn on_fire(&self, trigger: TriggerRecord) {
        let result = self.execute(&trigger);
        if let Some(listener) = &self.listener {
            listener.on_outcome(&trigger, result.as_ref().map(|_| ()));
        }
    }
}

impl std::fmt::Debug for JobExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobExecutionEngine")
            .field("dispatcher", &self.dispatcher)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryDecision;
    use crate::types::JobId;
    use chrono::Utc;
    use std::sync::Mutex;

    fn failing_dispatcher() -> Arc<JobDispatcher> {
        let mut dispatcher = JobDispatcher::new();
        dispatcher.register(
            "numbers",
            |p: &str| p.parse::<u64>().is_ok(),
            |p: &str| -> anyhow::Result<u64> { Ok(p.parse::<u64>()?) },
            |_id: JobId, _group: &str, _name: &str, n: u64| -> anyhow::Result<()> {
                if n == 0 {
                    anyhow::bail!("zero is not a case")
                }
                Ok(())
            },
        );
        Arc::new(dispatcher)
    }

    fn recording_listener(
        seen: &Arc<Mutex<Vec<(u32, bool)>>>,
    ) -> Arc<dyn ExecutionListener> {
        let seen = seen.clone();
        Arc::new(
            move |t: &TriggerRecord, outcome: Result<(), &JobError>| -> RetryDecision {
                seen.lock().unwrap().push((t.attempt, outcome.is_ok()));
                RetryDecision::Completed
            },
        )
    }

    #[test]
    fn outcome_reaches_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let engine =
            JobExecutionEngine::new(failing_dispatcher()).with_listener(recording_listener(&seen));

        engine.on_fire(TriggerRecord::first_attempt(JobId::new(), "g", "n", "7", Utc::now()));
        engine.on_fire(TriggerRecord::first_attempt(JobId::new(), "g", "n", "0", Utc::now()));
        engine.on_fire(TriggerRecord::first_attempt(JobId::new(), "g", "n", "x", Utc::now()));

        assert_eq!(*seen.lock().unwrap(), vec![(1, true), (1, false), (1, false)]);
    }

    #[test]
    fn panicking_executor_is_retried_like_a_failure() {
        use crate::retry::{FailureRescheduler, RetryPolicy};
        use crate::store::InMemoryTriggerStore;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = JobDispatcher::new();
        {
            let calls = calls.clone();
            dispatcher.register(
                "any",
                |_: &str| true,
                |p: &str| -> anyhow::Result<String> { Ok(p.to_string()) },
                move |_id: JobId, _group: &str, _name: &str, _p: String| -> anyhow::Result<()> {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        panic!("notifier bug");
                    }
                    Ok(())
                },
            );
        }

        let store = InMemoryTriggerStore::arc();
        let rescheduler =
            FailureRescheduler::new(store.clone(), RetryPolicy::fixed(3, Duration::ZERO));
        let engine = JobExecutionEngine::new(Arc::new(dispatcher))
            .with_listener(Arc::new(rescheduler));

        let first = TriggerRecord::first_attempt(JobId::new(), "g", "n", "x", Utc::now());
        let err = engine.execute(&first).unwrap_err();
        assert!(matches!(&err, JobError::Executor { reason, .. } if reason == "panicked: notifier bug"));

        engine.on_fire(TriggerRecord::first_attempt(JobId::new(), "h", "n", "x", Utc::now()));
        assert!(store.pending_in_group("h").unwrap().is_empty());

        calls.store(0, Ordering::SeqCst);
        engine.on_fire(first.clone());
        let retry = store.pending_in_group("g").unwrap();
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].attempt, 2);

        engine.on_fire(retry[0].clone());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unmapped_payload_is_reported() {
        let engine = JobExecutionEngine::new(failing_dispatcher());
        let err = engine
            .execute(&TriggerRecord::first_attempt(JobId::new(), "g", "n", "{}", Utc::now()))
            .unwrap_err();
        assert!(err.to_string().starts_with("cannot map payload"));
    }
}
