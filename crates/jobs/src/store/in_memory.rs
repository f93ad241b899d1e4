//! In-memory trigger store for tests/dev and single-process deployments.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use super::{FireCallback, TriggerStore};
use crate::error::StoreError;
use crate::types::{JobId, JobKey, TriggerRecord};

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of threads executing fired triggers.
    pub worker_threads: usize,
    /// How often to look for due triggers.
    pub poll_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl StoreConfig {
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Debug, Default)]
struct StoreState {
    pending: HashMap<JobKey, TriggerRecord>,
    /// Job ids handed to a worker and not finished yet.
    running: HashSet<JobId>,
}

#[derive(Debug)]
struct StoreRuntime {
    shutdown: mpsc::Sender<()>,
    stopping: Arc<AtomicBool>,
    poller: Option<thread::JoinHandle<()>>,
    workers: Vec<thread::JoinHandle<()>>,
}

/// Trigger store keeping everything in process memory.
///
/// A poller thread claims due triggers and hands them to a fixed pool of
/// worker threads. A claimed trigger leaves the pending set and its job id is
/// marked running until the callback returns; pending triggers of a running
/// job id are not claimed, so one job never runs twice at the same time.
#[derive(Debug)]
pub struct InMemoryTriggerStore {
    state: Arc<Mutex<StoreState>>,
    config: StoreConfig,
    runtime: Mutex<Option<StoreRuntime>>,
}

impl InMemoryTriggerStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            config,
            runtime: Mutex::new(None),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Pending triggers, earliest first.
    pub fn pending(&self) -> Result<Vec<TriggerRecord>, StoreError> {
        let state = lock_state(&self.state)?;
        let mut triggers: Vec<_> = state.pending.values().cloned().collect();
        triggers.sort_by_key(|t| t.fire_at);
        Ok(triggers)
    }

    /// Pending triggers of one group, earliest first.
    pub fn pending_in_group(&self, group: &str) -> Result<Vec<TriggerRecord>, StoreError> {
        let mut triggers = self.pending()?;
        triggers.retain(|t| t.job_group == group);
        Ok(triggers)
    }

    pub fn is_started(&self) -> bool {
        self.runtime.lock().map(|r| r.is_some()).unwrap_or(false)
    }
}

impl Default for InMemoryTriggerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerStore for InMemoryTriggerStore {
    fn persist(&self, trigger: TriggerRecord) -> Result<(), StoreError> {
        let mut state = lock_state(&self.state)?;
        state.pending.insert(trigger.key(), trigger);
        Ok(())
    }

    fn delete(&self, key: &JobKey) -> Result<bool, StoreError> {
        let mut state = lock_state(&self.state)?;
        Ok(state.pending.remove(key).is_some())
    }

    fn delete_group(&self, group: &str) -> Result<Vec<JobId>, StoreError> {
        let mut state = lock_state(&self.state)?;
        let keys: Vec<JobKey> = state
            .pending
            .keys()
            .filter(|k| k.group == group)
            .cloned()
            .collect();

        for key in &keys {
            state.pending.remove(key);
        }
        Ok(keys.into_iter().map(|k| k.id).collect())
    }

    fn start(&self, callback: Arc<dyn FireCallback>) -> Result<(), StoreError> {
        let mut runtime = self
            .runtime
            .lock()
            .map_err(|_| StoreError::Storage("trigger store runtime lock poisoned".to_string()))?;
        if runtime.is_some() {
            return Err(StoreError::AlreadyStarted);
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (work_tx, work_rx) = mpsc::channel::<TriggerRecord>();
        let work_rx = Arc::new(Mutex::new(work_rx));
        let stopping = Arc::new(AtomicBool::new(false));

        let worker_threads = self.config.worker_threads.max(1);
        let mut workers = Vec::with_capacity(worker_threads);
        for i in 0..worker_threads {
            let state = self.state.clone();
            let work_rx = work_rx.clone();
            let callback = callback.clone();
            let stopping = stopping.clone();
            let join = thread::Builder::new()
                .name(format!("trigger-worker-{i}"))
                .spawn(move || worker_loop(state, work_rx, callback, stopping))
                .map_err(|e| StoreError::Storage(format!("failed to spawn worker thread: {e}")))?;
            workers.push(join);
        }

        let state = self.state.clone();
        let poll_interval = self.config.poll_interval;
        let poller = thread::Builder::new()
            .name("trigger-poller".to_string())
            .spawn(move || poller_loop(state, work_tx, shutdown_rx, poll_interval))
            .map_err(|e| StoreError::Storage(format!("failed to spawn poller thread: {e}")))?;

        info!(workers = worker_threads, "trigger store started");

        *runtime = Some(StoreRuntime {
            shutdown: shutdown_tx,
            stopping,
            poller: Some(poller),
            workers,
        });
        Ok(())
    }

    fn stop(&self, wait_for_in_flight: bool) -> Result<(), StoreError> {
        let taken = self
            .runtime
            .lock()
            .map_err(|_| StoreError::Storage("trigger store runtime lock poisoned".to_string()))?
            .take();
        let Some(mut runtime) = taken else {
            return Ok(());
        };

        // Claimed-but-unstarted triggers go back to pending from here on.
        runtime.stopping.store(true, Ordering::SeqCst);
        let _ = runtime.shutdown.send(());
        if let Some(poller) = runtime.poller.take() {
            let _ = poller.join();
        }

        if wait_for_in_flight {
            for worker in runtime.workers.drain(..) {
                let _ = worker.join();
            }
        }

        info!(wait_for_in_flight, "trigger store stopped");
        Ok(())
    }
}

fn lock_state(state: &Mutex<StoreState>) -> Result<MutexGuard<'_, StoreState>, StoreError> {
    state
        .lock()
        .map_err(|_| StoreError::Storage("trigger store state lock poisoned".to_string()))
}

/// Move every due, non-running trigger from pending to running.
fn claim_due(
    state: &Mutex<StoreState>,
    now: DateTime<Utc>,
) -> Result<Vec<TriggerRecord>, StoreError> {
    let mut guard = lock_state(state)?;
    let state = &mut *guard;

    let mut due: Vec<(DateTime<Utc>, JobKey)> = state
        .pending
        .values()
        .filter(|t| t.fire_at <= now && !state.running.contains(&t.job_id))
        .map(|t| (t.fire_at, t.key()))
        .collect();
    due.sort_by_key(|(at, _)| *at);

    let mut claimed = Vec::with_capacity(due.len());
    for (_, key) in due {
        if !state.running.insert(key.id) {
            continue;
        }
        match state.pending.remove(&key) {
            Some(trigger) => claimed.push(trigger),
            None => {
                state.running.remove(&key.id);
            }
        }
    }
    Ok(claimed)
}

/// Put a claimed trigger back, unless a newer one with the same key arrived.
fn release(state: &Mutex<StoreState>, trigger: TriggerRecord) {
    match lock_state(state) {
        Ok(mut state) => {
            state.running.remove(&trigger.job_id);
            state.pending.entry(trigger.key()).or_insert(trigger);
        }
        Err(e) => error!(job_id = %trigger.job_id, error = %e, "failed to release trigger"),
    }
}

fn finish(state: &Mutex<StoreState>, job_id: JobId) {
    match lock_state(state) {
        Ok(mut state) => {
            state.running.remove(&job_id);
        }
        Err(e) => error!(job_id = %job_id, error = %e, "failed to clear running job"),
    }
}

fn poller_loop(
    state: Arc<Mutex<StoreState>>,
    work_tx: mpsc::Sender<TriggerRecord>,
    shutdown_rx: mpsc::Receiver<()>,
    poll_interval: Duration,
) {
    debug!("trigger poller started");

    loop {
        match claim_due(&state, Utc::now()) {
            Ok(due) => {
                for trigger in due {
                    debug!(job_id = %trigger.job_id, attempt = trigger.attempt, "trigger due");
                    if let Err(mpsc::SendError(trigger)) = work_tx.send(trigger) {
                        error!(job_id = %trigger.job_id, "no worker left to run trigger");
                        release(&state, trigger);
                        return;
                    }
                }
            }
            Err(e) => error!(error = %e, "failed to claim due triggers"),
        }

        match shutdown_rx.recv_timeout(poll_interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!("trigger poller stopped");
}

fn worker_loop(
    state: Arc<Mutex<StoreState>>,
    work_rx: Arc<Mutex<mpsc::Receiver<TriggerRecord>>>,
    callback: Arc<dyn FireCallback>,
    stopping: Arc<AtomicBool>,
) {
    loop {
        let next = match work_rx.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(trigger) = next else {
            break;
        };

        if stopping.load(Ordering::SeqCst) {
            release(&state, trigger);
            continue;
        }

        let job_id = trigger.job_id;
        let fired = panic::catch_unwind(AssertUnwindSafe(|| callback.on_fire(trigger)));
        if fired.is_err() {
            error!(job_id = %job_id, "fire callback panicked");
        }
        finish(&state, job_id);
    }
}
