//! Wiring of the reminder process: store, registries, engine, policies.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use tracing::{error, info, warn};

use tribunal_core::CaseId;
use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{
    ConfigError, FailureRescheduler, InMemoryTriggerStore, JobConfig, JobDispatcher,
    JobExecutionEngine, JobRemover, JobScheduler, PayloadSerializers, TriggerStore,
};
use tribunal_reminders::{
    ReminderConfig, ReminderJobExecutor, ReminderNotifier, ReminderService, payload,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jobs: JobConfig,
    pub reminders: ReminderConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            jobs: JobConfig::from_lookup(&lookup)?,
            reminders: ReminderConfig::from_lookup(&lookup)?,
        })
    }
}

/// Notifier that only logs. Delivery channels plug in here.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl ReminderNotifier for LoggingNotifier {
    fn send_reminder(&self, case_id: CaseId, reminder: EventType) -> anyhow::Result<()> {
        info!(case_id = %case_id, reminder = %reminder, "reminder due");
        Ok(())
    }
}

/// The assembled reminder process.
pub struct ReminderApp {
    store: Arc<InMemoryTriggerStore>,
    engine: Arc<JobExecutionEngine>,
    service: ReminderService,
}

impl ReminderApp {
    pub fn build(config: &AppConfig, notifier: Arc<dyn ReminderNotifier>) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryTriggerStore::with_config(config.jobs.store.clone()));

        let mut serializers = PayloadSerializers::new();
        payload::register_serializer(&mut serializers)
            .context("registering reminder serializer")?;

        let mut dispatcher = JobDispatcher::new();
        payload::register_dispatch(&mut dispatcher, ReminderJobExecutor::new(notifier));

        let rescheduler = FailureRescheduler::new(store.clone(), config.jobs.retry.clone());
        let engine = JobExecutionEngine::new(Arc::new(dispatcher))
            .with_listener(Arc::new(rescheduler));

        let service = ReminderService::standard(
            &config.reminders,
            JobScheduler::new(store.clone(), Arc::new(serializers)),
            JobRemover::new(store.clone()),
        );

        Ok(Self {
            store,
            engine: Arc::new(engine),
            service,
        })
    }

    pub fn start(&self) -> anyhow::Result<()> {
        self.store
            .start(self.engine.clone())
            .context("starting trigger store")?;
        info!("reminder scheduler started");
        Ok(())
    }

    pub fn stop(&self, wait_for_in_flight: bool) -> anyhow::Result<()> {
        self.store
            .stop(wait_for_in_flight)
            .context("stopping trigger store")?;
        info!("reminder scheduler stopped");
        Ok(())
    }

    pub fn service(&self) -> &ReminderService {
        &self.service
    }

    pub fn store(&self) -> &Arc<InMemoryTriggerStore> {
        &self.store
    }

    /// Process one JSON-encoded case event. Returns how many policies ran.
    pub fn handle_line(&self, line: &str) -> anyhow::Result<usize> {
        let event: CaseEvent = serde_json::from_str(line).context("decoding case event")?;
        let ran = self.service.process(&event).with_context(|| {
            format!(
                "processing {} event of case {}",
                event.event_type(),
                event.case_id()
            )
        })?;

        if ran == 0 {
            warn!(case_id = %event.case_id(), event_type = %event.event_type(), "event scheduled nothing");
        }
        Ok(ran)
    }
}

/// Feed `input` line by line into `app` on a dedicated thread.
///
/// The thread ends at end of input and yields how many lines were processed.
pub fn spawn_feed<R>(app: Arc<ReminderApp>, input: R) -> io::Result<JoinHandle<usize>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("case-event-feed".to_string())
        .spawn(move || {
            let mut processed = 0;
            for line in input.lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => match app.handle_line(&line) {
                        Ok(_) => processed += 1,
                        Err(e) => error!(error = %format!("{e:#}"), "case event not processed"),
                    },
                    Err(e) => {
                        error!(error = %e, "failed to read case event feed");
                        break;
                    }
                }
            }
            info!(processed, "case event feed closed");
            processed
        })
}

impl std::fmt::Debug for ReminderApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderApp")
            .field("engine", &self.engine)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}
