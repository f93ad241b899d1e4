//! Case reminder policies on top of the job subsystem.
//!
//! - `EvidenceReminder`: DWP response date + delay
//! - `HearingReminder`: two reminders before the next oral hearing
//! - `HearingReminderRemover`: cancels hearing reminders on postponement
//! - `AllReminderRemover`: cancels every reminder on terminal events
//!
//! `ReminderService` routes case events to these policies. Fired reminder
//! jobs are executed by `ReminderJobExecutor`, which hands them to a
//! `ReminderNotifier`.

pub mod all_remover;
pub mod config;
pub mod dates;
pub mod error;
pub mod evidence;
pub mod executor;
pub mod handler;
pub mod hearing;
pub mod hearing_remover;
pub mod payload;
pub mod service;

pub use all_remover::{AllReminderRemover, TERMINAL_EVENTS};
pub use config::ReminderConfig;
pub use error::{ReminderError, ReminderResult};
pub use evidence::EvidenceReminder;
pub use executor::{ReminderJobExecutor, ReminderNotifier};
pub use handler::{ReminderHandler, ReminderOutcome};
pub use hearing::HearingReminder;
pub use hearing_remover::HearingReminderRemover;
pub use payload::ReminderPayload;
pub use service::ReminderService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use tribunal_core::CaseId;
    use tribunal_events::{CaseData, CaseEvent, EventType};
    use tribunal_jobs::{
        InMemoryTriggerStore, Job, JobId, JobRemover, JobScheduler, PayloadSerializers,
        TriggerRecord, group_key,
    };

    use crate::payload::{self, ReminderPayload};

    pub const CASE_ID: u64 = 12345;

    /// Unstarted in-memory store with scheduler and remover on top.
    pub struct Harness {
        pub store: Arc<InMemoryTriggerStore>,
        pub scheduler: JobScheduler,
        pub remover: JobRemover,
    }

    impl Harness {
        pub fn new() -> Self {
            let store = InMemoryTriggerStore::arc();
            let mut serializers = PayloadSerializers::new();
            payload::register_serializer(&mut serializers).unwrap();

            Self {
                scheduler: JobScheduler::new(store.clone(), Arc::new(serializers)),
                remover: JobRemover::new(store.clone()),
                store,
            }
        }

        pub fn pending(&self, group: &str) -> Vec<TriggerRecord> {
            self.store.pending_in_group(group).unwrap()
        }
    }

    pub fn event(event_type: EventType, case_data: CaseData) -> CaseEvent {
        CaseEvent::new(CaseId::new(CASE_ID), event_type, Utc::now(), case_data)
    }

    /// Schedule one reminder of `reminder` type for the test case, a day out.
    pub fn schedule_reminder(harness: &Harness, reminder: EventType) -> JobId {
        let case_id = CaseId::new(CASE_ID);
        harness
            .scheduler
            .schedule(Job::new(
                group_key(case_id, reminder),
                reminder.id(),
                ReminderPayload::new(case_id, reminder),
                Utc::now() + Duration::days(1),
            ))
            .unwrap()
    }
}
