//! Execution of fired reminder jobs.

use std::sync::Arc;

use anyhow::bail;
use tracing::info;

use tribunal_core::CaseId;
use tribunal_events::EventType;
use tribunal_jobs::{JobExecutor, JobId};

use crate::payload::ReminderPayload;

/// Delivers a reminder (email, SMS, ...) once its job fires.
pub trait ReminderNotifier: Send + Sync {
    fn send_reminder(&self, case_id: CaseId, reminder: EventType) -> anyhow::Result<()>;
}

/// Job executor for reminder payloads, in both stored forms.
#[derive(Clone)]
pub struct ReminderJobExecutor {
    notifier: Arc<dyn ReminderNotifier>,
}

impl ReminderJobExecutor {
    pub fn new(notifier: Arc<dyn ReminderNotifier>) -> Self {
        Self { notifier }
    }

    fn send(&self, job_id: JobId, case_id: CaseId, reminder: EventType) -> anyhow::Result<()> {
        if !reminder.is_reminder() {
            bail!("{reminder} is not a reminder event");
        }

        self.notifier.send_reminder(case_id, reminder)?;
        info!(job_id = %job_id, case_id = %case_id, reminder = %reminder, "reminder sent");
        Ok(())
    }
}

impl JobExecutor<ReminderPayload> for ReminderJobExecutor {
    fn execute(
        &self,
        job_id: JobId,
        _job_group: &str,
        _job_name: &str,
        payload: ReminderPayload,
    ) -> anyhow::Result<()> {
        self.send(job_id, payload.case_id, payload.reminder)
    }
}

/// Legacy payloads: the job name is the reminder type.
impl JobExecutor<CaseId> for ReminderJobExecutor {
    fn execute(
        &self,
        job_id: JobId,
        _job_group: &str,
        job_name: &str,
        case_id: CaseId,
    ) -> anyhow::Result<()> {
        let reminder = job_name.parse::<EventType>()?;
        self.send(job_id, case_id, reminder)
    }
}

impl std::fmt::Debug for ReminderJobExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderJobExecutor").finish_non_exhaustive()
    }
}
