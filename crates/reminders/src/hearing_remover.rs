//! Cancellation of hearing reminders on postponement.

use tracing::info;

use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{JobRemover, group_key};

use crate::error::ReminderResult;
use crate::handler::{ReminderHandler, ReminderOutcome, ensure_can_handle, remove_reminder_group};

const HANDLED: &[EventType] = &[EventType::Postponement];

/// Cancels a case's hearing reminders when its hearing is postponed.
#[derive(Debug, Clone)]
pub struct HearingReminderRemover {
    remover: JobRemover,
}

impl HearingReminderRemover {
    pub fn new(remover: JobRemover) -> Self {
        Self { remover }
    }
}

impl ReminderHandler for HearingReminderRemover {
    fn name(&self) -> &'static str {
        "hearing reminder remover"
    }

    fn handled_events(&self) -> &'static [EventType] {
        HANDLED
    }

    fn can_schedule(&self, _event: &CaseEvent) -> bool {
        true
    }

    fn handle(&self, event: &CaseEvent) -> ReminderResult<ReminderOutcome> {
        ensure_can_handle(self, event)?;

        let group = group_key(event.case_id(), EventType::HearingReminder);
        let removed = remove_reminder_group(&self.remover, &group)?;
        if removed.is_empty() {
            info!(case_id = %event.case_id(), "no hearing reminders scheduled for postponed case");
        }
        Ok(ReminderOutcome::Removed(removed))
    }
}
