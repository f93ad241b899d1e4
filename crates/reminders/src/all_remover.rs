//! Cancellation of every reminder once a case reaches a terminal event.

use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{JobRemover, group_key};

use crate::error::ReminderResult;
use crate::handler::{ReminderHandler, ReminderOutcome, ensure_can_handle, remove_reminder_group};

/// Events after which a case needs no further reminders.
pub const TERMINAL_EVENTS: &[EventType] = &[
    EventType::AppealLapsed,
    EventType::AppealWithdrawn,
    EventType::AdminAppealWithdrawn,
    EventType::AppealDormant,
    EventType::DecisionIssued,
    EventType::IssueFinalDecision,
    EventType::StruckOut,
    EventType::AppealClosed,
];

const REMINDER_GROUPS: [EventType; 2] = [EventType::HearingReminder, EventType::EvidenceReminder];

/// Cancels every reminder of a case once the case reaches a terminal event.
#[derive(Debug, Clone)]
pub struct AllReminderRemover {
    remover: JobRemover,
}

impl AllReminderRemover {
    pub fn new(remover: JobRemover) -> Self {
        Self { remover }
    }
}

impl ReminderHandler for AllReminderRemover {
    fn name(&self) -> &'static str {
        "all reminder remover"
    }

    fn handled_events(&self) -> &'static [EventType] {
        TERMINAL_EVENTS
    }

    fn can_schedule(&self, _event: &CaseEvent) -> bool {
        true
    }

    fn handle(&self, event: &CaseEvent) -> ReminderResult<ReminderOutcome> {
        ensure_can_handle(self, event)?;

        let mut removed = Vec::new();
        for reminder in REMINDER_GROUPS {
            let group = group_key(event.case_id(), reminder);
            removed.extend(remove_reminder_group(&self.remover, &group)?);
        }
        Ok(ReminderOutcome::Removed(removed))
    }
}
