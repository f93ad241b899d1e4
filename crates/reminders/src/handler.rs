//! Reminder policy contract.

use tracing::debug;

use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{JobError, JobId, JobRemover};

use crate::error::{ReminderError, ReminderResult};

/// What a policy did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Scheduled(Vec<JobId>),
    Removed(Vec<JobId>),
}

/// Decides whether and when a case event schedules or cancels reminders.
pub trait ReminderHandler: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Event types this policy reacts to.
    fn handled_events(&self) -> &'static [EventType];

    fn can_handle(&self, event: &CaseEvent) -> bool {
        self.handled_events().contains(&event.event_type())
    }

    /// Whether the event's case data yields something to do. Never fails;
    /// missing data is logged and reported as `false`.
    fn can_schedule(&self, event: &CaseEvent) -> bool;

    /// Schedule or cancel. Fails with [`ReminderError::UnsupportedEvent`] if
    /// `can_handle` is false.
    fn handle(&self, event: &CaseEvent) -> ReminderResult<ReminderOutcome>;
}

pub(crate) fn ensure_can_handle<H>(handler: &H, event: &CaseEvent) -> ReminderResult<()>
where
    H: ReminderHandler + ?Sized,
{
    if handler.can_handle(event) {
        Ok(())
    } else {
        Err(ReminderError::UnsupportedEvent {
            policy: handler.name(),
            event_type: event.event_type(),
            case_id: event.case_id(),
        })
    }
}

/// Remove a reminder group; an absent group is not an error.
pub(crate) fn remove_reminder_group(
    remover: &JobRemover,
    group: &str,
) -> Result<Vec<JobId>, JobError> {
    match remover.remove_group(group) {
        Ok(removed) => Ok(removed),
        Err(e) if e.is_not_found() => {
            debug!(group = %group, "no reminders to cancel");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
