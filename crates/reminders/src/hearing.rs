//! Hearing reminders: two reminders ahead of the next booked hearing.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use tribunal_events::{CaseData, CaseEvent, EventType, Hearing, HearingType};
use tribunal_jobs::{Job, JobId, JobRemover, JobScheduler, group_key};

use crate::error::{ReminderError, ReminderResult};
use crate::handler::{ReminderHandler, ReminderOutcome, ensure_can_handle};
use crate::payload::ReminderPayload;

const HANDLED: &[EventType] = &[EventType::HearingBooked];

#[derive(Debug, Clone)]
pub struct HearingReminder {
    scheduler: JobScheduler,
    remover: JobRemover,
    first_lead: Duration,
    second_lead: Duration,
    allowed_hearing_types: Vec<HearingType>,
}

impl HearingReminder {
    /// Reminds for oral hearings only; see [`Self::with_allowed_hearing_types`].
    pub fn new(
        scheduler: JobScheduler,
        remover: JobRemover,
        first_lead: Duration,
        second_lead: Duration,
    ) -> Self {
        Self {
            scheduler,
            remover,
            first_lead,
            second_lead,
            allowed_hearing_types: vec![HearingType::Oral],
        }
    }

    pub fn with_allowed_hearing_types(
        mut self,
        hearing_types: impl IntoIterator<Item = HearingType>,
    ) -> Self {
        self.allowed_hearing_types = hearing_types.into_iter().collect();
        self
    }

    /// Most recently booked hearing that is still ahead of `now`.
    pub fn next_hearing(case_data: &CaseData, now: DateTime<Utc>) -> Option<&Hearing> {
        case_data
            .hearings
            .iter()
            .rev()
            .find(|h| h.hearing_date_time > now)
    }

    /// Best-effort removal of reminders scheduled before a failure.
    fn roll_back(&self, scheduled: &[JobId], group: &str) {
        for job_id in scheduled {
            if let Err(e) = self.remover.remove(*job_id, group) {
                warn!(job_id = %job_id, group, error = %e, "failed to roll back hearing reminder");
            }
        }
    }
}

impl ReminderHandler for HearingReminder {
    fn name(&self) -> &'static str {
        "hearing reminder"
    }

    fn handled_events(&self) -> &'static [EventType] {
        HANDLED
    }

    fn can_handle(&self, event: &CaseEvent) -> bool {
        HANDLED.contains(&event.event_type())
            && event
                .case_data()
                .hearing_type
                .is_some_and(|t| self.allowed_hearing_types.contains(&t))
    }

    fn can_schedule(&self, event: &CaseEvent) -> bool {
        let schedulable = Self::next_hearing(event.case_data(), Utc::now()).is_some();
        if !schedulable {
            info!(case_id = %event.case_id(), "no future hearing, hearing reminder not scheduled");
        }
        schedulable
    }

    fn handle(&self, event: &CaseEvent) -> ReminderResult<ReminderOutcome> {
        ensure_can_handle(self, event)?;

        let case_id = event.case_id();
        let no_date = || ReminderError::NoReminderDate {
            policy: self.name(),
            case_id,
        };
        let hearing_at = Self::next_hearing(event.case_data(), Utc::now())
            .ok_or_else(no_date)?
            .hearing_date_time;

        let reminder = EventType::HearingReminder;
        let group = group_key(case_id, reminder);
        let mut scheduled = Vec::with_capacity(2);
        for lead in [self.first_lead, self.second_lead] {
            let result = hearing_at
                .checked_sub_signed(lead)
                .ok_or_else(no_date)
                .and_then(|trigger_at| {
                    self.scheduler
                        .schedule(Job::new(
                            group.clone(),
                            reminder.id(),
                            ReminderPayload::new(case_id, reminder),
                            trigger_at,
                        ))
                        .map_err(ReminderError::from)
                });

            match result {
                Ok(job_id) => scheduled.push(job_id),
                Err(e) => {
                    // Either both reminders are pending or neither is.
                    self.roll_back(&scheduled, &group);
                    return Err(e);
                }
            }
        }

        Ok(ReminderOutcome::Scheduled(scheduled))
    }
}
