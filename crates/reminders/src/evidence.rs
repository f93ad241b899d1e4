//! Evidence reminder: sent a fixed delay after the DWP response.
//!
//! There is no matching remover policy. A scheduled evidence reminder is only
//! cancelled by the all-reminder remover on terminal events.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{Job, JobScheduler, group_key};

use crate::dates::dwp_response_received_at;
use crate::error::{ReminderError, ReminderResult};
use crate::handler::{ReminderHandler, ReminderOutcome, ensure_can_handle};
use crate::payload::ReminderPayload;

const HANDLED: &[EventType] = &[EventType::DwpResponseReceived, EventType::DwpUploadResponse];

#[derive(Debug, Clone)]
pub struct EvidenceReminder {
    scheduler: JobScheduler,
    delay: Duration,
}

impl EvidenceReminder {
    pub fn new(scheduler: JobScheduler, delay: Duration) -> Self {
        Self { scheduler, delay }
    }

    /// DWP response date plus the configured delay.
    pub fn trigger_at(&self, event: &CaseEvent) -> Option<DateTime<Utc>> {
        dwp_response_received_at(event.case_data())?.checked_add_signed(self.delay)
    }
}

impl ReminderHandler for EvidenceReminder {
    fn name(&self) -> &'static str {
        "evidence reminder"
    }

    fn handled_events(&self) -> &'static [EventType] {
        HANDLED
    }

    fn can_schedule(&self, event: &CaseEvent) -> bool {
        let schedulable = self.trigger_at(event).is_some();
        if !schedulable {
            info!(
                case_id = %event.case_id(),
                event_type = %event.event_type(),
                "no DWP response date, evidence reminder not scheduled"
            );
        }
        schedulable
    }

    fn handle(&self, event: &CaseEvent) -> ReminderResult<ReminderOutcome> {
        ensure_can_handle(self, event)?;

        let case_id = event.case_id();
        let trigger_at = self.trigger_at(event).ok_or(ReminderError::NoReminderDate {
            policy: self.name(),
            case_id,
        })?;

        let reminder = EventType::EvidenceReminder;
        let job_id = self.scheduler.schedule(Job::new(
            group_key(case_id, reminder),
            reminder.id(),
            ReminderPayload::new(case_id, reminder),
            trigger_at,
        ))?;

        Ok(ReminderOutcome::Scheduled(vec![job_id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, event};
    use chrono::{NaiveDate, TimeZone};
    use tribunal_events::CaseData;

    fn policy(harness: &Harness) -> EvidenceReminder {
        EvidenceReminder::new(harness.scheduler.clone(), Duration::days(3))
    }

    #[test]
    fn cannot_schedule_without_response_date() {
        let harness = Harness::new();
        let ev = event(EventType::DwpResponseReceived, CaseData::default());

        assert!(policy(&harness).can_handle(&ev));
        assert!(!policy(&harness).can_schedule(&ev));
        assert_eq!(
            policy(&harness).handle(&ev),
            Err(ReminderError::NoReminderDate {
                policy: "evidence reminder",
                case_id: ev.case_id(),
            })
        );
    }

    #[test]
    fn schedules_delay_after_response_date() {
        let harness = Harness::new();
        let ev = event(
            EventType::DwpUploadResponse,
            CaseData::default().with_dwp_response_date(NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()),
        );

        assert!(policy(&harness).can_schedule(&ev));
        let outcome = policy(&harness).handle(&ev).unwrap();

        let pending = harness.pending("12345_evidenceReminder");
        assert_eq!(outcome, ReminderOutcome::Scheduled(vec![pending[0].job_id]));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].description, "evidenceReminder");
        assert_eq!(pending[0].fire_at, Utc.with_ymd_and_hms(2030, 6, 4, 0, 0, 0).unwrap());
        assert_eq!(
            pending[0].payload,
            r#"{"caseId":12345,"reminder":"evidenceReminder"}"#
        );
    }

    #[test]
    fn other_events_are_rejected() {
        let harness = Harness::new();
        let ev = event(EventType::HearingBooked, CaseData::default());

        let err = policy(&harness).handle(&ev).unwrap_err();
        assert!(matches!(err, ReminderError::UnsupportedEvent { .. }));
        assert!(err.is_configuration());
        assert!(harness.pending("12345_evidenceReminder").is_empty());
    }
}
