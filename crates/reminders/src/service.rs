//! Routes case events to the reminder policies registered for their type.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use tribunal_events::{CaseEvent, EventType};
use tribunal_jobs::{JobRemover, JobScheduler};

use crate::all_remover::AllReminderRemover;
use crate::config::ReminderConfig;
use crate::error::ReminderResult;
use crate::evidence::EvidenceReminder;
use crate::handler::ReminderHandler;
use crate::hearing::HearingReminder;
use crate::hearing_remover::HearingReminderRemover;

/// Dispatch table `event type -> policies`, built once.
#[derive(Default)]
pub struct ReminderService {
    handlers: HashMap<EventType, Vec<Arc<dyn ReminderHandler>>>,
}

impl ReminderService {
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn ReminderHandler>>) -> Self {
        let mut table: HashMap<EventType, Vec<Arc<dyn ReminderHandler>>> = HashMap::new();
        for handler in handlers {
            for event_type in handler.handled_events() {
                table.entry(*event_type).or_default().push(handler.clone());
            }
        }
        Self { handlers: table }
    }

    /// The four standard policies.
    pub fn standard(config: &ReminderConfig, scheduler: JobScheduler, remover: JobRemover) -> Self {
        Self::new([
            Arc::new(EvidenceReminder::new(
                scheduler.clone(),
                config.evidence_reminder_delay,
            )) as Arc<dyn ReminderHandler>,
            Arc::new(HearingReminder::new(
                scheduler,
                remover.clone(),
                config.hearing_reminder_first_lead,
                config.hearing_reminder_second_lead,
            )),
            Arc::new(HearingReminderRemover::new(remover.clone())),
            Arc::new(AllReminderRemover::new(remover)),
        ])
    }

    /// Names of the policies registered for `event_type`, in order.
    pub fn handlers_for(&self, event_type: EventType) -> Vec<&'static str> {
        self.handlers
            .get(&event_type)
            .map(|hs| hs.iter().map(|h| h.name()).collect())
            .unwrap_or_default()
    }

    /// Run every applicable policy for `event` and return how many ran.
    ///
    /// A failing policy does not stop the others; the first error is
    /// returned once all have been tried.
    pub fn process(&self, event: &CaseEvent) -> ReminderResult<usize> {
        let Some(handlers) = self.handlers.get(&event.event_type()) else {
            debug!(event_type = %event.event_type(), "no reminder policy for event");
            return Ok(0);
        };

        let mut ran = 0;
        let mut first_error = None;
        for handler in handlers {
            if !handler.can_handle(event) || !handler.can_schedule(event) {
                continue;
            }

            ran += 1;
            match handler.handle(event) {
                Ok(outcome) => debug!(
                    case_id = %event.case_id(),
                    policy = handler.name(),
                    ?outcome,
                    "reminder policy applied"
                ),
                Err(e) => {
                    error!(
                        case_id = %event.case_id(),
                        policy = handler.name(),
                        error = %e,
                        "reminder policy failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(ran),
        }
    }
}

impl std::fmt::Debug for ReminderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<_> = self.handlers.keys().map(|e| e.id()).collect();
        events.sort_unstable();
        f.debug_struct("ReminderService").field("events", &events).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ReminderOutcome;
    use crate::test_support::{Harness, event, schedule_reminder};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tribunal_events::{CaseData, Hearing, HearingType};

    fn config() -> ReminderConfig {
        ReminderConfig {
            evidence_reminder_delay: Duration::days(1),
            hearing_reminder_first_lead: Duration::days(14),
            hearing_reminder_second_lead: Duration::days(2),
        }
    }

    struct Counting {
        events: &'static [EventType],
        calls: AtomicUsize,
    }

    impl ReminderHandler for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn handled_events(&self) -> &'static [EventType] {
            self.events
        }

        fn can_schedule(&self, _event: &CaseEvent) -> bool {
            true
        }

        fn handle(&self, _event: &CaseEvent) -> ReminderResult<ReminderOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ReminderOutcome::Scheduled(Vec::new()))
        }
    }

    #[test]
    fn only_policies_registered_for_the_event_run() {
        let postponement = Arc::new(Counting {
            events: &[EventType::Postponement],
            calls: AtomicUsize::new(0),
        });
        let booked = Arc::new(Counting {
            events: &[EventType::HearingBooked],
            calls: AtomicUsize::new(0),
        });
        let service = ReminderService::new([
            postponement.clone() as Arc<dyn ReminderHandler>,
            booked.clone() as Arc<dyn ReminderHandler>,
        ]);

        let ran = service
            .process(&event(EventType::Postponement, CaseData::default()))
            .unwrap();

        assert_eq!(ran, 1);
        assert_eq!(postponement.calls.load(Ordering::SeqCst), 1);
        assert_eq!(booked.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            service
                .process(&event(EventType::DecisionIssued, CaseData::default()))
                .unwrap(),
            0
        );
    }

    #[test]
    fn standard_table_covers_every_trigger_event() {
        let harness = Harness::new();
        let service =
            ReminderService::standard(&config(), harness.scheduler.clone(), harness.remover.clone());

        assert_eq!(service.handlers_for(EventType::DwpResponseReceived), vec!["evidence reminder"]);
        assert_eq!(service.handlers_for(EventType::HearingBooked), vec!["hearing reminder"]);
        assert_eq!(service.handlers_for(EventType::Postponement), vec!["hearing reminder remover"]);
        assert_eq!(service.handlers_for(EventType::AppealDormant), vec!["all reminder remover"]);
        assert!(service.handlers_for(EventType::HearingReminder).is_empty());
    }

    #[test]
    fn unschedulable_event_runs_nothing() {
        let harness = Harness::new();
        let service =
            ReminderService::standard(&config(), harness.scheduler.clone(), harness.remover.clone());

        let ran = service
            .process(&event(EventType::DwpResponseReceived, CaseData::default()))
            .unwrap();

        assert_eq!(ran, 0);
        assert!(harness.store.pending().unwrap().is_empty());
    }

    #[test]
    fn booking_then_postponing_leaves_no_hearing_reminder() {
        let harness = Harness::new();
        let service =
            ReminderService::standard(&config(), harness.scheduler.clone(), harness.remover.clone());
        schedule_reminder(&harness, EventType::EvidenceReminder);

        let at = Utc.with_ymd_and_hms(2099, 9, 9, 9, 0, 0).unwrap();
        let booked = CaseData::default()
            .with_hearing_type(HearingType::Oral)
            .with_hearing(Hearing::at(at));
        assert_eq!(service.process(&event(EventType::HearingBooked, booked)).unwrap(), 1);
        assert_eq!(harness.pending("12345_hearingReminder").len(), 2);

        assert_eq!(
            service
                .process(&event(EventType::Postponement, CaseData::default()))
                .unwrap(),
            1
        );
        assert!(harness.pending("12345_hearingReminder").is_empty());
        assert_eq!(harness.pending("12345_evidenceReminder").len(), 1);
    }
}
