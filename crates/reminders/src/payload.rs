//! Stored form of reminder jobs and its registry wiring.
//!
//! Reminder jobs are persisted as `{"caseId":..,"reminder":".."}`. Triggers
//! written by older deployments hold only the bare case id; those take the
//! reminder type from the job name.

use serde::{Deserialize, Serialize};

use tribunal_core::CaseId;
use tribunal_events::EventType;
use tribunal_jobs::{JobDispatcher, JobError, JsonCodec, PayloadSerializers};

use crate::executor::ReminderJobExecutor;

/// Payload of a reminder job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub case_id: CaseId,
    pub reminder: EventType,
}

impl ReminderPayload {
    pub fn new(case_id: CaseId, reminder: EventType) -> Self {
        Self { case_id, reminder }
    }
}

pub fn is_json_payload(payload: &str) -> bool {
    payload.trim_start().starts_with('{')
}

pub fn is_legacy_payload(payload: &str) -> bool {
    let trimmed = payload.trim();
    !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
}

fn decode_legacy(payload: &str) -> anyhow::Result<CaseId> {
    Ok(payload.parse::<CaseId>()?)
}

/// Register the serializer for [`ReminderPayload`].
pub fn register_serializer(serializers: &mut PayloadSerializers) -> Result<(), JobError> {
    serializers.register::<ReminderPayload, _>(JsonCodec)
}

/// Register the reminder mappings, JSON first.
pub fn register_dispatch(dispatcher: &mut JobDispatcher, executor: ReminderJobExecutor) {
    dispatcher.register::<ReminderPayload, _, _, _>(
        "reminder-json",
        is_json_payload,
        JsonCodec,
        executor.clone(),
    );
    dispatcher.register::<CaseId, _, _, _>(
        "reminder-legacy-case-id",
        is_legacy_payload,
        decode_legacy,
        executor,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_camel_case_json() {
        let payload = ReminderPayload::new(CaseId::new(1234567890123456), EventType::HearingReminder);
        let mut serializers = PayloadSerializers::new();
        register_serializer(&mut serializers).unwrap();

        assert_eq!(
            serializers.serialize(&payload).unwrap(),
            r#"{"caseId":1234567890123456,"reminder":"hearingReminder"}"#
        );
    }

    #[test]
    fn predicates_do_not_overlap() {
        let json = r#"{"caseId":1,"reminder":"evidenceReminder"}"#;
        assert!(is_json_payload(json));
        assert!(!is_legacy_payload(json));

        assert!(is_legacy_payload("1234567890123456"));
        assert!(!is_json_payload("1234567890123456"));

        assert!(!is_legacy_payload(""));
        assert!(!is_legacy_payload("12a"));
    }
}
