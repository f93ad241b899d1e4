//! Case-data date extraction.

use chrono::{DateTime, NaiveTime, Utc};

use tribunal_events::{CaseData, EventType};

/// When the DWP response was received for the case.
///
/// The explicit `dwpResponseDate` field wins (taken at midnight UTC).
/// Otherwise the latest DWP response event in the case history is used.
pub fn dwp_response_received_at(case_data: &CaseData) -> Option<DateTime<Utc>> {
    if let Some(date) = case_data.dwp_response_date {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    case_data
        .events
        .iter()
        .filter(|e| {
            matches!(
                e.event_type,
                EventType::DwpResponseReceived | EventType::DwpUploadResponse
            )
        })
        .map(|e| e.occurred_at)
        .max()
}
