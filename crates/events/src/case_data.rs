//! Read-only view of the case fields the reminder subsystem relies on.
//!
//! The full case model belongs to the business layer; this is the subset it
//! hands over with every event.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::EventType;

/// How a hearing is held.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HearingType {
    Oral,
    Paper,
    Video,
    Telephone,
    FaceToFace,
}

/// A booked hearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
    #[serde(default)]
    pub hearing_id: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    pub hearing_date_time: DateTime<Utc>,
}

impl Hearing {
    pub fn at(hearing_date_time: DateTime<Utc>) -> Self {
        Self {
            hearing_id: None,
            venue: None,
            hearing_date_time,
        }
    }
}

/// An entry of the case's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseHistoryEntry {
    pub event_type: EventType,
    pub occurred_at: DateTime<Utc>,
}

/// Case fields visible to reminder policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    #[serde(default)]
    pub hearing_type: Option<HearingType>,
    /// Hearings in booking order (most recently booked last).
    #[serde(default)]
    pub hearings: Vec<Hearing>,
    #[serde(default)]
    pub dwp_response_date: Option<NaiveDate>,
    #[serde(default)]
    pub events: Vec<CaseHistoryEntry>,
}

impl CaseData {
    pub fn with_hearing_type(mut self, hearing_type: HearingType) -> Self {
        self.hearing_type = Some(hearing_type);
        self
    }

    pub fn with_hearing(mut self, hearing: Hearing) -> Self {
        self.hearings.push(hearing);
        self
    }

    pub fn with_dwp_response_date(mut self, date: NaiveDate) -> Self {
        self.dwp_response_date = Some(date);
        self
    }

    pub fn with_history(mut self, event_type: EventType, occurred_at: DateTime<Utc>) -> Self {
        self.events.push(CaseHistoryEntry {
            event_type,
            occurred_at,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deserializes_platform_shape_with_missing_fields() {
        let json = r#"{
            "hearingType": "oral",
            "hearings": [
                { "hearingId": "h1", "venue": "Leeds", "hearingDateTime": "2030-05-01T10:00:00Z" }
            ]
        }"#;

        let data: CaseData = serde_json::from_str(json).unwrap();
        assert_eq!(data.hearing_type, Some(HearingType::Oral));
        assert_eq!(data.hearings.len(), 1);
        assert_eq!(
            data.hearings[0].hearing_date_time,
            Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap()
        );
        assert!(data.dwp_response_date.is_none());
        assert!(data.events.is_empty());
    }
}
