use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a case event raised by the case-management platform.
///
/// Only the categories the reminder subsystem reacts to (or schedules) are
/// modelled; the identifiers match the platform's event ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    DwpResponseReceived,
    DwpUploadResponse,
    HearingBooked,
    Postponement,
    AppealLapsed,
    AppealWithdrawn,
    AdminAppealWithdrawn,
    AppealDormant,
    DecisionIssued,
    IssueFinalDecision,
    StruckOut,
    AppealClosed,
    /// Reminder sent some time after the DWP response, asking for evidence.
    EvidenceReminder,
    /// Reminder sent ahead of a booked hearing.
    HearingReminder,
}

impl EventType {
    pub const ALL: [EventType; 14] = [
        EventType::DwpResponseReceived,
        EventType::DwpUploadResponse,
        EventType::HearingBooked,
        EventType::Postponement,
        EventType::AppealLapsed,
        EventType::AppealWithdrawn,
        EventType::AdminAppealWithdrawn,
        EventType::AppealDormant,
        EventType::DecisionIssued,
        EventType::IssueFinalDecision,
        EventType::StruckOut,
        EventType::AppealClosed,
        EventType::EvidenceReminder,
        EventType::HearingReminder,
    ];

    /// Stable identifier as used by the platform (and in job group keys).
    pub fn id(&self) -> &'static str {
        match self {
            EventType::DwpResponseReceived => "dwpResponseReceived",
            EventType::DwpUploadResponse => "dwpUploadResponse",
            EventType::HearingBooked => "hearingBooked",
            EventType::Postponement => "postponement",
            EventType::AppealLapsed => "appealLapsed",
            EventType::AppealWithdrawn => "appealWithdrawn",
            EventType::AdminAppealWithdrawn => "adminAppealWithdrawn",
            EventType::AppealDormant => "appealDormant",
            EventType::DecisionIssued => "decisionIssued",
            EventType::IssueFinalDecision => "issueFinalDecision",
            EventType::StruckOut => "struckOut",
            EventType::AppealClosed => "appealClosed",
            EventType::EvidenceReminder => "evidenceReminder",
            EventType::HearingReminder => "hearingReminder",
        }
    }

    /// Reminder notifications are scheduled by this subsystem rather than
    /// raised by the platform.
    pub fn is_reminder(&self) -> bool {
        matches!(self, EventType::EvidenceReminder | EventType::HearingReminder)
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_serde_names() {
        for t in EventType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.id()));
        }
    }

    #[test]
    fn parses_known_ids_and_rejects_unknown() {
        assert_eq!("hearingReminder".parse::<EventType>().unwrap(), EventType::HearingReminder);
        assert_eq!(
            "nope".parse::<EventType>().unwrap_err(),
            UnknownEventType("nope".to_string())
        );
    }

    #[test]
    fn only_reminders_are_reminders() {
        let reminders: Vec<_> = EventType::ALL.into_iter().filter(EventType::is_reminder).collect();
        assert_eq!(reminders, vec![EventType::EvidenceReminder, EventType::HearingReminder]);
    }
}
