//! The case event envelope consumed from the upstream feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tribunal_core::CaseId;

use crate::{CaseData, EventType};

/// A case event as delivered by the upstream case-event feed.
///
/// Notes:
/// - Events are **immutable** facts; the reminder subsystem only reads them.
/// - `case_data` is a snapshot of the case taken when the event was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvent {
    case_id: CaseId,
    event_type: EventType,
    occurred_at: DateTime<Utc>,
    #[serde(default)]
    case_data: CaseData,
}

impl CaseEvent {
    pub fn new(
        case_id: CaseId,
        event_type: EventType,
        occurred_at: DateTime<Utc>,
        case_data: CaseData,
    ) -> Self {
        Self {
            case_id,
            event_type,
            occurred_at,
            case_data,
        }
    }

    pub fn case_id(&self) -> CaseId {
        self.case_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn case_data(&self) -> &CaseData {
        &self.case_data
    }
}
