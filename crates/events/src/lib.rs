pub mod case_data;
pub mod envelope;
pub mod event;

pub use case_data::{CaseData, CaseHistoryEntry, Hearing, HearingType};
pub use envelope::CaseEvent;
pub use event::{EventType, UnknownEventType};
