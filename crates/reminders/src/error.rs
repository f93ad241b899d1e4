//! Errors raised by reminder policies.

use thiserror::Error;

use tribunal_core::CaseId;
use tribunal_events::EventType;
use tribunal_jobs::JobError;

/// Reminder policy error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderError {
    /// A policy was asked to handle an event it does not handle.
    #[error("{policy} cannot handle {event_type} event of case {case_id}")]
    UnsupportedEvent {
        policy: &'static str,
        event_type: EventType,
        case_id: CaseId,
    },

    #[error("{policy}: no reminder date can be derived for case {case_id}")]
    NoReminderDate {
        policy: &'static str,
        case_id: CaseId,
    },

    #[error(transparent)]
    Job(#[from] JobError),
}

impl ReminderError {
    /// Wiring mistakes; the same call will fail again.
    pub fn is_configuration(&self) -> bool {
        match self {
            ReminderError::UnsupportedEvent { .. } => true,
            ReminderError::NoReminderDate { .. } => false,
            ReminderError::Job(e) => e.is_configuration(),
        }
    }
}

pub type ReminderResult<T> = Result<T, ReminderError>;
