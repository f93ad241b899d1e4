//! Reminder timing configuration.

use chrono::Duration;

use tribunal_jobs::config::{ConfigError, required_u64};

pub const EVIDENCE_REMINDER_DELAY_SECONDS: &str = "EVIDENCE_REMINDER_DELAY_SECONDS";
pub const HEARING_REMINDER_FIRST_LEAD_SECONDS: &str = "HEARING_REMINDER_FIRST_LEAD_SECONDS";
pub const HEARING_REMINDER_SECOND_LEAD_SECONDS: &str = "HEARING_REMINDER_SECOND_LEAD_SECONDS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Added to the DWP response date.
    pub evidence_reminder_delay: Duration,
    /// Subtracted from the hearing date-time for the first reminder.
    pub hearing_reminder_first_lead: Duration,
    /// Subtracted from the hearing date-time for the second reminder.
    pub hearing_reminder_second_lead: Duration,
}

impl ReminderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            evidence_reminder_delay: seconds(&lookup, EVIDENCE_REMINDER_DELAY_SECONDS)?,
            hearing_reminder_first_lead: seconds(&lookup, HEARING_REMINDER_FIRST_LEAD_SECONDS)?,
            hearing_reminder_second_lead: seconds(&lookup, HEARING_REMINDER_SECOND_LEAD_SECONDS)?,
        })
    }
}

fn seconds<F>(lookup: &F, key: &'static str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = required_u64(lookup, key)?;
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "out of range",
        })
}
