//! Core job types.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Identity of one trigger in the store: job id plus group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub id: JobId,
    pub group: String,
}

impl JobKey {
    pub fn new(id: JobId, group: impl Into<String>) -> Self {
        Self {
            id,
            group: group.into(),
        }
    }
}

/// A unit of deferred work, not yet handed to the scheduler.
///
/// Immutable once built; `JobScheduler::schedule` consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<T> {
    group: String,
    name: String,
    payload: T,
    trigger_at: DateTime<Utc>,
}

impl<T> Job<T> {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        payload: T,
        trigger_at: DateTime<Utc>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            payload,
            trigger_at,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn trigger_at(&self) -> DateTime<Utc> {
        self.trigger_at
    }
}

/// Trigger as persisted by the store.
///
/// `attempt` is 1-based and only ever grows: each reschedule after a failure
/// produces a record with `attempt + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub job_id: JobId,
    pub job_group: String,
    /// The job name.
    pub description: String,
    /// Serialized payload, exactly as produced by the registered serializer.
    pub payload: String,
    pub attempt: u32,
    /// Earliest time the trigger may fire.
    pub fire_at: DateTime<Utc>,
}

impl TriggerRecord {
    pub fn first_attempt(
        job_id: JobId,
        job_group: impl Into<String>,
        description: impl Into<String>,
        payload: impl Into<String>,
        fire_at: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id,
            job_group: job_group.into(),
            description: description.into(),
            payload: payload.into(),
            attempt: 1,
            fire_at,
        }
    }

    /// Same job identity and payload, one attempt further, firing at `fire_at`.
    pub fn next_attempt(&self, fire_at: DateTime<Utc>) -> Self {
        Self {
            attempt: self.attempt + 1,
            fire_at,
            ..self.clone()
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.job_id, self.job_group.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<JobId>().unwrap(), a);
    }

    #[test]
    fn next_attempt_keeps_identity() {
        let now = Utc::now();
        let first = TriggerRecord::first_attempt(JobId::new(), "g", "name", "{}", now);
        assert_eq!(first.attempt, 1);

        let later = now + chrono::Duration::seconds(10);
        let second = first.next_attempt(later);
        assert_eq!(second.attempt, 2);
        assert_eq!(second.key(), first.key());
        assert_eq!(second.description, first.description);
        assert_eq!(second.payload, first.payload);
        assert_eq!(second.fire_at, later);
    }
}
