//! Error taxonomy for scheduling, dispatch and removal.

use thiserror::Error;

use super::types::JobId;

/// Failure of the trigger store itself (I/O, unavailability, poisoned state).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("trigger store already started")]
    AlreadyStarted,
}

/// Job subsystem error.
///
/// - configuration errors: a missing serializer or dispatch mapping, or a
///   stored payload that does not decode. Never worth retrying.
/// - not-found errors: the removal target does not exist.
/// - store errors: wrapped [`StoreError`].
/// - executor errors: the domain work inside a fired job failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("no payload serializer registered for type {type_name}")]
    NoSerializer { type_name: &'static str },

    #[error("a payload serializer is already registered for type {type_name}")]
    DuplicateSerializer { type_name: &'static str },

    #[error("failed to serialize payload of type {type_name}: {reason}")]
    Serialization {
        type_name: &'static str,
        reason: String,
    },

    #[error("cannot map payload: {payload}")]
    CannotMapPayload { payload: String },

    #[error("failed to deserialize payload of job {job_id}: {reason}")]
    Deserialization { job_id: JobId, reason: String },

    #[error("job {job_id} failed: {reason}")]
    Executor { job_id: JobId, reason: String },

    #[error("job not found: {job_id} in group {group}")]
    JobNotFound { job_id: JobId, group: String },

    #[error("no jobs found in group {0}")]
    GroupNotFound(String),

    #[error("trigger store error: {0}")]
    Store(#[from] StoreError),
}

impl JobError {
    /// "Nothing to remove" rather than a failure of the store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobError::JobNotFound { .. } | JobError::GroupNotFound(_))
    }

    /// Errors caused by how the process is wired up; retrying cannot help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            JobError::NoSerializer { .. }
                | JobError::DuplicateSerializer { .. }
                | JobError::CannotMapPayload { .. }
                | JobError::Deserialization { .. }
        )
    }

    pub fn is_store(&self) -> bool {
        matches!(self, JobError::Store(_))
    }
}
