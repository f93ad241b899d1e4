//! Job scheduling.

use std::sync::Arc;

use tracing::info;

use super::error::JobError;
use super::serializers::PayloadSerializers;
use super::store::TriggerStore;
use super::types::{Job, JobId, TriggerRecord};

/// Accepts jobs and persists their triggers.
#[derive(Clone)]
pub struct JobScheduler {
    store: Arc<dyn TriggerStore>,
    serializers: Arc<PayloadSerializers>,
}

impl JobScheduler {
    pub fn new(store: Arc<dyn TriggerStore>, serializers: Arc<PayloadSerializers>) -> Self {
        Self { store, serializers }
    }

    /// Schedule `job` and return its freshly generated id.
    ///
    /// The payload is serialized before the store is touched, so a missing or
    /// failing serializer leaves no trigger behind.
    pub fn schedule<T: 'static>(&self, job: Job<T>) -> Result<JobId, JobError> {
        let payload = self.serializers.serialize(job.payload())?;
        let job_id = JobId::new();

        self.store.persist(TriggerRecord::first_attempt(
            job_id,
            job.group(),
            job.name(),
            payload,
            job.trigger_at(),
        ))?;

        info!(
            job_id = %job_id,
            group = %job.group(),
            name = %job.name(),
            trigger_at = %job.trigger_at(),
            "job scheduled"
        );
        Ok(job_id)
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("serializers", &self.serializers)
            .finish_non_exhaustive()
    }
}
