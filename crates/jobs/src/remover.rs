//! Job cancellation.

use std::sync::Arc;

use tracing::info;

use super::error::JobError;
use super::store::TriggerStore;
use super::types::{JobId, JobKey};

/// Cancels pending jobs, one at a time or a whole group at once.
#[derive(Clone)]
pub struct JobRemover {
    store: Arc<dyn TriggerStore>,
}

impl JobRemover {
    pub fn new(store: Arc<dyn TriggerStore>) -> Self {
        Self { store }
    }

    pub fn remove(&self, job_id: JobId, job_group: &str) -> Result<(), JobError> {
        let found = self.store.delete(&JobKey::new(job_id, job_group))?;
        if !found {
            return Err(JobError::JobNotFound {
                job_id,
                group: job_group.to_string(),
            });
        }

        info!(job_id = %job_id, group = %job_group, "job removed");
        Ok(())
    }

    /// Remove every pending job of `job_group`, returning the removed ids.
    pub fn remove_group(&self, job_group: &str) -> Result<Vec<JobId>, JobError> {
        let removed = self.store.delete_group(job_group)?;
        if removed.is_empty() {
            return Err(JobError::GroupNotFound(job_group.to_string()));
        }

        info!(group = %job_group, count = removed.len(), "job group removed");
        Ok(removed)
    }
}

impl std::fmt::Debug for JobRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRemover").finish_non_exhaustive()
    }
}
