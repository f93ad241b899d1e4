//! Trigger store abstraction.
//!
//! The store is the only shared mutable resource of the job subsystem. It
//! persists triggers, fires them at or after their `fire_at` (at-least-once),
//! and never fires the same job id twice concurrently.

mod in_memory;

pub use in_memory::{InMemoryTriggerStore, StoreConfig};

use std::sync::Arc;

use super::error::StoreError;
use super::types::{JobId, JobKey, TriggerRecord};

/// Invoked by the store on one of its worker threads when a trigger fires.
pub trait FireCallback: Send + Sync {
    fn on_fire(&self, trigger: TriggerRecord);
}

impl<F> FireCallback for F
where
    F: Fn(TriggerRecord) + Send + Sync,
{
    fn on_fire(&self, trigger: TriggerRecord) {
        self(trigger)
    }
}

/// Durable trigger storage plus the worker pool that fires triggers.
pub trait TriggerStore: Send + Sync {
    /// Persist a trigger. A pending trigger with the same key is replaced.
    fn persist(&self, trigger: TriggerRecord) -> Result<(), StoreError>;

    /// Delete one pending trigger. Returns `false` if none had that key.
    fn delete(&self, key: &JobKey) -> Result<bool, StoreError>;

    /// Delete every pending trigger of `group`, returning their ids (empty if
    /// the group had none).
    fn delete_group(&self, group: &str) -> Result<Vec<JobId>, StoreError>;

    /// Start firing triggers into `callback`.
    fn start(&self, callback: Arc<dyn FireCallback>) -> Result<(), StoreError>;

    /// Stop firing. With `wait_for_in_flight`, blocks until running
    /// executions are done.
    fn stop(&self, wait_for_in_flight: bool) -> Result<(), StoreError>;
}

impl<S> TriggerStore for Arc<S>
where
    S: TriggerStore + ?Sized,
{
    fn persist(&self, trigger: TriggerRecord) -> Result<(), StoreError> {
        (**self).persist(trigger)
    }

    fn delete(&self, key: &JobKey) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn delete_group(&self, group: &str) -> Result<Vec<JobId>, StoreError> {
        (**self).delete_group(group)
    }

    fn start(&self, callback: Arc<dyn FireCallback>) -> Result<(), StoreError> {
        (**self).start(callback)
    }

    fn stop(&self, wait_for_in_flight: bool) -> Result<(), StoreError> {
        (**self).stop(wait_for_in_flight)
    }
}
