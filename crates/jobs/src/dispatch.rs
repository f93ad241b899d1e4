//! Payload dispatch registry: serialized payload -> (deserializer, executor).
//!
//! Mappings are kept in registration order and the first one whose predicate
//! accepts the payload wins. When predicates overlap, anything registered
//! after the first matching mapping is unreachable for those payloads, so
//! register the most specific predicates first.

use std::marker::PhantomData;

use tracing::debug;

use super::codec::PayloadDeserializer;
use super::error::JobError;
use super::types::{JobId, TriggerRecord};

/// Runs the domain work of a fired job.
pub trait JobExecutor<T>: Send + Sync {
    fn execute(&self, job_id: JobId, job_group: &str, job_name: &str, payload: T)
    -> anyhow::Result<()>;
}

impl<T, F> JobExecutor<T> for F
where
    F: Fn(JobId, &str, &str, T) -> anyhow::Result<()> + Send + Sync,
{
    fn execute(
        &self,
        job_id: JobId,
        job_group: &str,
        job_name: &str,
        payload: T,
    ) -> anyhow::Result<()> {
        self(job_id, job_group, job_name, payload)
    }
}

/// Type-erased (deserializer, executor) pair.
trait PayloadRunner: Send + Sync {
    fn run(&self, trigger: &TriggerRecord) -> Result<(), JobError>;
}

struct TypedRunner<T, D, E> {
    deserializer: D,
    executor: E,
    _marker: PhantomData<fn() -> T>,
}

impl<T, D, E> PayloadRunner for TypedRunner<T, D, E>
where
    D: PayloadDeserializer<T>,
    E: JobExecutor<T>,
{
    fn run(&self, trigger: &TriggerRecord) -> Result<(), JobError> {
        let payload =
            self.deserializer
                .deserialize(&trigger.payload)
                .map_err(|e| JobError::Deserialization {
                    job_id: trigger.job_id,
                    reason: format!("{e:#}"),
                })?;

        self.executor
            .execute(
                trigger.job_id,
                &trigger.job_group,
                &trigger.description,
                payload,
            )
            .map_err(|e| JobError::Executor {
                job_id: trigger.job_id,
                reason: format!("{e:#}"),
            })
    }
}

struct DispatchMapping {
    name: String,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
    runner: Box<dyn PayloadRunner>,
}

/// Ordered dispatch table for fired jobs.
#[derive(Default)]
pub struct JobDispatcher {
    mappings: Vec<DispatchMapping>,
}

impl JobDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. `name` is only used for logging.
    pub fn register<T, P, D, E>(
        &mut self,
        name: impl Into<String>,
        predicate: P,
        deserializer: D,
        executor: E,
    ) where
        T: 'static,
        P: Fn(&str) -> bool + Send + Sync + 'static,
        D: PayloadDeserializer<T> + 'static,
        E: JobExecutor<T> + 'static,
    {
        self.mappings.push(DispatchMapping {
            name: name.into(),
            predicate: Box::new(predicate),
            runner: Box::new(TypedRunner {
                deserializer,
                executor,
                _marker: PhantomData,
            }),
        });
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mapping names in evaluation order.
    pub fn mapping_names(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.name.as_str()).collect()
    }

    /// Route a fired trigger to the first mapping accepting its payload.
    pub fn dispatch(&self, trigger: &TriggerRecord) -> Result<(), JobError> {
        let mapping = self
            .mappings
            .iter()
            .find(|m| (m.predicate)(&trigger.payload))
            .ok_or_else(|| JobError::CannotMapPayload {
                payload: trigger.payload.clone(),
            })?;

        debug!(job_id = %trigger.job_id, mapping = %mapping.name, "dispatching job");
        mapping.runner.run(trigger)
    }
}

impl std::fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("mappings", &self.mapping_names())
            .finish()
    }
}
