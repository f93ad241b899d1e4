//! Durable job scheduling with bounded retry and group cancellation.
//!
//! ## Design
//!
//! - Jobs carry a typed payload; the serialization registry turns it into the
//!   string the trigger store keeps
//! - Fired triggers are routed back to typed executors by an ordered list of
//!   payload predicates (first match wins)
//! - Failed executions are retried with a fixed delay up to a maximum number
//!   of attempts; configuration failures are never retried
//! - Jobs of one case and category share a group key and can be cancelled
//!   together
//!
//! ## Components
//!
//! - `JobScheduler`: serializes and persists new jobs
//! - `JobExecutionEngine`: fire callback, dispatches and reports outcomes
//! - `FailureRescheduler`: re-enqueues failed jobs per `RetryPolicy`
//! - `JobRemover`: cancels one job or a whole group
//! - `TriggerStore`: persistence and firing (`InMemoryTriggerStore`)

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod group;
pub mod remover;
pub mod retry;
pub mod scheduler;
pub mod serializers;
pub mod store;
pub mod types;

pub use codec::{JsonCodec, PayloadDeserializer, PayloadSerializer};
pub use config::{ConfigError, JobConfig};
pub use dispatch::{JobDispatcher, JobExecutor};
pub use error::{JobError, StoreError};
pub use execution::JobExecutionEngine;
pub use group::group_key;
pub use remover::JobRemover;
pub use retry::{ExecutionListener, FailureRescheduler, RetryDecision, RetryPolicy};
pub use scheduler::JobScheduler;
pub use serializers::PayloadSerializers;
pub use store::{FireCallback, InMemoryTriggerStore, StoreConfig, TriggerStore};
pub use types::{Job, JobId, JobKey, TriggerRecord};
