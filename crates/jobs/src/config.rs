//! Environment configuration for the job subsystem.
//!
//! Values are read through a lookup function so tests can pass a map
//! instead of touching the process environment.

use std::time::Duration;

use thiserror::Error;

use super::retry::RetryPolicy;
use super::store::StoreConfig;

pub const JOB_MAX_ATTEMPTS: &str = "JOB_MAX_ATTEMPTS";
pub const JOB_RETRY_DELAY_SECONDS: &str = "JOB_RETRY_DELAY_SECONDS";
pub const JOB_WORKER_THREADS: &str = "JOB_WORKER_THREADS";
pub const JOB_POLL_INTERVAL_MS: &str = "JOB_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required configuration {key}")]
    Missing { key: &'static str },

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Read a required non-negative integer.
pub fn required_u64<F>(lookup: &F, key: &'static str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional_u64(lookup, key)?.ok_or(ConfigError::Missing { key })
}

/// Read an optional non-negative integer. Blank counts as unset.
pub fn optional_u64<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: "must be a non-negative integer",
        })
}

/// Job subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub retry: RetryPolicy,
    pub store: StoreConfig,
}

impl JobConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_attempts = required_u64(&lookup, JOB_MAX_ATTEMPTS)?;
        let max_attempts = u32::try_from(max_attempts)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::Invalid {
                key: JOB_MAX_ATTEMPTS,
                value: max_attempts.to_string(),
                reason: "must be between 1 and 4294967295",
            })?;
        let retry_delay = required_u64(&lookup, JOB_RETRY_DELAY_SECONDS)?;
        if i64::try_from(retry_delay)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .is_none()
        {
            return Err(ConfigError::Invalid {
                key: JOB_RETRY_DELAY_SECONDS,
                value: retry_delay.to_string(),
                reason: "out of range",
            });
        }

        let defaults = StoreConfig::default();
        let worker_threads = match optional_u64(&lookup, JOB_WORKER_THREADS)? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key: JOB_WORKER_THREADS,
                    value: "0".to_string(),
                    reason: "must be at least 1",
                });
            }
            Some(n) => n as usize,
            None => defaults.worker_threads,
        };
        let poll_interval = optional_u64(&lookup, JOB_POLL_INTERVAL_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        Ok(Self {
            retry: RetryPolicy::fixed(max_attempts, Duration::from_secs(retry_delay)),
            store: StoreConfig::default()
                .with_worker_threads(worker_threads)
                .with_poll_interval(poll_interval),
        })
    }
}
