//! Retry policy for idempotent calls to external collaborators.
//!
//! Classifier and skill calls do not touch the session store, so they can be
//! re-issued safely. Each attempt runs under its own timeout; only errors
//! that report themselves retryable are tried again, after a fixed backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::ports::{NluError, SkillError};

/// Errors the policy knows how to classify.
pub trait Retryable: Display {
    fn is_retryable(&self) -> bool;

    /// The error reported when an attempt exceeds its timeout.
    fn timed_out(after: Duration) -> Self;
}

impl Retryable for NluError {
    fn is_retryable(&self) -> bool {
        NluError::is_retryable(self)
    }

    fn timed_out(after: Duration) -> Self {
        NluError::Timeout {
            timeout_ms: after.as_millis() as u64,
        }
    }
}

impl Retryable for SkillError {
    fn is_retryable(&self) -> bool {
        SkillError::is_retryable(self)
    }

    fn timed_out(after: Duration) -> Self {
        SkillError::Timeout {
            timeout_ms: after.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first; at least 1.
    pub max_attempts: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts
    /// run out. `what` names the call in logs.
    pub async fn call<T, E, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(self.timeout)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(call = what, attempt, error = %err, "Retrying failed call");
                    sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
