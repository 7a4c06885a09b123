//! Retry policy.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(u32),
}

/// Immutable retry policy supplied with every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    per_attempt_timeout: Duration,
    backoff_delay: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        per_attempt_timeout: Duration,
        backoff_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::InvalidMaxAttempts(max_attempts));
        }
        Ok(Self {
            max_attempts,
            per_attempt_timeout,
            backoff_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }

    pub fn backoff_delay(&self) -> Duration {
        self.backoff_delay
    }

    /// Longest a fetch can take before it gives up.
    pub fn worst_case(&self) -> Duration {
        self.per_attempt_timeout * self.max_attempts + self.backoff_delay * (self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            per_attempt_timeout: Duration::from_millis(5000),
            backoff_delay: Duration::from_millis(1000),
        }
    }
}
