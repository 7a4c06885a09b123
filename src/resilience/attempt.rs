//! Retry state machine.
//!
//! # State Transitions
//! ```text
//! Attempt{1, None} --fail--> Retry{delay} --> Attempt{2, Some(cause)} ...
//! Attempt{max, _}  --fail--> Exhausted(FetchError)
//! ```
//!
//! Transitions are pure. The fetcher owns all waiting.

use std::fmt;
use std::time::Duration;

use crate::resilience::policy::RetryPolicy;

/// Why a single attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    NetworkError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed attempt, kept as the prior cause of the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {cause}")]
pub struct AttemptFailure {
    pub kind: FailureKind,
    pub cause: String,
}

impl AttemptFailure {
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            cause: format!("no response within {:?}", after),
        }
    }

    pub fn network(cause: impl fmt::Display) -> Self {
        Self {
            kind: FailureKind::NetworkError,
            cause: cause.to_string(),
        }
    }
}

/// Terminal failure of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch the target URL after {attempts} attempt(s): {last_cause}")]
    Exhausted {
        attempts: u32,
        #[source]
        last_cause: AttemptFailure,
    },
}

/// Position within a fetch: which attempt is running and what the one before it died of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    index: u32,
    prior_cause: Option<AttemptFailure>,
}

/// What to do after an attempt fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Retry { delay: Duration, next: Attempt },
    Exhausted(FetchError),
}

impl Attempt {
    pub fn first() -> Self {
        Self {
            index: 1,
            prior_cause: None,
        }
    }

    /// 1-based attempt number.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn prior_cause(&self) -> Option<&AttemptFailure> {
        self.prior_cause.as_ref()
    }

    pub fn is_last(&self, policy: &RetryPolicy) -> bool {
        self.index >= policy.max_attempts()
    }

    pub fn on_failure(self, failure: AttemptFailure, policy: &RetryPolicy) -> Step {
        if self.is_last(policy) {
            return Step::Exhausted(FetchError::Exhausted {
                attempts: self.index,
                last_cause: failure,
            });
        }

        Step::Retry {
            delay: policy.backoff_delay(),
            next: Attempt {
                index: self.index + 1,
                prior_cause: Some(failure),
            },
        }
    }
}
