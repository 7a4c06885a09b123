//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! fetch(url, policy):
//!     → fetcher.rs (one attempt, raced against the per-attempt deadline)
//!     → On failure: attempt.rs decides Retry { delay } or Exhausted
//!     → Fixed backoff sleep, next attempt
//!     → First response of any status wins
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline and its own cancellation token
//! - Only network errors and timeouts are retried, never status codes
//! - Backoff is fixed, inserted only between attempts
//! - Retry transitions are pure; all waiting happens on tokio's clock

pub mod attempt;
pub mod fetcher;
pub mod policy;

pub use attempt::{Attempt, AttemptFailure, FailureKind, FetchError, Step};
pub use fetcher::ResilientFetcher;
pub use policy::{PolicyError, RetryPolicy};
