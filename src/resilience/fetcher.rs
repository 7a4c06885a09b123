//! Retrying, deadline-bounded outbound fetch.
//!
//! # Responsibilities
//! - Run attempts strictly one after another
//! - Bound each attempt by `per_attempt_timeout`, cancelling it on expiry
//! - Sleep `backoff_delay` between failed attempts, never before the first or after the last
//! - Return the first response of any status, body untouched

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::resilience::attempt::{Attempt, AttemptFailure, FetchError, Step};
use crate::resilience::policy::RetryPolicy;
use crate::upstream::{Transport, UpstreamResponse};

/// Fetches upstream responses with bounded retries.
pub struct ResilientFetcher<T> {
    transport: T,
}

impl<T: Transport> ResilientFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url`, retrying network failures and timeouts per `policy`.
    ///
    /// Upstream status codes are never a reason to retry: a 404 or 500 from
    /// the target is returned like any other response. Ownership of the body
    /// passes to the caller.
    pub async fn fetch(&self, url: &Url, policy: &RetryPolicy) -> Result<UpstreamResponse, FetchError> {
        let mut attempt = Attempt::first();

        loop {
            match self.attempt_once(url, policy).await {
                Ok(response) => {
                    metrics::counter!("proxy_upstream_attempts_total", "outcome" => "success").increment(1);
                    tracing::debug!(
                        url = %url,
                        attempt = attempt.index(),
                        status = %response.status,
                        "Upstream responded"
                    );
                    return Ok(response);
                }
                Err(failure) => {
                    metrics::counter!("proxy_upstream_attempts_total", "outcome" => failure.kind.as_str())
                        .increment(1);
                    tracing::warn!(
                        url = %url,
                        attempt = attempt.index(),
                        max_attempts = policy.max_attempts(),
                        kind = %failure.kind,
                        error = %failure.cause,
                        "Upstream attempt failed"
                    );

                    match attempt.on_failure(failure, policy) {
                        Step::Retry { delay, next } => {
                            tracing::info!(url = %url, next_attempt = next.index(), delay = ?delay, "Retrying upstream");
                            tokio::time::sleep(delay).await;
                            attempt = next;
                        }
                        Step::Exhausted(err) => {
                            tracing::error!(url = %url, error = %err, "Giving up on upstream");
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// One attempt with its own token. The token fires on timeout, on
    /// transport error, and if this future is dropped mid-flight; it is left
    /// untouched once a response has been accepted.
    async fn attempt_once(&self, url: &Url, policy: &RetryPolicy) -> Result<UpstreamResponse, AttemptFailure> {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let timeout = policy.per_attempt_timeout();

        tokio::select! {
            biased;
            result = self.transport.send(url, cancel.clone()) => match result {
                Ok(response) => {
                    guard.disarm();
                    Ok(response)
                }
                Err(e) => Err(AttemptFailure::network(e)),
            },
            _ = tokio::time::sleep(timeout) => {
                cancel.cancel();
                Err(AttemptFailure::timeout(timeout))
            }
        }
    }
}
