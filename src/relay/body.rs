//! Streaming body relay.
//!
//! # Cancellation wiring
//! ```text
//! upstream ByteStream ──pump task──▶ mpsc(1) ──▶ ClientStream ──▶ axum Body ──▶ client
//!          ▲                                          │
//!          └──────── drop ◀── CancellationToken ◀─────┘ (fires when the client body is dropped)
//! ```
//!
//! The token is the only link between the two halves. It fires at most once
//! and cancelling it again is a no-op.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::Response;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::relay::headers::forwardable;
use crate::upstream::{BoxError, ByteStream, UpstreamResponse};

/// Error surfaced to the client body after headers have been committed.
/// Hyper reacts by tearing down the connection.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("upstream body failed mid-transfer: {0}")]
    Upstream(#[source] BoxError),
}

/// How a relay ended. All variants happen after the status line was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Complete { bytes: u64 },
    AbortedByClient { bytes: u64 },
    StreamError { bytes: u64 },
}

impl RelayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::Complete { .. } => "complete",
            RelayOutcome::AbortedByClient { .. } => "aborted_by_client",
            RelayOutcome::StreamError { .. } => "stream_error",
        }
    }
}

/// A response ready for the client plus the task moving its body.
pub struct Relay {
    pub response: Response<Body>,
    pub task: JoinHandle<RelayOutcome>,
}

/// Hand an upstream response to the client.
///
/// Status and forwardable headers go into the returned response, which axum
/// writes before any body bytes. The body is pumped chunk by chunk through a
/// one-slot channel, so upstream reads wait on the client.
pub fn relay(upstream: UpstreamResponse) -> Relay {
    let UpstreamResponse { status, headers, body } = upstream;

    let (tx, rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(pump(body, tx, cancel.clone()));

    let client = ClientStream {
        rx,
        _cancel_on_drop: cancel.drop_guard(),
    };

    let mut response = Response::new(Body::from_stream(client));
    *response.status_mut() = status;
    *response.headers_mut() = forwardable(headers);

    Relay { response, task }
}

/// Client-facing half. Dropping it, which hyper does when the client goes
/// away, cancels the pump.
struct ClientStream {
    rx: mpsc::Receiver<Result<Bytes, RelayError>>,
    _cancel_on_drop: DropGuard,
}

impl Stream for ClientStream {
    type Item = Result<Bytes, RelayError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Upstream-facing half. Owns the upstream stream and drops it on every exit.
async fn pump(
    mut upstream: ByteStream,
    tx: mpsc::Sender<Result<Bytes, RelayError>>,
    cancel: CancellationToken,
) -> RelayOutcome {
    let mut bytes: u64 = 0;

    let outcome = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break RelayOutcome::AbortedByClient { bytes },
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                let len = chunk.len() as u64;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break RelayOutcome::AbortedByClient { bytes },
                    sent = tx.send(Ok(chunk)) => {
                        if sent.is_err() {
                            break RelayOutcome::AbortedByClient { bytes };
                        }
                    }
                }
                bytes += len;
            }
            Some(Err(e)) => {
                tracing::warn!(bytes, error = %e, "Upstream body failed after headers were sent");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tx.send(Err(RelayError::Upstream(e))) => {}
                }
                break RelayOutcome::StreamError { bytes };
            }
            None => break RelayOutcome::Complete { bytes },
        }
    };

    drop(upstream);

    match outcome {
        RelayOutcome::AbortedByClient { bytes } => {
            tracing::info!(bytes, "Client connection closed, upstream stream destroyed");
        }
        RelayOutcome::Complete { bytes } => tracing::debug!(bytes, "Relay complete"),
        RelayOutcome::StreamError { .. } => {}
    }
    metrics::counter!("proxy_relays_total", "outcome" => outcome.as_str()).increment(1);

    outcome
}
