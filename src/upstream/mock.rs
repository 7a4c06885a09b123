//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use futures_util::stream::{self, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{BoxError, Transport, UpstreamResponse};

/// What the next call to `send` does.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Respond(StatusCode, &'static str),
    Fail,
    Hang,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub at: Instant,
    pub url: Url,
    pub cancel: CancellationToken,
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockTransport {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        url: &Url,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<UpstreamResponse, BoxError>> + Send {
        self.calls.lock().unwrap().push(Call {
            at: Instant::now(),
            url: url.clone(),
            cancel,
        });
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Scripted::Fail);

        async move {
            match step {
                Scripted::Respond(status, body) => {
                    let mut headers = HeaderMap::new();
                    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                    let chunks = stream::iter([Ok::<_, BoxError>(Bytes::from_static(body.as_bytes()))]).boxed();
                    Ok(UpstreamResponse::new(status, headers, chunks))
                }
                Scripted::Fail => Err(BoxError::from("connection refused")),
                Scripted::Hang => std::future::pending().await,
            }
        }
    }
}
