//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Issue one outbound GET per call
//! - Honour the per-attempt cancellation token until headers arrive
//! - Expose the body as a live byte stream without reading it

use std::future::Future;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Boxed error used across the transport seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Live upstream body. Dropping it releases the underlying connection.
pub type ByteStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// A response whose headers have arrived and whose body is still in flight.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ByteStream) -> Self {
        Self { status, headers, body }
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"<stream>")
            .finish()
    }
}

impl From<reqwest::Response> for UpstreamResponse {
    fn from(mut response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = std::mem::take(response.headers_mut());
        let body = response.bytes_stream().map_err(BoxError::from).boxed();
        Self { status, headers, body }
    }
}

/// Performs a single outbound request.
///
/// Implementations resolve as soon as response headers are available; any
/// status code is a successful send. `cancel` fires when the attempt's
/// deadline passes or the attempt is abandoned.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        url: &Url,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<UpstreamResponse, BoxError>> + Send;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        url: &Url,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<UpstreamResponse, BoxError>> + Send {
        let request = self.client.get(url.clone()).send();
        async move {
            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(BoxError::from("request cancelled")),
                response = request => response?,
            };
            Ok::<_, BoxError>(UpstreamResponse::from(response))
        }
    }
}
