//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the liveness, proxy and fallback routes
//! - Wire up middleware (request ID, tracing)
//! - Validate the target URL before any outbound traffic
//! - Run fetch then relay for each proxy request
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;
use url::Url;

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::relay::relay;
use crate::resilience::{PolicyError, ResilientFetcher, RetryPolicy};
use crate::upstream::{ReqwestTransport, Transport};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Error building the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid retry policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Application state injected into handlers.
pub struct AppState<T> {
    pub fetcher: Arc<ResilientFetcher<T>>,
    pub policy: RetryPolicy,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            policy: self.policy,
        }
    }
}

/// Query string of `/proxy`.
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that fetches targets over the network.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        Self::with_transport(config, ReqwestTransport::new()?)
    }

    /// Create a server with a custom outbound transport.
    pub fn with_transport<T: Transport + 'static>(config: ProxyConfig, transport: T) -> Result<Self, ServerError> {
        let state = AppState {
            fetcher: Arc::new(ResilientFetcher::new(transport)),
            policy: config.retries.policy()?,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<T: Transport + 'static>(state: AppState<T>) -> Router {
        Router::new()
            .route("/", any(liveness))
            .route("/proxy", any(proxy_handler::<T>))
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_attempts = self.config.retries.max_attempts,
            per_attempt_timeout_ms = self.config.retries.per_attempt_timeout_ms,
            backoff_delay_ms = self.config.retries.backoff_delay_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

async fn liveness() -> &'static str {
    "hello world!"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Fetch the `url` target and stream it back.
async fn proxy_handler<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    match proxy(&state, params).await {
        Ok(response) => {
            metrics::counter!("proxy_requests_total", "outcome" => "relayed").increment(1);
            response
        }
        Err(e) => {
            let outcome = match e {
                ProxyError::FetchExhausted(_) => "fetch_failed",
                _ => "bad_request",
            };
            metrics::counter!("proxy_requests_total", "outcome" => outcome).increment(1);
            tracing::warn!(error = %e, status = %e.status(), "Proxy request rejected");
            e.into_response()
        }
    }
}

async fn proxy<T: Transport>(state: &AppState<T>, params: ProxyParams) -> Result<Response, ProxyError> {
    let target = parse_target(params.url.as_deref())?;
    tracing::info!(url = %target, "Proxying request");

    let upstream = state.fetcher.fetch(&target, &state.policy).await?;

    // The relay task logs its own outcome.
    Ok(relay(upstream).response)
}

fn parse_target(raw: Option<&str>) -> Result<Url, ProxyError> {
    let raw = raw
        .filter(|u| !u.is_empty())
        .ok_or(ProxyError::MissingTargetParameter)?;

    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidTarget(format!("'{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProxyError::InvalidTarget(format!("unsupported scheme '{}'", other))),
    }
}
