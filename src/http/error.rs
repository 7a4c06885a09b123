//! Errors reported to the client before any upstream header is sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::resilience::FetchError;

/// Failures that still allow a clean status code.
///
/// Anything that goes wrong once relaying has started is a
/// [`RelayError`](crate::relay::RelayError) instead and can only close the
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("missing url query parameter")]
    MissingTargetParameter,

    #[error("invalid target url: {0}")]
    InvalidTarget(String),

    #[error(transparent)]
    FetchExhausted(#[from] FetchError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingTargetParameter | ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::FetchExhausted(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProxyError::FetchExhausted(e) => format!("Proxy request failed: {}", e),
            other => other.to_string(),
        };
        (self.status(), body).into_response()
    }
}
