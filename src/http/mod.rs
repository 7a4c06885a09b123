//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing span)
//!     → exact-match dispatch: "/" | "/proxy" | 404
//!     → /proxy: target URL checked (error.rs on failure, before any fetch)
//!     → resilience::ResilientFetcher (502 on exhaustion)
//!     → relay::relay (status committed, body streamed)
//!     → Send to client
//! ```

pub mod error;
pub mod server;

pub use error::ProxyError;
pub use server::{AppState, HttpServer, ServerError, X_REQUEST_ID};
