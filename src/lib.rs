//! Minimal streaming HTTP reverse proxy.
//!
//! `GET /proxy?url=<target>` fetches the target with bounded retries and a
//! per-attempt deadline, then streams the response back without buffering it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{ResilientFetcher, RetryPolicy};
