//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! fetcher / relay / handlers produce:
//!     → logging.rs (structured tracing events, request-id spans)
//!     → metrics.rs (attempt, request and relay counters)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
