//! Relay subsystem: hands an accepted upstream response to the client.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse
//!     → headers.rs (drop hop-by-hop fields)
//!     → body.rs (status + headers committed, then body pumped with backpressure)
//!     → Complete | AbortedByClient | StreamError
//! ```
//!
//! # Design Decisions
//! - Nothing here can change the status code; failures end the connection
//! - The upstream stream is dropped on every exit path
//! - Client disconnect cancels the upstream through a single-fire token

pub mod body;
pub mod headers;

pub use body::{relay, Relay, RelayError, RelayOutcome};
