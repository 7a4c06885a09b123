//! Outbound side of the proxy.
//!
//! # Data Flow
//! ```text
//! ResilientFetcher
//!     → Transport::send (one attempt, cancellable)
//!     → UpstreamResponse { status, headers, body stream }
//!     → handed to the relay, never read here
//! ```

pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use transport::{BoxError, ByteStream, ReqwestTransport, Transport, UpstreamResponse};
