//! Streaming reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    RELAY PROXY                        │
//!                      │                                                       │
//!  GET /proxy?url=...  │  ┌─────────┐    ┌──────────────┐    ┌──────────────┐ │
//!  ────────────────────┼─▶│  http   │───▶│  resilience  │───▶│   upstream   │─┼──▶ Target
//!                      │  │ server  │    │   fetcher    │    │  transport   │ │
//!                      │  └─────────┘    └──────┬───────┘    └──────────────┘ │
//!                      │                        │ UpstreamResponse            │
//!                      │                        ▼                             │
//!  status, headers,    │                 ┌──────────────┐                     │
//!  streamed body       │                 │    relay     │◀────────────────────┼─── body bytes
//!  ◀───────────────────┼─────────────────│ pump + token │                     │
//!                      │                 └──────────────┘                     │
//!                      │                                                       │
//!                      │   config · lifecycle · observability                  │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use relay_proxy::config::load_config;
use relay_proxy::lifecycle;
use relay_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "relay-proxy")]
#[command(about = "Streaming HTTP reverse proxy with bounded retries", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability.log_level);

    tracing::info!("relay-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_attempts = config.retries.max_attempts,
        per_attempt_timeout_ms = config.retries.per_attempt_timeout_ms,
        backoff_delay_ms = config.retries.backoff_delay_ms,
        "Configuration loaded"
    );

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
