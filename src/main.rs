//! Caching TCP Load Balancer
//!
//! Accepts raw TCP clients, answers repeated requests from an in-memory
//! cache and forwards the rest to a pool of backends.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────────┐
//!                              │                    LOAD BALANCER                          │
//!                              │                                                          │
//!     Client Connection        │  ┌─────────┐    ┌──────────┐    ┌──────────────┐         │
//!     ─────────────────────────┼─▶│   net   │───▶│ dispatch │───▶│    proxy     │         │
//!                              │  │listener │    │queue/task│    │   session    │         │
//!                              │  └─────────┘    └──────────┘    └──┬────────┬──┘         │
//!                              │                                    │        │            │
//!                              │                           hit      ▼        ▼  miss      │
//!                              │                           ┌──────────┐  ┌──────────────┐ │
//!                              │                           │  cache   │  │load_balancer │ │
//!                              │                           │lru/ttl/..│  │ rr / hash    │ │
//!                              │                           └──────────┘  └──────┬───────┘ │
//!                              │                                                │         │
//!     Client Response          │                                                ▼         │
//!     ◀────────────────────────┼──────────────── relay ◀──────────── backend connection ◀─┼──── Backend
//!                              │                                                          │     Server
//!                              │  ┌────────────────────────────────────────────────────┐ │
//!                              │  │              Cross-Cutting Concerns                 │ │
//!                              │  │  ┌─────────┐ ┌──────────┐ ┌────────────┐            │ │
//!                              │  │  │ config  │ │observa-  │ │ resilience │            │ │
//!                              │  │  │         │ │ bility   │ │ timeouts   │            │ │
//!                              │  │  └─────────┘ └──────────┘ └────────────┘            │ │
//!                              │  │  ┌─────────────────────────┐                        │ │
//!                              │  │  │       lifecycle         │                        │ │
//!                              │  │  │   startup/shutdown      │                        │ │
//!                              │  │  └─────────────────────────┘                        │ │
//!                              │  └────────────────────────────────────────────────────┘ │
//!                              └──────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use cachelb::config::{load_config, BackendConfig, ProxyConfig};
use cachelb::lifecycle::startup;
use cachelb::observability::logging;

#[derive(Parser)]
#[command(name = "cachelb")]
#[command(about = "Caching TCP load balancer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Backend address (host:port). Repeat to build the pool; replaces configured backends.
    #[arg(long = "backend")]
    backends: Vec<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if !cli.backends.is_empty() {
        config.backends = cli.backends.into_iter().map(BackendConfig::new).collect();
    }
    let config = config.validated()?;

    logging::init_logging(&config.observability)?;

    if cli.check {
        tracing::info!(backends = config.backends.len(), "Configuration is valid");
        return Ok(());
    }

    tracing::info!("cachelb v{} starting", env!("CARGO_PKG_VERSION"));
    startup::run(config).await
}
