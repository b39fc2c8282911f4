//! Host-rewriting reverse proxy (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                  HOST-REWRITE PROXY                  │
//!                      │                                                      │
//!   Client Request     │  ┌─────────┐    ┌─────────┐    ┌──────────────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│  proxy  │───▶│ rewrite outbound │  │
//!                      │  │ server  │    │ handler │    │ public → backend │  │
//!                      │  └─────────┘    └─────────┘    └────────┬─────────┘  │
//!                      │                                         ▼            │
//!   Client Response    │  ┌─────────┐    ┌──────────────────┐  ┌──────────┐   │
//!   ◀──────────────────┼──│ framing │◀───│ rewrite inbound  │◀─│ upstream │◀──┼── Backend
//!                      │  └─────────┘    │ backend → public │  │ (reqwest)│   │   version
//!                      │                 └──────────────────┘  └──────────┘   │
//!                      │                                                      │
//!                      │  resolver (startup, optional refresh) · config ·     │
//!                      │  observability · lifecycle                           │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use host_rewrite_proxy::config::loader::load_config;
use host_rewrite_proxy::lifecycle::{build_handler, signals, Shutdown};
use host_rewrite_proxy::observability::{logging, metrics};
use host_rewrite_proxy::resolver::BackendRefresher;
use host_rewrite_proxy::{HttpServer, ProxyConfig};

#[derive(Parser)]
#[command(name = "host-rewrite-proxy")]
#[command(about = "HTTPS reverse proxy that rewrites the public host to a resolved backend", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
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

    logging::init_logging(&config.observability);

    tracing::info!("host-rewrite-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // No backend, no traffic.
    let (handler, resolver) = build_handler(&config).await?;

    let shutdown = Shutdown::new();

    if config.resolver.refresh_secs > 0 {
        let refresher = BackendRefresher::new(
            resolver,
            handler.clone(),
            Duration::from_secs(config.resolver.refresh_secs),
        );
        tokio::spawn(refresher.run(shutdown.subscribe()));
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config, handler);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
