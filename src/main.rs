//! Application API router
//!
//! Spreads `POST /api/router` requests over a fixed pool of Application API
//! instances, skipping instances whose circuit breaker is open.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                       ROUTER                          │
//!                   │                                                       │
//!  Client Request   │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!  ─────────────────┼─▶│  http   │───▶│ dispatcher │───▶│ round robin  │   │
//!                   │  │ server  │    │            │    │ + breakers   │   │
//!                   │  └─────────┘    └─────┬──────┘    └──────────────┘   │
//!                   │                       │                               │
//!                   │                       ▼                               │
//!  Client Response  │  ┌─────────┐    ┌────────────┐                        │
//!  ◀────────────────┼──│response │◀───│  upstream  │◀───────────────────────┼── Application
//!                   │  └─────────┘    │  + classify│                        │   API instance
//!                   │                 └────────────┘                        │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_router::config::{load_config, RouterConfig};
use api_router::lifecycle::{signals, Shutdown};
use api_router::observability::{logging, metrics};
use api_router::HttpServer;

#[derive(Parser)]
#[command(name = "api-router")]
#[command(about = "Round-robin router for Application API instances", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("api-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = ?config.pool.addresses,
        failure_threshold = config.circuit_breaker.failure_threshold,
        reset_timeout_ms = config.circuit_breaker.reset_timeout_ms,
        slow_call_threshold_ms = config.dispatch.slow_call_threshold_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
