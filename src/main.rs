//! Memory API Gateway
//!
//! A single-hop HTTP gateway between a browser UI and the backend memory
//! API server, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────┐
//!                  │                 MEMORY GATEWAY                 │
//!                  │                                                │
//!  Client Request  │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!  ────────────────┼─▶│  http   │───▶│  routes  │───▶│  proxy   │  │
//!                  │  │ server  │    │dispatcher│    │translate │  │
//!                  │  └─────────┘    └──────────┘    └────┬─────┘  │
//!                  │                                      │        │
//!                  │                                      ▼        │
//!  Client Response │  ┌─────────┐                   ┌──────────┐  │      Memory
//!  ◀───────────────┼──│ outcome │◀──────────────────│  proxy   │◀─┼────  API
//!                  │  │ render  │                   │  invoke  │  │      Server
//!                  │  └─────────┘                   └──────────┘  │
//!                  │                                                │
//!                  │  ┌──────────────────────────────────────────┐ │
//!                  │  │  config   │  observability  │  health    │ │
//!                  │  └──────────────────────────────────────────┘ │
//!                  └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use memory_gateway::config::{loader, GatewayConfig};
use memory_gateway::http::HttpServer;
use memory_gateway::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "memory-gateway", about = "HTTP gateway for the memory API server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port, overriding the config file and the PORT variable.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => GatewayConfig::default(),
    };
    loader::apply_env_overrides(&mut config);
    if let Some(port) = args.port {
        config.listener.set_port(port);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_base = %config.upstream.base_url,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
