//! Site gateway.
//!
//! A small backend service gluing a marketing site's forms to hosted
//! SaaS backends.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 SITE GATEWAY                  │
//!                    │                                               │
//!   POST /api/… ─────┼─▶ http ──▶ contact flow ──▶ directory insert ─┼──▶ hosted table
//!                    │    │            │      └──▶ notification ─────┼──▶ notify endpoint
//!                    │    │            └──────────▶ telemetry ───────┼──▶ 3 tracking sinks
//!                    │    └───▶ checkout session ──▶ confirmation ───┼──▶ payment processor
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐ │
//!                    │  │        Cross-Cutting Concerns            │ │
//!                    │  │   config      observability (logs,      │ │
//!                    │  │   (toml+env)  metrics endpoint)          │ │
//!                    │  └─────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_gateway::config::{self, GatewayConfig};
use site_gateway::observability;
use site_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "site-gateway", version, about = "Site gateway service")]
struct Cli {
    /// Path to the TOML configuration file. Defaults plus environment
    /// overrides are used when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            config::apply_env_overrides(&mut config);
            config
        }
    };

    observability::logging::init(&config.observability.log_level);

    tracing::info!("site-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::from_config(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
