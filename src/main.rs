//! HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 LOAD BALANCER                │
//!   Client Request       │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ─────────────────────┼─▶│   http   │──▶│ registry │──▶│   pool   │──┼──▶ Backend
//!                        │  │ dispatch │   │  (RR)    │   │ (LIFO)   │  │
//!   Client Response      │  └──────────┘   └────▲─────┘   └──────────┘  │
//!   ◀────────────────────┼────── buffered       │                       │
//!                        │                ┌─────┴──────┐                │
//!                        │                │   health   │── GET /up ─────┼──▶ Backends
//!                        │                │  monitor   │                │
//!                        │                └────────────┘                │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use http_balancer::config::loader::read_config;
use http_balancer::config::{validation::validate_config, ConfigError, ProxyConfig};
use http_balancer::lifecycle::signals::wait_for_signal;
use http_balancer::observability::{logging, metrics};
use http_balancer::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "http-balancer", version, about = "Round-robin HTTP load balancer")]
struct Args {
    /// Configuration file (TOML, or JSON when the extension is .json).
    #[arg(short, long, env = "BALANCER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Backend base address; repeat to add several. Replaces configured backends.
    #[arg(long = "backend")]
    backends: Vec<String>,
}

fn resolve_config(args: &Args) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    if !args.backends.is_empty() {
        config.backends = args.backends.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logging(&config.observability);

    tracing::info!("http-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = ?config.backends,
        max_connections_per_backend = config.pool.max_connections_per_backend,
        request_timeout_secs = config.pool.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
