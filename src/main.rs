//! Ingress router
//!
//! HTTP/HTTPS ingress for many virtual hosts, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    INGRESS ROUTER                     │
//!                 │                                                       │
//!  snapshot ──────┼─▶ Ingress::on_snapshot                                │
//!  (file/watch)   │      build RoutingTable → publish → open readiness    │
//!                 │                     │                                 │
//!                 │                     ▼                                 │
//!                 │               RouteHolder (ArcSwap)                   │
//!                 │                │            │                         │
//!  HTTPS ─────────┼─▶ net::tls ────┘            │                         │
//!                 │   (SNI → certificate)       │                         │
//!                 │         │                   │                         │
//!  HTTP ──────────┼─────────┴──▶ http::proxy ───┘ (host + path → backend) │
//!                 │                   │                                   │
//!                 │                   ▼                                   │
//!                 │              Forwarder ────────────────────────────── ┼──▶ Backend
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use ingress_router::config::{load_config, validate_config, ConfigError, ProxyConfig};
use ingress_router::lifecycle::signals::watch_signals;
use ingress_router::observability::{logging, metrics};
use ingress_router::snapshot::SnapshotWatcher;
use ingress_router::{Ingress, IngressServer, Listeners, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "ingress-router")]
#[command(about = "HTTP/HTTPS ingress router with hot-swappable routing", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind both listeners to.
    #[arg(long)]
    host: Option<String>,

    /// Plain HTTP port.
    #[arg(long)]
    port: Option<u16>,

    /// HTTPS port.
    #[arg(long)]
    tls_port: Option<u16>,

    /// JSON routing snapshot file to load and watch.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(tls_port) = self.tls_port {
            config.listener.tls_port = tls_port;
        }
        if let Some(snapshot) = self.snapshot {
            config.snapshot.path = Some(snapshot);
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability)?;
    tracing::info!("ingress-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        tls_port = config.listener.tls_port,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_addr() {
        metrics::init_metrics(addr);
    }

    let ingress = Arc::new(Ingress::new());
    let listeners = Listeners::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    // Dropping the watcher stops file updates, so it lives until shutdown.
    let _watcher = match &config.snapshot.path {
        Some(path) => SnapshotWatcher::new(path, ingress.clone()).start(config.snapshot.watch)?,
        None => {
            tracing::warn!("No snapshot source configured; waiting for snapshots");
            None
        }
    };

    IngressServer::new(ingress, &config.timeouts)
        .serve(listeners, shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
