//! Route manager server.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes/                      ┌──────────────────────────────────────────┐
//!   ├── health.toml   ──────────▶│ discovery: walk → load manifest → catalog │
//!   └── api/echo.toml            └────────────────────┬─────────────────────┘
//!                                                     │ LoadedUnit
//!                                                     ▼
//!                      ┌──────────────────┐   ┌──────────────────┐
//!                      │ routing: table   │   │ openapi: paths[] │
//!                      │ + duplicate rule │   │ last unit wins   │
//!                      └────────┬─────────┘   └────────┬─────────┘
//!                               └──────────┬───────────┘
//!                                          ▼
//!                      axum Router (+ global middleware, trace/timeout/limit)
//!                                          │
//!                                          ▼
//!                                serve until SIGINT/SIGTERM
//! ```

use std::path::PathBuf;

use clap::Parser;

use route_manager::config::{load_config, ManagerConfig};
use route_manager::observability::logging;
use route_manager::{builtin, RouteManager};

#[derive(Parser)]
#[command(name = "route-manager")]
#[command(about = "Serve route units discovered in a directory", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Routes directory, overriding the configuration.
    #[arg(short, long)]
    routes: Option<PathBuf>,

    /// Port to listen on, overriding the configured bind address.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ManagerConfig::default(),
    };
    if let Some(routes) = cli.routes {
        config.routes_dir = routes;
    }

    logging::init(&config.observability)?;
    tracing::info!("route-manager v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        routes_dir = %config.routes_dir.display(),
        bind_address = %config.listener.bind_address,
        openapi = config.openapi.enabled,
        duplicate_policy = ?config.routing.duplicate_policy,
        "Configuration loaded"
    );

    let mut manager = RouteManager::from_config(&config, builtin::catalog())?;
    let report = manager.load_routes()?;
    if report.units == 0 {
        tracing::warn!(routes_dir = %config.routes_dir.display(), "No route units loaded");
    }

    match cli.port {
        Some(port) => manager.serve(port).await?,
        None => {
            let listener = tokio::net::TcpListener::bind(&config.listener.bind_address).await?;
            manager
                .serve_with_shutdown(listener, route_manager::lifecycle::shutdown_signal())
                .await?
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
