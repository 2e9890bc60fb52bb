//! Linesight - factory-floor telemetry dashboard backend.
//!
//! Builds a seeded in-memory dataset at startup and serves the dashboard
//! REST API until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (20 lines, 30 days of history)
//! cargo run --release
//!
//! # Custom bind address and seed
//! cargo run --release -- --addr 127.0.0.1:4100 --seed 7
//! ```
//!
//! # Environment Variables
//!
//! - `LINESIGHT_CONFIG`: Path to a TOML config file
//! - `LINESIGHT_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use linesight::api::{create_app, DashboardState};
use linesight::config::AppConfig;
use linesight::generator::build_dataset;
use linesight::store::TelemetryStore;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "linesight")]
#[command(about = "Factory-floor line telemetry dashboard backend")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:4000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the dataset seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Override the days of fabricated history
    #[arg(long)]
    history_days: Option<i64>,

    /// Path to a TOML config file (takes precedence over LINESIGHT_CONFIG)
    #[arg(short, long)]
    config: Option<String>,
}

// ============================================================================
// Startup
// ============================================================================

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => AppConfig::load(),
    };

    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    if let Some(days) = args.history_days {
        config.generator.history_days = days;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    let calendar = config.calendar();

    info!(
        zone = %calendar.timezone_name(),
        lines = config.site.line_count,
        "Building synthetic dataset"
    );

    let dataset = build_dataset(&config.generator_settings(), &calendar, Utc::now());
    let reading_count: usize = dataset.readings_by_line.values().map(Vec::len).sum();
    info!(
        lines = dataset.readings_by_line.len(),
        readings = reading_count,
        faults = dataset.faults.len(),
        "Dataset ready"
    );

    let state = DashboardState::new(TelemetryStore::new(dataset), calendar);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.addr))?;

    info!("HTTP server listening on {}", config.server.addr);
    info!("Dashboard API available at: http://{}/api", config.server.addr);

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}
