use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use sms_gatekeeper::config::GatekeeperConfig;
use sms_gatekeeper::http::HttpServer;
use sms_gatekeeper::ratelimit::{RateLimiter, Sweeper};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "sms-gatekeeper", version)]
#[command(about = "Admission control service for outbound SMS")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the HTTP listen address
    #[arg(short, long)]
    listen_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting SMS Gatekeeper");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => GatekeeperConfig::from_file(path)?,
        None => GatekeeperConfig::default(),
    };
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    config.validate()?;
    info!(
        listen_addr = %config.server.listen_addr,
        max_per_number = config.rate_limiting.max_per_number_per_second,
        max_per_account = config.rate_limiting.max_per_account_per_second,
        "Configuration loaded"
    );

    // Initialize the rate limiter and its eviction sweep
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limiting.max_per_number_per_second,
        config.rate_limiting.max_per_account_per_second,
        config.rate_limiting.inactivity_timeout(),
    ));
    let sweeper = Sweeper::spawn(
        Arc::clone(&rate_limiter),
        config.rate_limiting.cleanup_interval(),
    );
    info!("Rate limiter initialized");

    // Run the server with graceful shutdown on Ctrl+C or SIGTERM
    let server = HttpServer::new(config.server.listen_addr, rate_limiter);
    server.serve_with_shutdown(shutdown_signal()).await?;

    sweeper.shutdown().await;
    info!("SMS Gatekeeper stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
