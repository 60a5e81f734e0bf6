use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;

use config::MonitorConfig;
use services::monitor_service::Monitor;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("vigil=debug".parse().unwrap()),
        )
        .with_target(true)
        .init();

    info!("Starting vigil market monitor...");

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if !config.can_send() {
        warn!("SENDER_EMAIL, SENDER_PASSWORD or RECIPIENT_EMAIL missing; email delivery disabled");
    }

    let mut monitor = match Monitor::new(config) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to start monitor: {}", e);
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping monitor");
        }
    }

    info!("Shutdown complete");
}
