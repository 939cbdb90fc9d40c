//! # Inkpost
//!
//! The main entry point for the interactive blog shell.

use anyhow::Result;

mod config;
mod shell;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        seed_demo_data = config.seed_demo_data,
        "Starting Inkpost shell"
    );

    let state = AppState::new(&config).await;

    shell::run(state).await
}
