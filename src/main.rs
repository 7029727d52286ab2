//! Shift billing HTTP server.
//!
//! # Environment Variables
//!
//! - `BILLING_CONFIG_DIR`: configuration directory (default: `./config`)
//! - `BILLING_ADDR`: bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG`: log filter (default: `info`)

use std::env;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_billing_engine::api::{AppState, create_router};
use shift_billing_engine::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = env::var("BILLING_CONFIG_DIR").unwrap_or_else(|_| "./config".to_string());
    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        partners = ?config.partner_ids(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));

    let addr = env::var("BILLING_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
