use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cca_records::config::AppConfig;
use cca_records::{build_app, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let app_state = initialize_backend(&config).await?;
    let app = build_app(&config, app_state)?;

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
