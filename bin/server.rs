// IBAN / BIC Service - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use iban_bic::api::{create_router, AppState};
use iban_bic::{load_reference_table, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iban_bic=info,iban_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env().context("Failed to read configuration")?;

    // Load reference table once, before accepting traffic
    let outcome = load_reference_table(&config.data_path);
    if let Some(e) = outcome.error() {
        tracing::warn!("{} - serving without BIC lookup", e);
    }
    let state = AppState::new(outcome.into_table());

    let app = create_router(state);

    let addr = config.bind_addr().context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("runs on: {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
