use tracing_subscriber::EnvFilter;

use billing_account_service::{app, config, store::InMemoryStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting Billing Account Service in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set outside development");
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, InMemoryStore::new());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Billing Account Service listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
