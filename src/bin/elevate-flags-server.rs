use std::sync::Arc;

use elevate_flags::resolver::FlagResolver;
use elevate_flags::{ServerConfig, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    let resolver = Arc::new(FlagResolver::for_process());
    tracing::info!(
        enabled = ?resolver.list_enabled(),
        disabled = ?resolver.list_disabled(),
        "Feature flags resolved"
    );

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(listen = %config.listen, path = server::FEATURE_FLAGS_PATH, "Serving feature flags");

    axum::serve(listener, server::router(resolver)).await?;

    Ok(())
}
