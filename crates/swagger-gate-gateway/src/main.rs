//! swagger-gate - Google login in front of API documentation
//!
//! This is the main entry point for the gateway service. Configuration comes
//! from the environment; a `.env` file in the working directory is loaded
//! first when present.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swagger_gate_auth::GoogleProvider;
use swagger_gate_gateway::{create_router, GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,swagger_gate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting swagger-gate");
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = GatewayConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        should_login = config.should_login,
        allowed_emails = config.allowed_emails.len(),
        allowed_domains = config.allowed_domains.len(),
        session_lifetime_seconds = config.jwt_expired_time,
        "Gateway configuration loaded"
    );

    let auth_config = config.auth_config();
    tracing::info!(callback_url = %auth_config.callback_url(), "OAuth callback configured");

    let provider = Arc::new(GoogleProvider::new(&auth_config)?);
    let listen_addr = config.listen_addr.clone();
    let state = GatewayState::new(config, provider)?;

    let app = create_router(state);
    tracing::info!("Router configured");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
