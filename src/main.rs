use anyhow::Context;
use tracing_subscriber::EnvFilter;

use buildpro_api::config::config;
use buildpro_api::routes::app;
use buildpro_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONGODB_URI, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("buildpro_api=info,tower_http=info")),
        )
        .init();

    let config = config().clone();
    tracing::info!(
        "Starting BuildPro API in {:?} mode ({:?} store)",
        config.environment,
        config.database.backend
    );

    let port = config.api.port;
    let state = AppState::from_config(config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("BuildPro API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
