use didhub_core::model::LogLevel;
use didhub_server::{
    AppState, agent::KeyAgent, config::Config, create_router, handlers::status::SERVER_VERSION,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let registry = config.store.connect().await?;
    let agent = KeyAgent::new()?;

    registry
        .emit(
            LogLevel::Info,
            "DID registry API initialized",
            Some(json!({
                "serverVersion": SERVER_VERSION,
                "backend": registry.backend_kind(),
            })),
        )
        .await;

    let state = AppState::new(registry, agent)
        .with_agent_timeout(config.agent_timeout)
        .with_community_dwn(config.community_dwn);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on {}", config.addr);

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
