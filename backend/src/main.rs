//! Service entry-point: loads settings, wires the repository and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use user_registry::inbound::http::health::HealthState;
use user_registry::outbound::persistence::{DbPool, PoolConfig, run_migrations};

async fn resolve_config(settings: &ServerSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;
    let config = ServerConfig::new(bind_addr);

    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(config);
    };
    if settings.run_migrations() {
        run_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
    }
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(std::io::Error::other)?;
    info!(max_size = settings.pool_max_size(), "database pool ready");
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = resolve_config(&settings).await?;
    info!(bind_addr = %config.bind_addr, "starting user registry");

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
