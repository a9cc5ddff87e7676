//! Backend entry-point: loads settings, wires storage and serves the REST API.

mod server;

use std::env;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use backend::outbound::security::ephemeral_secret;
use backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(env::args_os())
        .map_err(|e| eyre!("failed to load settings: {e}"))?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("GAMEX_BIND_ADDR is not a socket address")?;
    let secret = signing_secret(&settings)?;

    let mut config = ServerConfig::new(bind_addr, secret, settings.token_ttl());
    if let Some(url) = settings.database_url.as_deref() {
        let applied = run_pending_migrations(url)
            .await
            .wrap_err("database migrations failed")?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    let shutdown_health = health_state.clone();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining connections");
            shutdown_health.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}

/// Resolve the token signing secret.
///
/// Debug builds, or release builds started with
/// `GAMEX_ALLOW_EPHEMERAL_SECRET=true`, fall back to a random per-process
/// secret. Release builds otherwise refuse to start without one.
fn signing_secret(settings: &AppSettings) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(secret) = settings.jwt_secret() {
        return Ok(secret);
    }
    if cfg!(debug_assertions) || settings.allow_ephemeral_secret {
        warn!("GAMEX_JWT_SECRET unset; using temporary signing secret (dev only)");
        return Ok(ephemeral_secret());
    }
    Err(eyre!(
        "GAMEX_JWT_SECRET must be set; set GAMEX_ALLOW_EPHEMERAL_SECRET=true to use a temporary secret"
    ))
}
