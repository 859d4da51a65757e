//! Backend entry-point: loads settings, prepares storage and runs the server.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cinerate::AppSettings;
use cinerate::inbound::http::health::HealthState;
use cinerate::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use cinerate::outbound::cache::connect_redis;
use cinerate::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    settings.validate().wrap_err("invalid settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_user_cache_ttl(settings.user_cache_ttl());
    let config = attach_storage(config, &settings).await?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(
        server::prometheus_metrics(prometheus::Registry::new())
            .map_err(|e| eyre!("failed to configure Prometheus metrics: {e}"))?,
    ));

    info!(bind_addr = %config.bind_addr(), "starting server");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)
        .wrap_err("failed to start HTTP server")?
        .await
        .wrap_err("HTTP server terminated")
}

/// Run migrations and open the pools named in `settings`.
async fn attach_storage(config: ServerConfig, settings: &AppSettings) -> Result<ServerConfig> {
    let Some(database_url) = settings.database_url.clone() else {
        if settings.redis_url.is_some() {
            warn!("redis_url is ignored without database_url");
        }
        return Ok(config);
    };

    let migration_url = database_url.clone();
    let applied = actix_web::rt::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to run migrations")?;
    info!(applied, "database migrations complete");

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_pool_max_size),
    )
    .await
    .wrap_err("failed to create database pool")?;
    let config = config.with_db_pool(pool);

    match &settings.redis_url {
        Some(url) => {
            let redis = connect_redis(url)
                .await
                .wrap_err("failed to connect to Redis")?;
            Ok(config.with_redis_pool(redis))
        }
        None => Ok(config),
    }
}
