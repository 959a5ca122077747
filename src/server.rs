//! Process bootstrap shared by the service binaries

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    api,
    config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig},
};

/// Install the global subscriber; `RUST_LOG` wins over the configured level
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalog_services={},tower_http=debug", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

/// Connect the pool and apply the service's migrations
pub async fn connect_database(config: &DatabaseConfig, migrator: Migrator) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(config.connect_options())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(host = %config.host, database = %config.name, "Connected to database");

    // Services may share one database, each applying only its own migrations
    let mut migrator = migrator;
    migrator.set_ignore_missing(true);
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");
    Ok(pool)
}

pub fn grpc_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let host = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid host address {}", config.host))?;
    Ok(SocketAddr::new(host, config.port))
}

/// Serve `/health` and `/ready` when a health port is configured
pub async fn spawn_health(config: &AppConfig, pool: PgPool) -> anyhow::Result<()> {
    let Some(port) = config.server.health_port else {
        return Ok(());
    };

    let addr = SocketAddr::new(grpc_addr(&config.server)?.ip(), port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind health port {}", addr))?;

    tracing::info!("Health probes listening on http://{}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api::health::router(pool))
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!("Health server failed: {}", e);
        }
    });
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
