use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::frameworks::config::{ConfigError, PortalConfig};
use crate::frameworks::db::{connect_pool, run_migrations};
use crate::interface_adapters::jwt::Hs256Codec;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::{InMemoryPortalStore, PostgresPortalStore};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Starts the portal. Every startup failure is logged before it is returned.
pub async fn run() -> Result<(), ServerError> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PortalConfig::load().inspect_err(|err| {
        error!(error = %err, "invalid configuration");
    })?;
    if config.jwt.secret.is_none() {
        warn!("JWT_SECRET is not set; falling back to the development secret");
    }

    let codec = Hs256Codec::new(config.jwt_secret(), config.jwt.leeway_seconds);
    let prefix = config.jwt.auth_header_prefix.as_str();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let router = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_pool(database_url).await.inspect_err(|err| {
                error!(error = %err, "failed to connect to database");
            })?;
            run_migrations(&pool).await.inspect_err(|err| {
                error!(error = %err, "failed to run migrations");
            })?;
            info!("using PostgreSQL store");
            app(AppState::new(PostgresPortalStore::new(pool), codec, prefix))
        }
        None => {
            warn!("DATABASE_URL is not set; portal data is kept in memory");
            app(AppState::new(InMemoryPortalStore::new(), codec, prefix))
        }
    };

    serve(addr, router).await
}

async fn serve(addr: SocketAddr, router: Router) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| {
            error!(%addr, error = %source, "failed to bind");
            ServerError::Bind { addr, source }
        })?;
    info!(%addr, "listening");

    axum::serve(listener, router).await.map_err(|err| {
        error!(error = %err, "server error");
        ServerError::Serve(err)
    })
}
