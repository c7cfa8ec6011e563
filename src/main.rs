//! Book Manager Server
//!
//! Admin screens, public book pages and a JSON API over PostgreSQL.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_manager_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{
        nonces::{MemoryTokenStore, NonceService, TokenStore},
        redis::RedisService,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("book_manager_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Book Manager Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Anti-forgery token storage: Redis when configured, process memory otherwise
    let token_store: Arc<dyn TokenStore> = match config.redis.url.as_deref() {
        Some(url) => {
            let redis = RedisService::new(url).await.context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(redis)
        }
        None => {
            tracing::info!("No Redis configured, keeping tokens in memory");
            Arc::new(MemoryTokenStore::new())
        }
    };
    let nonces = NonceService::new(token_store, config.nonces.ttl_seconds);

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), nonces);

    services
        .users
        .ensure_bootstrap_admin(&config.bootstrap)
        .await
        .context("Failed to create bootstrap administrator")?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
