use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use otthon_metering::{app, cache, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("otthon_metering=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let cache = cache::AppCache::new();

    // Reference data warmer runs for the lifetime of the process.
    tokio::spawn(cache::start_cache_warmer(cache.clone(), db.clone()));

    let state = AppState { db, cache };
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Metering engine listening on {}", config.bind_addr);

    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}
