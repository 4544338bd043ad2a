use std::sync::Arc;

use anyhow::Context;

mod config;
mod db;
mod error;
mod graphql;
mod handlers;
mod models;
mod routes;

use config::{Config, StoreBackend};
use db::{MemoryMoodStore, MoodRepository, PgMoodStore, SharedMoodStore};
use graphql::MoodSchema;

/// Process-wide state, built once and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub schema: MoodSchema,
    pub repository: MoodRepository,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodlog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let store: SharedMoodStore = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = db::pool::create_pool(database_url, config.database_max_connections)
                .await
                .context("Failed to create database pool")?;

            let store = PgMoodStore::new(pool, config.mood_table.clone())?;
            if config.table_unconfigured() {
                tracing::warn!("MOOD_TABLE is not set; storage calls will fail");
            } else {
                store
                    .ensure_table()
                    .await
                    .context("Failed to prepare mood table")?;
            }
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-memory mood store");
            Arc::new(MemoryMoodStore::new())
        }
    };

    let repository = MoodRepository::new(store);
    let state = AppState {
        schema: graphql::build_schema(repository.clone()),
        repository,
        config: config.clone(),
    };

    let app = routes::build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
