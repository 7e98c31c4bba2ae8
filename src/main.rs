use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod routes;
mod services;

use config::Config;
use db::{LogStore, MemoryStore, PgStore};
use services::ai::{AiGateway, ClaudeGateway};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub ai: Arc<dyn AiGateway>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focuslog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn LogStore> = match &config.database_url {
        Some(url) => {
            let pool = db::pool::create_pool(url)
                .await
                .context("Failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, logs are kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.claude_api_key.is_empty() {
        tracing::warn!("CLAUDE_API_KEY not set, feedback and chat will use fallbacks");
    }
    let ai = ClaudeGateway::new(
        config.claude_api_key.clone(),
        config.claude_model.clone(),
        Duration::from_secs(config.ai_timeout_secs),
    )
    .context("Failed to build AI client")?;

    let state = AppState {
        store,
        ai: Arc::new(ai),
        config: config.clone(),
    };

    let app = routes::router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
