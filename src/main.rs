// src/main.rs

use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use parlor::config::AppConfig;
use parlor::llm::GeminiClient;
use parlor::state::AppState;
use parlor::store::{self, SqliteChatStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(AppConfig::from_env());

    let level = config.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Parlor");
    info!("Model: {}", config.gemini_model);
    if config.google_api_key.is_empty() {
        warn!("GOOGLE_API_KEY is not set; completions will fail until it is provided");
    }

    let pool = store::connect(&config.database_url, config.sqlite_max_connections).await?;
    store::migration::run_migrations(&pool).await?;
    info!("Database ready at {}", config.database_url);

    let state = AppState {
        store: Arc::new(SqliteChatStore::new(pool)),
        completions: Arc::new(GeminiClient::new(&config)),
        config,
    };

    parlor::server::run(state).await
}
