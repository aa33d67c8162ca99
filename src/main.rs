use std::sync::Arc;

use dotenvy::dotenv;
use log::{info, warn};
use tower_http::cors::CorsLayer;

use healthdesk::api_router::configure_api_routes;
use healthdesk::chatbot::Chatbot;
use healthdesk::config::AppConfig;
use healthdesk::shared::state::AppState;
use healthdesk::storage::{MemStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let storage: Arc<dyn Storage> = match &config.database.path {
        Some(path) => Arc::new(SqliteStorage::open(path)?),
        None => {
            warn!("DATABASE_PATH not set; tickets and transcripts are kept in memory");
            Arc::new(MemStorage::new())
        }
    };

    if config.llm.api_key.is_none() {
        warn!("OPENAI_API_KEY not set; chat triage will use keyword matching only");
    }
    let chatbot = Arc::new(Chatbot::new(&config.llm));

    let state = Arc::new(AppState {
        config: config.clone(),
        storage,
        chatbot,
    });

    let app = configure_api_routes()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
