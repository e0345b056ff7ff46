mod config;
mod errors;
mod evaluation;
mod llm_client;
mod notify;
mod routes;
mod settings;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::orchestrator::Evaluator;
use crate::llm_client::LlmClient;
use crate::notify::{Notifier, TracingNotifier};
use crate::routes::build_router;
use crate::settings::history::HistoryLock;
use crate::settings::store::{MemoryStore, RedisStore, SettingsStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize settings store
    let store: Arc<dyn SettingsStore> = match &config.redis_url {
        Some(url) => {
            info!("Settings store: Redis");
            Arc::new(RedisStore::open(url)?)
        }
        None => {
            info!("Settings store: in-memory (REDIS_URL not set, settings are lost on restart)");
            Arc::new(MemoryStore::default())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.evaluator_api_url.clone(), config.evaluator_timeout);
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm_client::MODEL,
        config.evaluator_api_url
    );
    if config.default_credential.is_none() {
        info!("EVALUATOR_API_KEY not set; evaluations need a saved credential");
    }

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    // Build app state
    let state = AppState {
        evaluator: Evaluator::new(llm, notifier.clone()),
        store,
        history_lock: HistoryLock::default(),
        notifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
