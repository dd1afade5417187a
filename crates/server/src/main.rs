mod api;
mod health;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use shoprank_core::config::{AppConfig, LoadOptions};
use shoprank_core::{
    seed, BehavioralRecommender, CatalogReader, CollaborativeFilter, ContextualBooster,
    InMemoryCatalog, MarketBasketEngine, RecommendationEngine, SearchRelevanceScorer,
    SignalGenerator,
};
use shoprank_inference::InferenceAdapter;

fn init_logging(config: &AppConfig) {
    use shoprank_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let catalog: Arc<dyn CatalogReader> = Arc::new(InMemoryCatalog::new(seed::demo_catalog()));
    let signals: Vec<Box<dyn SignalGenerator>> = vec![
        Box::new(CollaborativeFilter::new(seed::demo_similarity_edges())),
        Box::new(MarketBasketEngine::new(seed::demo_association_rules())),
        Box::new(BehavioralRecommender::new()),
        Box::new(SearchRelevanceScorer::new()),
        Box::new(ContextualBooster::new()),
    ];
    let engine = RecommendationEngine::new(config.engine.clone(), catalog.clone(), signals);
    let adapter = InferenceAdapter::from_config(&config.inference)?;

    info!(
        event_name = "system.server.inference_mode",
        configured = adapter.is_configured(),
        correlation_id = "bootstrap",
        "inference adapter initialized"
    );

    let app =
        api::router(api::AppState::new(engine, adapter)).merge(health::router(catalog));

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "shoprank server listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        info!("shutdown signal handler unavailable, running until killed");
        std::future::pending::<()>().await;
    }
    info!(event_name = "system.server.shutdown", correlation_id = "shutdown", "shutting down");
}
