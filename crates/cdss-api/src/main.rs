use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use cdss_api::config::Settings;
use cdss_api::state::AppState;
use cdss_data::sqlite::SqliteDataAccess;
use cdss_engines::ppf::{LoadingsMapper, NormalizedDeficit};
use cdss_engines::schedule::DiversityScheduler;
use cdss_engines::scoring::WeightedScoring;
use cdss_store::PpfStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env();

    let data = SqliteDataAccess::open(
        &settings.database_path,
        &settings.protocol_attributes_path,
        &settings.protocol_similarity_path,
    )?;
    let ppf_store = PpfStore::new(&settings.ppf_store_path);

    let bind = settings.bind.clone();
    let state = AppState {
        data: Arc::new(data),
        scoring: Arc::new(WeightedScoring),
        scheduler: Arc::new(DiversityScheduler),
        deficit: Arc::new(NormalizedDeficit),
        mapper: Arc::new(LoadingsMapper),
        ppf_store: Arc::new(Mutex::new(ppf_store)),
        settings: Arc::new(settings),
    };

    let app = cdss_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "cdss-api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
    }
    tracing::info!("shutting down");
}
