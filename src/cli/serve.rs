use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::core::automation::AutomationEngine;
use crate::core::automation::agent::LogOnlyEvaluator;
use crate::core::automation::notify::LogNotifier;
use crate::core::config::XavierConfig;
use crate::core::lifecycle::LifecycleManager;
use crate::core::store::RecordStore;
use crate::core::terminal;
use crate::interfaces::web::{ApiServer, AppState};
use crate::logging::init_logging;

pub async fn run_server(config: XavierConfig, db_path: PathBuf) -> Result<()> {
    terminal::print_banner();
    let log_tx = init_logging(&config.log_level, false);

    info!("Starting Xavier...");
    info!(
        "Config: api={}, database={}, log_level={}",
        config.bind_addr(),
        db_path.display(),
        config.log_level
    );
    let store = RecordStore::open(&db_path).await?;

    let mut lifecycle = LifecycleManager::new().await?;
    let engine = Arc::new(AutomationEngine::new(
        store.clone(),
        lifecycle.scheduler.clone(),
        Arc::new(LogNotifier),
        Arc::new(LogOnlyEvaluator),
    ));
    lifecycle.attach(Arc::new(Mutex::new(engine.clone())));

    let state = AppState::new(store, engine, log_tx, config.cors_origins.clone());
    lifecycle.attach(Arc::new(Mutex::new(ApiServer::new(
        state,
        config.bind_addr(),
    ))));

    lifecycle.start().await?;
    info!("Lifecycle state: {:?}", lifecycle.state());

    terminal::print_link("API", &format!("http://{}/api", config.bind_addr()));
    terminal::print_status("Database", &db_path.display().to_string());
    terminal::print_info("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down Xavier...");
    lifecycle.shutdown().await?;
    Ok(())
}
