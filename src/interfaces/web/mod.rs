mod error;
mod handlers;
mod router;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::core::automation::AutomationEngine;
use crate::core::lifecycle::LifecycleComponent;
use crate::core::store::RecordStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: RecordStore,
    pub(crate) engine: Arc<AutomationEngine>,
    pub(crate) log_tx: tokio::sync::broadcast::Sender<String>,
    pub(crate) cors_origins: Vec<String>,
}

impl AppState {
    pub(crate) fn new(
        store: RecordStore,
        engine: Arc<AutomationEngine>,
        log_tx: tokio::sync::broadcast::Sender<String>,
        cors_origins: Vec<String>,
    ) -> Self {
        Self {
            store,
            engine,
            log_tx,
            cors_origins,
        }
    }
}

pub struct ApiServer {
    state: AppState,
    addr: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    pub(crate) fn new(state: AppState, addr: String) -> Self {
        Self {
            state,
            addr,
            shutdown_tx: None,
        }
    }
}

// --- SSE Logs (used by router) ---

async fn sse_logs_endpoint(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.log_tx.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(log) => Ok(Event::default().data(log)),
        Err(_) => Ok(Event::default().data("Log stream lagged")),
    });

    Sse::new(stream)
}

// --- Lifecycle ---

#[async_trait]
impl LifecycleComponent for ApiServer {
    async fn on_init(&mut self) -> Result<()> {
        info!("API Server Interface initializing...");
        Ok(())
    }

    async fn on_start(&mut self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("failed to bind API server to {}", self.addr))?;
        let app = router::build_api_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let addr = self.addr.clone();
        tokio::spawn(async move {
            info!("API Server running at http://{addr}");
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!("API Server crashed: {}", e);
            }
        });
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        info!("API Server Interface shutting down...");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}
