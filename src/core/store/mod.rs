mod activity;
mod automations;
pub mod error;
mod records;
mod seed;
mod stats;
pub mod tables;
pub mod types;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub use error::StoreError;
pub use records::{Record, render_id};
pub use tables::Table;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS workflow_navigator (
    workflow_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    status TEXT DEFAULT 'Planned',
    priority INTEGER DEFAULT 0,
    assigned_to TEXT,
    last_updated DATETIME DEFAULT CURRENT_TIMESTAMP,
    deadline DATE
);
CREATE TABLE IF NOT EXISTS portfolio_sync (
    project_id TEXT PRIMARY KEY,
    project_name TEXT NOT NULL,
    owner TEXT,
    progress INTEGER DEFAULT 0,
    sync_status TEXT DEFAULT 'Draft',
    last_sync DATETIME,
    review_date DATE
);
CREATE TABLE IF NOT EXISTS innovation_flow (
    opportunity_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    trend_score INTEGER DEFAULT 0,
    category TEXT,
    impact INTEGER DEFAULT 0,
    owner TEXT,
    review_status TEXT DEFAULT 'New'
);
CREATE TABLE IF NOT EXISTS backend_insight (
    insight_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT,
    priority INTEGER DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    status TEXT DEFAULT 'Active'
);
CREATE TABLE IF NOT EXISTS dream_journal (
    dream_id TEXT PRIMARY KEY,
    date DATE NOT NULL,
    title TEXT,
    description TEXT,
    symbols TEXT,
    sentiment TEXT,
    interpretation TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS scrobble_history (
    scrobble_id TEXT PRIMARY KEY,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    track_name TEXT,
    artist TEXT,
    album TEXT,
    duration INTEGER,
    source TEXT
);
CREATE TABLE IF NOT EXISTS xavier_lore (
    lore_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT,
    category TEXT,
    tags TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS health_metrics (
    metric_id TEXT PRIMARY KEY,
    date DATE NOT NULL,
    metric_type TEXT,
    value REAL,
    unit TEXT,
    notes TEXT,
    source TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS money_moves (
    transaction_id TEXT PRIMARY KEY,
    date DATE NOT NULL,
    type TEXT,
    amount REAL,
    category TEXT,
    description TEXT,
    status TEXT DEFAULT 'Completed',
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS system_config (
    config_key TEXT PRIMARY KEY,
    config_value TEXT,
    description TEXT,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS automations (
    automation_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    target_table TEXT,
    trigger_type TEXT,
    trigger_config TEXT,
    actions TEXT,
    enabled INTEGER DEFAULT 1,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS agents (
    agent_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    logic TEXT,
    enabled INTEGER DEFAULT 1,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS activity_log (
    log_id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    action TEXT,
    table_name TEXT,
    record_id TEXT,
    user TEXT,
    details TEXT
);
CREATE INDEX IF NOT EXISTS idx_automations_target_trigger
    ON automations(target_table, trigger_type, enabled);
";

/// Shared handle to the Xavier SQLite database.
#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Mutex<Connection>>,
}

impl RecordStore {
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db = Connection::open(db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?;
        let store = Self::from_connection(db)?;
        info!("Database ready at {}", db_path.display());
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.db.lock().await.execute_batch(sql)?;
        Ok(())
    }

    fn from_connection(db: Connection) -> Result<Self> {
        db.execute_batch(SCHEMA)
            .context("failed to initialize tables")?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}
