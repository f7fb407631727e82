use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::types::TriggerContext;
use crate::core::store::Table;

/// Delivery channel for `notify` actions.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, table: Table, context: &TriggerContext) -> Result<()>;
}

/// Writes notifications to the process log. There is no external channel yet.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, table: Table, context: &TriggerContext) -> Result<()> {
        info!(
            "Notification: {} (table={}, record={})",
            message,
            table,
            context.record_id.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}
