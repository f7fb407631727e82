use anyhow::{Result, bail};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::agent::AgentEvaluator;
use super::notify::Notifier;
use super::types::{Action, TriggerContext};
use crate::core::store::{RecordStore, Table};

/// Tally of one action-list run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unknown: usize,
}

enum Outcome {
    Executed,
    Skipped,
    Unknown,
}

pub struct ActionExecutor {
    store: RecordStore,
    notifier: Arc<dyn Notifier>,
    evaluator: Arc<dyn AgentEvaluator>,
}

impl ActionExecutor {
    pub fn new(
        store: RecordStore,
        notifier: Arc<dyn Notifier>,
        evaluator: Arc<dyn AgentEvaluator>,
    ) -> Self {
        Self {
            store,
            notifier,
            evaluator,
        }
    }

    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Runs `actions` in order against `table`. A failing action is logged and
    /// the rest still run.
    pub async fn execute(
        &self,
        actions: &[Action],
        table: Table,
        context: &TriggerContext,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for action in actions {
            match self.execute_one(action, table, context).await {
                Ok(Outcome::Executed) => report.executed += 1,
                Ok(Outcome::Skipped) => {
                    debug!("Skipped action {} on {}", action.kind(), table);
                    report.skipped += 1;
                }
                Ok(Outcome::Unknown) => report.unknown += 1,
                Err(e) => {
                    error!("Error executing action {}: {:#}", action.kind(), e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn execute_one(
        &self,
        action: &Action,
        table: Table,
        context: &TriggerContext,
    ) -> Result<Outcome> {
        match action {
            Action::UpdateRecord { fields } => {
                let Some(record_id) = context.record_id.as_deref() else {
                    return Ok(Outcome::Skipped);
                };
                if fields.is_empty() {
                    return Ok(Outcome::Skipped);
                }
                self.store.update_record(table, record_id, fields).await?;
                Ok(Outcome::Executed)
            }
            Action::CreateRecord {
                target_table,
                fields,
            } => {
                let (Some(target_table), Some(fields)) = (target_table, fields) else {
                    return Ok(Outcome::Skipped);
                };
                let target: Table = target_table.parse()?;
                let id = self.store.insert_record(target, fields).await?;
                debug!("Automation created {} record {}", target, id);
                Ok(Outcome::Executed)
            }
            Action::Log { message } => {
                info!("{} ({:?})", message, context.record_id);
                self.store
                    .log_activity(
                        "AUTOMATION",
                        table.name(),
                        context.record_id.as_deref().unwrap_or_default(),
                        message,
                    )
                    .await?;
                Ok(Outcome::Executed)
            }
            Action::Notify { message } => {
                self.notifier.notify(message, table, context).await?;
                Ok(Outcome::Executed)
            }
            Action::CallAgent { agent } => {
                info!("Calling agent: {}", agent);
                match self.store.find_enabled_agent(agent).await? {
                    Some(record) => {
                        self.evaluator.evaluate(&record, table, context).await?;
                        Ok(Outcome::Executed)
                    }
                    None => Ok(Outcome::Skipped),
                }
            }
            Action::Invalid { kind, error } => {
                bail!("malformed {} action: {}", kind, error)
            }
            Action::Unknown(kind) => {
                warn!("Unknown action type: {}", kind);
                Ok(Outcome::Unknown)
            }
        }
    }
}
