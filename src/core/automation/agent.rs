use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::types::TriggerContext;
use crate::core::store::Table;
use crate::core::store::types::AgentRecord;

/// Something that can act on an agent's `logic` when a `call_agent` action
/// fires. Agent logic is free text; nothing here executes it as code.
#[async_trait]
pub trait AgentEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        agent: &AgentRecord,
        table: Table,
        context: &TriggerContext,
    ) -> Result<()>;
}

/// Surfaces the agent's logic in the log and does nothing else.
pub struct LogOnlyEvaluator;

#[async_trait]
impl AgentEvaluator for LogOnlyEvaluator {
    fn name(&self) -> &'static str {
        "log-only"
    }

    async fn evaluate(
        &self,
        agent: &AgentRecord,
        table: Table,
        context: &TriggerContext,
    ) -> Result<()> {
        info!(
            "Executing agent logic for {} (table={}, record={})",
            agent.name,
            table,
            context.record_id.as_deref().unwrap_or("-")
        );
        info!("{}", agent.logic.as_deref().unwrap_or_default());
        if let Some(record) = &context.record {
            debug!("Agent {} input: {:?}", agent.name, record);
        }
        if let Some(old_record) = &context.old_record {
            debug!("Agent {} previous values: {:?}", agent.name, old_record);
        }
        Ok(())
    }
}
