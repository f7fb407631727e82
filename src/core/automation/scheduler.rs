use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::executor::ActionExecutor;
use super::time_spec::TimeSpec;
use super::types::{Automation, TriggerContext, TriggerType};
use crate::core::store::RecordStore;
use crate::core::store::types::AutomationRecord;

/// Owns the live cron jobs of scheduled automations, keyed by automation id.
#[derive(Clone)]
pub struct AutomationScheduler {
    scheduler: JobScheduler,
    jobs: Arc<Mutex<HashMap<String, Uuid>>>,
    store: RecordStore,
    executor: Arc<ActionExecutor>,
}

impl AutomationScheduler {
    pub fn new(scheduler: JobScheduler, store: RecordStore, executor: Arc<ActionExecutor>) -> Self {
        Self {
            scheduler,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            store,
            executor,
        }
    }

    /// Registers every enabled automation. One bad automation is logged and
    /// skipped; only a failure to read the table is returned.
    pub async fn initialize(&self) -> Result<usize> {
        info!("Initializing automation system...");
        let automations = self
            .store
            .get_enabled_automations()
            .await
            .context("failed to load automations")?;

        for automation in &automations {
            if let Err(e) = self.register(automation).await {
                error!("Error registering automation {}: {:#}", automation.name, e);
            }
        }

        info!("Loaded {} automations", automations.len());
        Ok(automations.len())
    }

    /// Creates the cron job for a scheduled automation and returns its job id.
    /// Other trigger types fire from record events and yield `None`.
    pub async fn register(&self, record: &AutomationRecord) -> Result<Option<Uuid>> {
        let automation = Automation::from_record(record)?;
        if automation.trigger_type != TriggerType::Scheduled {
            return Ok(None);
        }
        let Some(time) = automation.trigger_config.time.as_deref() else {
            return Ok(None);
        };

        let spec = TimeSpec::parse(time);
        let expression = spec.to_cron();

        let executor = self.executor.clone();
        let actions = Arc::new(automation.actions);
        let table = automation.target_table;
        let name = automation.name.clone();
        let job = Job::new_async(expression.as_str(), move |_uuid, _l| {
            let executor = executor.clone();
            let actions = actions.clone();
            let name = name.clone();

            Box::pin(async move {
                info!("Running scheduled automation: {}", name);
                let report = executor
                    .execute(&actions, table, &TriggerContext::default())
                    .await;
                info!("Scheduled automation {} finished: {:?}", name, report);
            })
        })
        .map_err(|e| anyhow!("invalid schedule '{}' ({}): {}", time, expression, e))?;

        let job_id = self
            .scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("failed to add cron job: {}", e))?;

        let previous = self.jobs.lock().await.insert(automation.id.clone(), job_id);
        if let Some(old_id) = previous
            && let Err(e) = self.scheduler.remove(&old_id).await
        {
            warn!(
                "Failed to remove previous job {} of automation {}: {}",
                old_id, automation.id, e
            );
        }

        info!("Scheduled automation: {} at {} ({})", automation.name, time, spec);
        Ok(Some(job_id))
    }

    /// Cancels the live job of `automation_id`. Returns whether one existed.
    pub async fn stop(&self, automation_id: &str) -> Result<bool> {
        let Some(job_id) = self.jobs.lock().await.remove(automation_id) else {
            return Ok(false);
        };
        self.scheduler
            .remove(&job_id)
            .await
            .map_err(|e| anyhow!("failed to unschedule {}: {}", automation_id, e))?;
        info!("Stopped automation {}", automation_id);
        Ok(true)
    }

    pub async fn stop_all(&self) -> usize {
        let jobs: Vec<(String, Uuid)> = self.jobs.lock().await.drain().collect();
        let mut stopped = 0;
        for (automation_id, job_id) in jobs {
            match self.scheduler.remove(&job_id).await {
                Ok(()) => stopped += 1,
                Err(e) => warn!("Failed to unschedule '{}' ({}): {}", automation_id, job_id, e),
            }
        }
        stopped
    }

    /// Brings the live registration of `automation_id` in line with its row:
    /// stopped when deleted or disabled, re-registered otherwise.
    pub async fn refresh(&self, automation_id: &str) -> Result<Option<Uuid>> {
        self.stop(automation_id).await?;
        match self.store.get_automation(automation_id).await? {
            Some(record) if record.enabled => self.register(&record).await,
            _ => Ok(None),
        }
    }

    pub async fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.jobs.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
