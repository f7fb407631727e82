pub mod agent;
mod executor;
pub mod notify;
mod scheduler;
pub mod time_spec;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;
use tracing::{error, info};

use crate::core::lifecycle::LifecycleComponent;
use crate::core::store::{Record, RecordStore, Table};
use agent::AgentEvaluator;
use notify::Notifier;
use types::{Automation, Condition, TriggerContext, TriggerType};

pub use executor::{ActionExecutor, ExecutionReport};
pub use scheduler::AutomationScheduler;

/// Entry point for everything that makes automations fire: cron jobs via the
/// scheduler and record events via the `on_record_*` hooks.
pub struct AutomationEngine {
    store: RecordStore,
    executor: Arc<ActionExecutor>,
    scheduler: AutomationScheduler,
}

impl AutomationEngine {
    pub fn new(
        store: RecordStore,
        jobs: JobScheduler,
        notifier: Arc<dyn Notifier>,
        evaluator: Arc<dyn AgentEvaluator>,
    ) -> Self {
        let executor = Arc::new(ActionExecutor::new(store.clone(), notifier, evaluator));
        let scheduler = AutomationScheduler::new(jobs, store.clone(), executor.clone());
        Self {
            store,
            executor,
            scheduler,
        }
    }

    pub fn scheduler(&self) -> &AutomationScheduler {
        &self.scheduler
    }

    /// Fires every enabled `record_created` automation on `table`. Returns the
    /// number of automations that ran.
    pub async fn on_record_created(&self, table: Table, record: &Record) -> usize {
        let automations = self.matching(table, TriggerType::RecordCreated).await;
        let context = TriggerContext::for_record(table, record.clone(), None);

        let mut fired = 0;
        for automation in automations {
            info!("Automation '{}' triggered by new {} record", automation.name, table);
            self.executor.execute(&automation.actions, table, &context).await;
            fired += 1;
        }
        fired
    }

    /// Fires every enabled `record_updated` automation on `table` whose
    /// conditions hold for the change from `old_record` to `record`.
    pub async fn on_record_updated(&self, table: Table, record: &Record, old_record: &Record) -> usize {
        let automations = self.matching(table, TriggerType::RecordUpdated).await;
        let context = TriggerContext::for_record(table, record.clone(), Some(old_record.clone()));

        let mut fired = 0;
        for automation in automations {
            if !should_fire(&automation.trigger_config.conditions, record, old_record) {
                continue;
            }
            info!("Automation '{}' triggered by {} update", automation.name, table);
            self.executor.execute(&automation.actions, table, &context).await;
            fired += 1;
        }
        fired
    }

    /// Runs an automation's actions immediately with an empty context.
    pub async fn run_now(&self, automation_id: &str) -> Result<Option<ExecutionReport>> {
        let Some(record) = self.store.get_automation(automation_id).await? else {
            return Ok(None);
        };
        let automation = Automation::from_record(&record)?;
        info!("Running automation '{}' on demand", automation.name);
        let report = self
            .executor
            .execute(&automation.actions, automation.target_table, &TriggerContext::default())
            .await;
        Ok(Some(report))
    }

    async fn matching(&self, table: Table, trigger_type: TriggerType) -> Vec<Automation> {
        let records = match self
            .store
            .find_triggered_automations(table.name(), trigger_type.as_str())
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading {} automations for {}: {}", trigger_type, table, e);
                return Vec::new();
            }
        };

        records
            .iter()
            .filter_map(|record| match Automation::from_record(record) {
                Ok(automation) => Some(automation),
                Err(e) => {
                    error!("Skipping automation {}: {:#}", record.name, e);
                    None
                }
            })
            .collect()
    }
}

/// No conditions always fires. Otherwise conditions are OR-combined: the
/// first `changed` condition whose field differs between the two records wins.
pub fn should_fire(conditions: &[Condition], record: &Record, old_record: &Record) -> bool {
    if conditions.is_empty() {
        return true;
    }
    conditions.iter().any(|condition| {
        condition.changed
            && record.get(&condition.field).unwrap_or(&Value::Null)
                != old_record.get(&condition.field).unwrap_or(&Value::Null)
    })
}

#[async_trait]
impl LifecycleComponent for Arc<AutomationEngine> {
    async fn on_init(&mut self) -> Result<()> {
        info!(
            "Automation engine initializing (agent evaluator: {})...",
            self.executor.evaluator_name()
        );
        if let Err(e) = self.scheduler.initialize().await {
            error!("Error initializing automations: {:#}", e);
        }
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        let stopped = self.scheduler.stop_all().await;
        info!("Automation engine stopped {} scheduled jobs", stopped);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use super::ActionExecutor;
    use super::agent::AgentEvaluator;
    use super::notify::Notifier;
    use super::types::TriggerContext;
    use crate::core::store::types::AgentRecord;
    use crate::core::store::{Record, RecordStore, Table};

    pub fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().expect("record must be a JSON object")
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str, _table: Table, context: &TriggerContext) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((message.to_string(), context.record_id.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingEvaluator {
        pub calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AgentEvaluator for RecordingEvaluator {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn evaluate(
            &self,
            agent: &AgentRecord,
            _table: Table,
            _context: &TriggerContext,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(agent.name.clone());
            Ok(())
        }
    }

    pub fn test_executor(store: &RecordStore) -> Arc<ActionExecutor> {
        Arc::new(ActionExecutor::new(
            store.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(RecordingEvaluator::default()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{RecordingEvaluator, RecordingNotifier, record};
    use super::*;
    use serde_json::json;

    fn conditions(value: serde_json::Value) -> Vec<Condition> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_conditions_always_fire() {
        let old = record(json!({"status": "Planned"}));
        assert!(should_fire(&[], &old, &old));
    }

    #[test]
    fn changed_status_fires_and_unchanged_does_not() {
        let conds = conditions(json!([{"field": "status", "changed": true}]));
        let old = record(json!({"workflow_id": "wf-1", "status": "Planned"}));
        let active = record(json!({"workflow_id": "wf-1", "status": "Active"}));
        assert!(should_fire(&conds, &active, &old));
        assert!(!should_fire(&conds, &old, &old));
    }

    #[test]
    fn unchanged_flag_never_triggers() {
        let conds = conditions(json!([{"field": "status", "changed": false}]));
        let old = record(json!({"status": "Planned"}));
        let new = record(json!({"status": "Active"}));
        assert!(!should_fire(&conds, &new, &old));
    }

    #[test]
    fn conditions_are_or_combined() {
        let conds = conditions(json!([
            {"field": "priority", "changed": true},
            {"field": "status", "changed": true}
        ]));
        let old = record(json!({"status": "Planned", "priority": 1}));
        let new = record(json!({"status": "Active", "priority": 1}));
        assert!(should_fire(&conds, &new, &old));
    }

    #[test]
    fn missing_field_compares_as_null() {
        let conds = conditions(json!([{"field": "deadline", "changed": true}]));
        let old = record(json!({"status": "Planned"}));
        let with_deadline = record(json!({"status": "Planned", "deadline": "2025-12-31"}));
        let with_null = record(json!({"status": "Planned", "deadline": null}));
        assert!(should_fire(&conds, &with_deadline, &old));
        assert!(!should_fire(&conds, &with_null, &old));
    }

    struct Harness {
        store: RecordStore,
        notifier: Arc<RecordingNotifier>,
        engine: AutomationEngine,
    }

    async fn harness() -> Harness {
        let store = RecordStore::open_in_memory().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = AutomationEngine::new(
            store.clone(),
            JobScheduler::new().await.unwrap(),
            notifier.clone(),
            Arc::new(RecordingEvaluator::default()),
        );
        Harness {
            store,
            notifier,
            engine,
        }
    }

    async fn add_automation(store: &RecordStore, row: serde_json::Value) {
        store
            .insert_record(Table::Automations, &record(row))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn status_change_notification_fires_only_on_change() {
        let h = harness().await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-002",
                "name": "Status Change Notification",
                "target_table": "workflow_navigator",
                "trigger_type": "record_updated",
                "trigger_config": r#"{"conditions":[{"field":"status","changed":true}]}"#,
                "actions": r#"[{"type":"log","message":"Status updated"},{"type":"notify","message":"Workflow status has changed"}]"#,
                "enabled": 1
            }),
        )
        .await;

        let old = record(json!({"workflow_id": "wf-001", "status": "Planned"}));
        let new = record(json!({"workflow_id": "wf-001", "status": "Active"}));

        assert_eq!(h.engine.on_record_updated(Table::WorkflowNavigator, &old, &old).await, 0);
        assert_eq!(h.engine.on_record_updated(Table::WorkflowNavigator, &new, &old).await, 1);

        let log = h.store.list_records(Table::ActivityLog).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0]["record_id"], "wf-001");
        assert_eq!(log[0]["details"], "Status updated");
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn created_trigger_updates_the_new_record() {
        let h = harness().await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-triage",
                "name": "Triage new ideas",
                "target_table": "innovation_flow",
                "trigger_type": "record_created",
                "actions": r#"[{"type":"update_record","fields":{"review_status":"Triaged"}}]"#,
                "enabled": 1
            }),
        )
        .await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-broken",
                "name": "Broken",
                "target_table": "innovation_flow",
                "trigger_type": "record_created",
                "actions": "not json",
                "enabled": 1
            }),
        )
        .await;

        let idea = record(json!({"opportunity_id": "inn-9", "title": "Voice Interface"}));
        h.store
            .insert_record(Table::InnovationFlow, &idea)
            .await
            .unwrap();

        assert_eq!(h.engine.on_record_created(Table::InnovationFlow, &idea).await, 1);
        let row = h
            .store
            .get_record(Table::InnovationFlow, "inn-9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["review_status"], "Triaged");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bad_action_shape_does_not_drop_the_automation() {
        let h = harness().await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-mixed",
                "name": "Mixed",
                "target_table": "workflow_navigator",
                "trigger_type": "record_created",
                "actions": r#"[{"type":"log","message":"a"},{"type":"call_agent"},{"type":"log","message":42},{"type":"log","message":"b"}]"#,
                "enabled": 1
            }),
        )
        .await;

        let workflow = record(json!({"workflow_id": "wf-7", "name": "Launch"}));
        assert_eq!(h.engine.on_record_created(Table::WorkflowNavigator, &workflow).await, 1);

        let details: Vec<serde_json::Value> = h
            .store
            .list_records(Table::ActivityLog)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row["details"].clone())
            .collect();
        assert_eq!(details, vec![json!("b"), json!("42"), json!("a")]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disabled_and_foreign_automations_do_not_fire() {
        let h = harness().await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-off",
                "name": "Off",
                "target_table": "dream_journal",
                "trigger_type": "record_created",
                "actions": r#"[{"type":"log","message":"x"}]"#,
                "enabled": 0
            }),
        )
        .await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-money",
                "name": "Money",
                "target_table": "money_moves",
                "trigger_type": "record_created",
                "actions": r#"[{"type":"log","message":"x"}]"#,
                "enabled": 1
            }),
        )
        .await;

        let dream = record(json!({"dream_id": "drm-1", "date": "2025-10-01"}));
        assert_eq!(h.engine.on_record_created(Table::DreamJournal, &dream).await, 0);
        assert!(h.store.list_records(Table::ActivityLog).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_now_executes_with_empty_context() {
        let h = harness().await;
        add_automation(
            &h.store,
            json!({
                "automation_id": "auto-001",
                "name": "Weekly Workflow Summary",
                "target_table": "workflow_navigator",
                "trigger_type": "scheduled",
                "trigger_config": r#"{"time":"Sunday 17:00"}"#,
                "actions": r#"[{"type":"log","message":"Weekly summary generated"},{"type":"update_record","fields":{"status":"x"}}]"#,
                "enabled": 1
            }),
        )
        .await;

        let report = h.engine.run_now("auto-001").await.unwrap().unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(report.skipped, 1);
        assert!(h.engine.run_now("auto-404").await.unwrap().is_none());
    }
}
