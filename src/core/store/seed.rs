use rusqlite::params;
use tracing::info;

use super::RecordStore;
use super::error::StoreResult;
use super::records::query_records;
use super::tables::Table;

const SAMPLE_ROWS: &[&str] = &[
    "INSERT OR IGNORE INTO workflow_navigator (workflow_id, name, description, status, priority, assigned_to, deadline)
     VALUES ('wf-001', 'Website Redesign', 'Complete overhaul of company website', 'Active', 5, 'Design Team', '2025-12-31')",
    "INSERT OR IGNORE INTO workflow_navigator (workflow_id, name, description, status, priority, assigned_to, deadline)
     VALUES ('wf-002', 'API Integration', 'Integrate third-party payment gateway', 'Planned', 8, 'Backend Team', '2025-11-15')",
    "INSERT OR IGNORE INTO workflow_navigator (workflow_id, name, description, status, priority, assigned_to, deadline)
     VALUES ('wf-003', 'Mobile App Launch', 'Launch iOS and Android apps', 'Review', 9, 'Mobile Team', '2025-10-30')",
    "INSERT OR IGNORE INTO portfolio_sync (project_id, project_name, owner, progress, sync_status, review_date)
     VALUES ('prj-001', 'E-commerce Platform', 'Tech Lead', 75, 'Synced', '2025-11-01')",
    "INSERT OR IGNORE INTO portfolio_sync (project_id, project_name, owner, progress, sync_status, review_date)
     VALUES ('prj-002', 'Customer Portal', 'Product Manager', 45, 'Queued', '2025-11-15')",
    "INSERT OR IGNORE INTO innovation_flow (opportunity_id, title, description, trend_score, category, impact, owner, review_status)
     VALUES ('inn-001', 'AI-Powered Search', 'Implement machine learning for better search results', 85, 'Technology', 9, 'AI Team', 'Under Review')",
    "INSERT OR IGNORE INTO innovation_flow (opportunity_id, title, description, trend_score, category, impact, owner, review_status)
     VALUES ('inn-002', 'Voice Interface', 'Add voice commands to mobile app', 72, 'UX', 7, 'UX Team', 'New')",
    "INSERT OR IGNORE INTO dream_journal (dream_id, date, title, description, symbols, sentiment)
     VALUES ('drm-001', '2025-10-01', 'Flying Dream', 'I was flying over mountains and oceans', 'freedom, adventure, sky', 'positive')",
    "INSERT OR IGNORE INTO dream_journal (dream_id, date, title, description, symbols, sentiment)
     VALUES ('drm-002', '2025-10-05', 'Lost in Forest', 'Wandering through a dense forest trying to find my way', 'confusion, nature, journey', 'neutral')",
    "INSERT OR IGNORE INTO health_metrics (metric_id, date, metric_type, value, unit, source)
     VALUES ('hm-001', '2025-10-14', 'Weight', 75.5, 'kg', 'Smart Scale')",
    "INSERT OR IGNORE INTO health_metrics (metric_id, date, metric_type, value, unit, source)
     VALUES ('hm-002', '2025-10-14', 'Steps', 8542, 'steps', 'Fitness Tracker')",
    "INSERT OR IGNORE INTO health_metrics (metric_id, date, metric_type, value, unit, source)
     VALUES ('hm-003', '2025-10-14', 'Heart Rate', 72, 'bpm', 'Fitness Tracker')",
    "INSERT OR IGNORE INTO money_moves (transaction_id, date, type, amount, category, description, status)
     VALUES ('mn-001', '2025-10-01', 'income', 5000, 'Salary', 'Monthly salary payment', 'Completed')",
    "INSERT OR IGNORE INTO money_moves (transaction_id, date, type, amount, category, description, status)
     VALUES ('mn-002', '2025-10-05', 'expense', 1200, 'Rent', 'Monthly rent payment', 'Completed')",
    "INSERT OR IGNORE INTO money_moves (transaction_id, date, type, amount, category, description, status)
     VALUES ('mn-003', '2025-10-10', 'expense', 250, 'Groceries', 'Weekly grocery shopping', 'Completed')",
    r#"INSERT OR IGNORE INTO automations (automation_id, name, target_table, trigger_type, trigger_config, actions, enabled)
     VALUES ('auto-001', 'Weekly Workflow Summary', 'workflow_navigator', 'scheduled',
             '{"time":"Sunday 17:00"}',
             '[{"type":"log","message":"Weekly summary generated"},{"type":"notify","message":"Your weekly workflow summary is ready"}]',
             1)"#,
    r#"INSERT OR IGNORE INTO automations (automation_id, name, target_table, trigger_type, trigger_config, actions, enabled)
     VALUES ('auto-002', 'Status Change Notification', 'workflow_navigator', 'record_updated',
             '{"conditions":[{"field":"status","changed":true}]}',
             '[{"type":"log","message":"Status updated"},{"type":"notify","message":"Workflow status has changed"}]',
             1)"#,
];

const SAMPLE_AGENTS: &[(&str, &str, &str, &str)] = &[
    (
        "agent-001",
        "Workflow Prioritizer",
        "Automatically adjusts workflow priorities based on deadlines and status",
        "If status is \"Planned\" and deadline is within 7 days, set priority to high.\nIf progress > 80%, suggest status change to \"Review\".",
    ),
    (
        "agent-002",
        "Dream Interpreter",
        "Analyzes dream journal entries to extract themes and symbols",
        "Analyze description to identify key symbols.\nDetermine sentiment (positive/negative/neutral).\nSuggest interpretations based on common dream symbolism.",
    ),
    (
        "agent-003",
        "Budget Advisor",
        "Monitors spending patterns and provides financial insights",
        "Track spending by category.\nAlert when monthly budget limits are approached.\nSuggest savings opportunities based on spending patterns.",
    ),
];

impl RecordStore {
    /// Loads the sample data set. Rows whose ids already exist are left
    /// untouched. Returns the number of rows actually inserted.
    pub async fn seed_sample_data(&self) -> StoreResult<usize> {
        let db = self.db.lock().await;
        let mut inserted = 0;

        for sql in SAMPLE_ROWS {
            inserted += db.execute(sql, [])?;
        }
        for (id, name, description, logic) in SAMPLE_AGENTS {
            inserted += db.execute(
                "INSERT OR IGNORE INTO agents (agent_id, name, description, logic, enabled) VALUES (?1, ?2, ?3, ?4, 1)",
                params![id, name, description, logic],
            )?;
        }

        info!("Seeded {} sample rows", inserted);
        Ok(inserted)
    }

    pub async fn count_records(&self, table: Table) -> StoreResult<i64> {
        let db = self.db.lock().await;
        let sql = format!("SELECT COUNT(*) AS count FROM {}", table.name());
        let rows = query_records(&db, &sql, [])?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(|count| count.as_i64())
            .unwrap_or_default())
    }
}
